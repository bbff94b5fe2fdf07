use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tokio_util::sync::CancellationToken;

use autoscaler::config::{Cli, Settings};
use autoscaler::k8s::{DeploymentClient, PodMetricsClient};
use autoscaler::kube_client;
use autoscaler::logging;
use autoscaler::scaling::ControlLoop;

/// How long in-flight work gets to finish after a shutdown signal.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// Sets up global panic hooks.
fn setup_global_hooks() {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        default_hook(panic_info);
        tracing::error!("Thread panicked: {}", panic_info);
    }));
}

#[tokio::main]
async fn main() -> Result<()> {
    setup_global_hooks();
    logging::init();

    let cli = Cli::parse();
    let settings = Settings::from_cli(&cli)?;

    tracing::info!(
        workload = %settings.target,
        interval_secs = settings.interval.as_secs(),
        dry_run = settings.dry_run,
        "starting deployment autoscaler"
    );

    let client = kube_client::init(settings.kubeconfig.clone())
        .await
        .map_err(|report| anyhow::anyhow!("failed to build Kubernetes client: {report:?}"))?;

    let workload = Arc::new(DeploymentClient::new(
        client.clone(),
        settings.request_timeout,
    ));
    let usage = Arc::new(PodMetricsClient::new(client, settings.request_timeout));
    let control_loop = ControlLoop::new(settings, workload, usage);

    let shutdown = CancellationToken::new();
    let loop_task = {
        let token = shutdown.clone();
        tokio::spawn(async move { control_loop.run(token).await })
    };

    wait_for_signal().await?;
    shutdown.cancel();

    match tokio::time::timeout(SHUTDOWN_GRACE, loop_task).await {
        Ok(Ok(())) => tracing::info!("control loop stopped cleanly"),
        Ok(Err(e)) => tracing::error!("control loop task failed: {e}"),
        Err(_) => {
            tracing::warn!("control loop did not stop within grace period, abandoning in-flight work")
        }
    }

    Ok(())
}

async fn wait_for_signal() -> Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm = signal(SignalKind::terminate())?;
        let mut sigint = signal(SignalKind::interrupt())?;

        tokio::select! {
            _ = sigterm.recv() => {
                tracing::info!("Received SIGTERM, initiating graceful shutdown");
            }
            _ = sigint.recv() => {
                tracing::info!("Received SIGINT, initiating graceful shutdown");
            }
        }
    }
    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await?;
        tracing::info!("Received Ctrl-C, initiating graceful shutdown");
    }
    Ok(())
}
