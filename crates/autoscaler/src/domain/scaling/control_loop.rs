//! The collect → decide → act cycle.

use std::sync::Arc;
use std::time::Duration;

use error_stack::Report;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::Settings;

use super::actuator::{ApplyOutcome, ScaleActuator};
use super::collector::MetricsCollector;
use super::decision::ScalingPolicy;
use super::traits::{UsageApi, WorkloadApi};
use super::types::{ClusterError, ScaleAction, WorkloadRef};

/// Drives one workload through periodic scaling cycles.
///
/// The loop is strictly sequential: one cycle finishes, the loop sleeps,
/// the next begins. Every failure past startup is absorbed here; a bad cycle
/// is logged and the next interval gets a fresh attempt. Both the sleep and
/// an in-flight cycle yield to the cancellation token.
pub struct ControlLoop {
    target: WorkloadRef,
    policy: ScalingPolicy,
    max_replicas: Option<i32>,
    interval: Duration,
    dry_run: bool,
    workload: Arc<dyn WorkloadApi>,
    collector: MetricsCollector,
    actuator: ScaleActuator,
}

impl ControlLoop {
    pub fn new(
        settings: Settings,
        workload: Arc<dyn WorkloadApi>,
        usage: Arc<dyn UsageApi>,
    ) -> Self {
        let collector = MetricsCollector::new(workload.clone(), usage);
        let actuator = ScaleActuator::new(workload.clone(), settings.conflict_retries);
        Self {
            target: settings.target,
            policy: settings.policy,
            max_replicas: settings.max_replicas,
            interval: settings.interval,
            dry_run: settings.dry_run,
            workload,
            collector,
            actuator,
        }
    }

    /// Run cycles until the token is cancelled.
    pub async fn run(&self, shutdown: CancellationToken) {
        info!(
            workload = %self.target,
            interval_secs = self.interval.as_secs(),
            dry_run = self.dry_run,
            "control loop started"
        );
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = self.run_cycle() => {}
            }
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = tokio::time::sleep(self.interval) => {}
            }
        }
        info!(workload = %self.target, "control loop stopped");
    }

    /// One collect → decide → act pass.
    ///
    /// Failures are logged and swallowed, never returned: the caller's only
    /// job is to schedule the next cycle.
    pub async fn run_cycle(&self) {
        let state = match self.workload.workload_state(&self.target).await {
            Ok(state) => state,
            Err(report) => return self.skip_cycle("workload state", &report),
        };

        let stats = match self.collector.collect(&self.target).await {
            Ok(stats) => stats,
            Err(report) => return self.skip_cycle("usage metrics", &report),
        };

        info!(
            workload = %self.target,
            avg_cpu_millicores = stats.avg_cpu_millicores,
            avg_memory_mib = stats.avg_memory_mib,
            replicas = state.replicas,
            "sampled workload usage"
        );

        let decision = self.policy.decide(&stats, state.replicas);
        if decision.action == ScaleAction::NoChange {
            debug!(workload = %self.target, "replica count within band");
            return;
        }

        if let Some(max) = self.max_replicas {
            if decision.desired_replicas > max {
                warn!(
                    workload = %self.target,
                    desired = decision.desired_replicas,
                    max_replicas = max,
                    "replica ceiling reached, holding"
                );
                return;
            }
        }

        match self
            .actuator
            .apply(&self.target, decision.desired_replicas, self.dry_run)
            .await
        {
            Ok(ApplyOutcome::Unchanged) => {
                debug!(workload = %self.target, "declared replicas already satisfied")
            }
            // The actuator logs applied and dry-run outcomes itself.
            Ok(_) => {}
            Err(report) => warn!(
                workload = %self.target,
                error = ?report,
                "scaling action failed, will retry next cycle"
            ),
        }
    }

    fn skip_cycle(&self, stage: &str, report: &Report<ClusterError>) {
        match report.current_context() {
            ClusterError::NotFound { .. } => info!(
                workload = %self.target,
                stage,
                "nothing to scale this cycle: {report}"
            ),
            _ => warn!(
                workload = %self.target,
                stage,
                error = ?report,
                "cycle skipped"
            ),
        }
    }
}
