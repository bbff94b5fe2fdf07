use std::path::PathBuf;

use error_stack::{Report, ResultExt};
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Client, Config};

use crate::domain::scaling::ClusterError;

/// Build the Kubernetes client, preferring an explicit kubeconfig path and
/// falling back to in-cluster config or `~/.kube/config`.
pub async fn init(kubeconfig: Option<PathBuf>) -> Result<Client, Report<ClusterError>> {
    let client = match kubeconfig {
        Some(path) => {
            let kubeconfig = Kubeconfig::read_from(&path).change_context(ClusterError::Fatal {
                message: format!("failed to read kubeconfig file {}", path.display()),
            })?;

            let config = Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default())
                .await
                .change_context(ClusterError::Fatal {
                    message: format!("failed to build config from kubeconfig {}", path.display()),
                })?;

            Client::try_from(config).change_context(ClusterError::Fatal {
                message: "failed to create Kubernetes client from kubeconfig".to_string(),
            })?
        }
        None => Client::try_default()
            .await
            .change_context(ClusterError::Fatal {
                message: "failed to create Kubernetes client from default config".to_string(),
            })?,
    };
    Ok(client)
}
