//! Kubernetes-backed implementations of the cluster collaborator traits.

pub mod pod_metrics;
pub mod quantity;
pub mod workload;

pub use pod_metrics::PodMetricsClient;
pub use workload::DeploymentClient;

use std::time::Duration;

use error_stack::Report;

use crate::domain::scaling::ClusterError;

/// Map a kube client error onto the loop's failure taxonomy.
pub(crate) fn classify(err: kube::Error) -> Report<ClusterError> {
    let context = match &err {
        kube::Error::Api(response) => {
            let message = response.message.clone();
            match response.code {
                404 => ClusterError::NotFound { message },
                409 => ClusterError::Conflict { message },
                401 | 403 => ClusterError::Fatal { message },
                _ => ClusterError::Transient { message },
            }
        }
        kube::Error::Auth(_) => ClusterError::Fatal {
            message: err.to_string(),
        },
        _ => ClusterError::Transient {
            message: err.to_string(),
        },
    };
    Report::new(context).attach_printable(format!("kubernetes API error: {err}"))
}

/// Bound a cluster call with an explicit timeout so a stalled request cannot
/// block the loop; expiry counts as transient.
pub(crate) async fn bounded<T, F>(
    request_timeout: Duration,
    fut: F,
) -> Result<T, Report<ClusterError>>
where
    F: core::future::Future<Output = Result<T, kube::Error>>,
{
    match tokio::time::timeout(request_timeout, fut).await {
        Ok(result) => result.map_err(classify),
        Err(_) => Err(Report::new(ClusterError::Transient {
            message: format!(
                "cluster call exceeded the {}s request timeout",
                request_timeout.as_secs()
            ),
        })),
    }
}

#[cfg(test)]
mod tests {
    use kube::core::ErrorResponse;

    use super::*;

    fn api_error(code: u16) -> kube::Error {
        kube::Error::Api(ErrorResponse {
            status: "Failure".to_string(),
            message: format!("status {code}"),
            reason: String::new(),
            code,
        })
    }

    #[test]
    fn http_status_maps_to_error_kind() {
        assert!(matches!(
            classify(api_error(404)).current_context(),
            ClusterError::NotFound { .. }
        ));
        assert!(matches!(
            classify(api_error(409)).current_context(),
            ClusterError::Conflict { .. }
        ));
        assert!(matches!(
            classify(api_error(403)).current_context(),
            ClusterError::Fatal { .. }
        ));
        assert!(matches!(
            classify(api_error(500)).current_context(),
            ClusterError::Transient { .. }
        ));
        assert!(matches!(
            classify(api_error(503)).current_context(),
            ClusterError::Transient { .. }
        ));
    }

    #[tokio::test]
    async fn stalled_call_times_out_as_transient() {
        let err = bounded(Duration::from_millis(10), async {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok::<(), kube::Error>(())
        })
        .await
        .unwrap_err();

        assert!(matches!(
            err.current_context(),
            ClusterError::Transient { .. }
        ));
    }
}
