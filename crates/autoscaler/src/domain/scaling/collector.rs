//! Reduces live per-pod usage to workload-level averages.

use std::sync::Arc;

use error_stack::Report;
use tracing::debug;

use super::traits::{UsageApi, WorkloadApi};
use super::types::{ClusterError, UsageStats, WorkloadRef, BYTES_PER_MIB};

/// Samples the managed workload's pods and averages their usage.
///
/// A pure read: resolving the pod selector and listing usage leave no trace
/// in the cluster.
pub struct MetricsCollector {
    workload: Arc<dyn WorkloadApi>,
    usage: Arc<dyn UsageApi>,
}

impl MetricsCollector {
    pub fn new(workload: Arc<dyn WorkloadApi>, usage: Arc<dyn UsageApi>) -> Self {
        Self { workload, usage }
    }

    /// Average CPU (millicores) and memory (MiB) across all live pods.
    ///
    /// Returns `NotFound` when no pod matches the workload's selector; that
    /// is an expected condition during rollouts, distinct from a remote
    /// failure.
    pub async fn collect(&self, target: &WorkloadRef) -> Result<UsageStats, Report<ClusterError>> {
        let state = self.workload.workload_state(target).await?;
        let usages = self
            .usage
            .list_instance_usage(&target.namespace, &state.selector)
            .await?;

        if usages.is_empty() {
            return Err(Report::new(ClusterError::NotFound {
                message: format!("no live pods match selector {:?} of {target}", state.selector),
            }));
        }

        let count = usages.len() as f64;
        let total_cpu: f64 = usages.iter().map(|u| u.cpu_millicores).sum();
        let total_memory: f64 = usages.iter().map(|u| u.memory_bytes).sum();

        let stats = UsageStats {
            avg_cpu_millicores: total_cpu / count,
            avg_memory_mib: total_memory / count / BYTES_PER_MIB,
        };
        debug!(
            workload = %target,
            pods = usages.len(),
            avg_cpu_millicores = stats.avg_cpu_millicores,
            avg_memory_mib = stats.avg_memory_mib,
            "collected workload usage"
        );
        Ok(stats)
    }
}
