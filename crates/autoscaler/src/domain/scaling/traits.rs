//! Cluster collaborator traits.
//!
//! The loop talks to the cluster exclusively through these, so tests can
//! substitute deterministic fakes without touching the network.

use async_trait::async_trait;
use error_stack::Report;

use super::types::{ClusterError, InstanceUsage, WorkloadRef, WorkloadState};

/// Read and write access to the managed workload's declared state.
#[async_trait]
pub trait WorkloadApi: Send + Sync {
    /// Fetch the workload's current replica count, concurrency token and pod
    /// selector.
    ///
    /// Errors: `NotFound` when the workload does not exist, `Transient` for
    /// remote failures, `Fatal` for credential problems.
    async fn workload_state(
        &self,
        target: &WorkloadRef,
    ) -> Result<WorkloadState, Report<ClusterError>>;

    /// Declare a new replica count, guarded by the concurrency token from a
    /// prior [`workload_state`](WorkloadApi::workload_state) read.
    ///
    /// Errors: `Conflict` when the token is stale, plus the kinds of
    /// `workload_state`.
    async fn update_replicas(
        &self,
        target: &WorkloadRef,
        resource_version: &str,
        desired: i32,
    ) -> Result<(), Report<ClusterError>>;
}

/// Read access to live per-pod resource usage.
#[async_trait]
pub trait UsageApi: Send + Sync {
    /// List current usage for all pods matching `selector`, one entry per
    /// live pod with containers already summed.
    async fn list_instance_usage(
        &self,
        namespace: &str,
        selector: &str,
    ) -> Result<Vec<InstanceUsage>, Report<ClusterError>>;
}
