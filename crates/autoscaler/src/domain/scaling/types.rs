//! Data model shared across the scaling loop.
//!
//! Everything here is ephemeral: usage figures live for one sampling pass,
//! and [`WorkloadState`] is re-read from the cluster every cycle rather than
//! cached, so the loop can never act on stale replica counts.

use core::error::Error;

/// Bytes per mebibyte, the unit memory averages are reported in.
pub(crate) const BYTES_PER_MIB: f64 = 1024.0 * 1024.0;

/// Identifies the Deployment whose replica count is managed.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
#[display("{namespace}/{name}")]
pub struct WorkloadRef {
    pub namespace: String,
    pub name: String,
}

impl WorkloadRef {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }
}

/// One pod's usage for a single sampling pass, containers already summed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InstanceUsage {
    pub cpu_millicores: f64,
    pub memory_bytes: f64,
}

/// Workload-level averages over all live pods in one sampling pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UsageStats {
    pub avg_cpu_millicores: f64,
    pub avg_memory_mib: f64,
}

/// Replica count, concurrency token and pod selector of the managed
/// Deployment, as declared in the cluster right now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkloadState {
    pub replicas: i32,
    /// Opaque optimistic-concurrency token; a write carrying a stale token
    /// is rejected by the API server.
    pub resource_version: String,
    /// Label selector matching the workload's pods, in list-call syntax.
    pub selector: String,
}

/// Direction of a scaling step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScaleAction {
    Up,
    Down,
    NoChange,
}

/// Outcome of one decision pass: the step taken and the replica count the
/// workload should end up with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScalingDecision {
    pub action: ScaleAction,
    pub desired_replicas: i32,
}

/// Classification of cluster call failures.
///
/// The control loop keys its recovery behavior off these kinds; none of them
/// is allowed to terminate the process.
#[derive(Debug, Clone, derive_more::Display)]
pub enum ClusterError {
    /// The workload, or all of its pods, are absent. Expected during
    /// rollouts and deletions.
    #[display("not found: {message}")]
    NotFound { message: String },
    /// Another writer modified the workload between our read and write.
    #[display("concurrent modification: {message}")]
    Conflict { message: String },
    /// Remote call failure that the next cycle may not see again.
    #[display("transient cluster failure: {message}")]
    Transient { message: String },
    /// Misconfigured credentials or cluster; retrying will not help, but the
    /// loop still survives it.
    #[display("fatal cluster error: {message}")]
    Fatal { message: String },
}

impl Error for ClusterError {}
