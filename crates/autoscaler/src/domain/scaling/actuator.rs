//! Applies a desired replica count to the cluster.

use core::error::Error;
use std::sync::Arc;
use std::time::Duration;

use error_stack::{Report, ResultExt};
use tracing::{info, warn};

use super::traits::WorkloadApi;
use super::types::{ClusterError, WorkloadRef};

const DEFAULT_RETRY_BACKOFF: Duration = Duration::from_millis(200);

/// What one apply call did to the cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// The declared count already matched; nothing was written.
    Unchanged,
    /// The cluster accepted the new replica count.
    Applied { from: i32, to: i32 },
    /// Dry-run mode: the change was reported but never sent.
    WouldApply { from: i32, to: i32 },
}

/// Failure to land a replica update. Never fatal to the loop.
#[derive(Debug, derive_more::Display)]
pub enum ScaleError {
    #[display("replica update abandoned after {attempts} conflicting attempts")]
    RetriesExhausted { attempts: u32 },
    #[display("cluster rejected the replica update")]
    UpdateRejected,
}

impl Error for ScaleError {}

/// Writes replica counts with optimistic-concurrency retries.
///
/// Each attempt re-reads the workload to pick up a fresh concurrency token,
/// which also re-checks the no-op condition: if a competing writer already
/// landed the same target, the apply succeeds without a second mutation.
pub struct ScaleActuator {
    workload: Arc<dyn WorkloadApi>,
    max_attempts: u32,
    retry_backoff: Duration,
}

impl ScaleActuator {
    pub fn new(workload: Arc<dyn WorkloadApi>, max_attempts: u32) -> Self {
        Self {
            workload,
            max_attempts: max_attempts.max(1),
            retry_backoff: DEFAULT_RETRY_BACKOFF,
        }
    }

    #[cfg(test)]
    fn with_retry_backoff(mut self, backoff: Duration) -> Self {
        self.retry_backoff = backoff;
        self
    }

    /// Bring the workload's declared replica count to `desired`.
    ///
    /// Idempotent with respect to already-satisfied state; on success exactly
    /// one cluster mutation has occurred. With `dry_run` the update call is
    /// never issued.
    pub async fn apply(
        &self,
        target: &WorkloadRef,
        desired: i32,
        dry_run: bool,
    ) -> Result<ApplyOutcome, Report<ScaleError>> {
        let mut attempts = 0u32;
        loop {
            let state = self
                .workload
                .workload_state(target)
                .await
                .change_context(ScaleError::UpdateRejected)?;

            if state.replicas == desired {
                return Ok(ApplyOutcome::Unchanged);
            }

            if dry_run {
                info!(
                    workload = %target,
                    from = state.replicas,
                    to = desired,
                    "dry-run: would scale workload"
                );
                return Ok(ApplyOutcome::WouldApply {
                    from: state.replicas,
                    to: desired,
                });
            }

            match self
                .workload
                .update_replicas(target, &state.resource_version, desired)
                .await
            {
                Ok(()) => {
                    info!(
                        workload = %target,
                        from = state.replicas,
                        to = desired,
                        "scaled workload"
                    );
                    return Ok(ApplyOutcome::Applied {
                        from: state.replicas,
                        to: desired,
                    });
                }
                Err(report) => {
                    if !matches!(report.current_context(), ClusterError::Conflict { .. }) {
                        return Err(report.change_context(ScaleError::UpdateRejected));
                    }
                    attempts += 1;
                    if attempts >= self.max_attempts {
                        return Err(
                            report.change_context(ScaleError::RetriesExhausted { attempts })
                        );
                    }
                    warn!(
                        workload = %target,
                        attempt = attempts,
                        "replica update conflicted, retrying with fresh state"
                    );
                    tokio::time::sleep(self.retry_backoff).await;
                }
            }
        }
    }
}
