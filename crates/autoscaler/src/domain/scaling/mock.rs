//! Test doubles for the cluster collaborator traits.
//!
//! [`FakeCluster`] keeps the workload state in memory, counts calls and
//! mutations, and can be scripted to fail specific calls, so tests can drive
//! single cycles deterministically.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use error_stack::Report;

use super::traits::{UsageApi, WorkloadApi};
use super::types::{ClusterError, InstanceUsage, WorkloadRef, WorkloadState};

pub(crate) struct FakeCluster {
    inner: Mutex<State>,
}

struct State {
    replicas: i32,
    resource_version: u64,
    selector: String,
    usage: Vec<InstanceUsage>,
    state_errors: VecDeque<ClusterError>,
    update_errors: VecDeque<ClusterError>,
    usage_errors: VecDeque<ClusterError>,
    /// Replica count a competing writer sets when a scripted conflict fires.
    conflict_sets_replicas: Option<i32>,
    update_calls: u32,
    mutations: u32,
}

impl FakeCluster {
    pub(crate) fn with_replicas(replicas: i32) -> Self {
        Self {
            inner: Mutex::new(State {
                replicas,
                resource_version: 1,
                selector: "app=web".to_string(),
                usage: Vec::new(),
                state_errors: VecDeque::new(),
                update_errors: VecDeque::new(),
                usage_errors: VecDeque::new(),
                conflict_sets_replicas: None,
                update_calls: 0,
                mutations: 0,
            }),
        }
    }

    pub(crate) fn set_usage(&self, usage: Vec<InstanceUsage>) {
        self.inner.lock().unwrap().usage = usage;
    }

    pub(crate) fn fail_next_state(&self, err: ClusterError) {
        self.inner.lock().unwrap().state_errors.push_back(err);
    }

    pub(crate) fn fail_next_update(&self, err: ClusterError) {
        self.inner.lock().unwrap().update_errors.push_back(err);
    }

    pub(crate) fn fail_next_usage(&self, err: ClusterError) {
        self.inner.lock().unwrap().usage_errors.push_back(err);
    }

    pub(crate) fn on_conflict_set_replicas(&self, replicas: i32) {
        self.inner.lock().unwrap().conflict_sets_replicas = Some(replicas);
    }

    pub(crate) fn replicas(&self) -> i32 {
        self.inner.lock().unwrap().replicas
    }

    pub(crate) fn update_calls(&self) -> u32 {
        self.inner.lock().unwrap().update_calls
    }

    pub(crate) fn mutations(&self) -> u32 {
        self.inner.lock().unwrap().mutations
    }

    pub(crate) fn transient(message: &str) -> ClusterError {
        ClusterError::Transient {
            message: message.to_string(),
        }
    }

    pub(crate) fn conflict() -> ClusterError {
        ClusterError::Conflict {
            message: "object has been modified".to_string(),
        }
    }
}

#[async_trait]
impl WorkloadApi for FakeCluster {
    async fn workload_state(
        &self,
        _target: &WorkloadRef,
    ) -> Result<WorkloadState, Report<ClusterError>> {
        let mut state = self.inner.lock().unwrap();
        if let Some(err) = state.state_errors.pop_front() {
            return Err(Report::new(err));
        }
        Ok(WorkloadState {
            replicas: state.replicas,
            resource_version: state.resource_version.to_string(),
            selector: state.selector.clone(),
        })
    }

    async fn update_replicas(
        &self,
        _target: &WorkloadRef,
        resource_version: &str,
        desired: i32,
    ) -> Result<(), Report<ClusterError>> {
        let mut state = self.inner.lock().unwrap();
        state.update_calls += 1;
        if let Some(err) = state.update_errors.pop_front() {
            if matches!(err, ClusterError::Conflict { .. }) {
                // The competing writer advanced the object.
                state.resource_version += 1;
                if let Some(replicas) = state.conflict_sets_replicas {
                    state.replicas = replicas;
                }
            }
            return Err(Report::new(err));
        }
        if resource_version != state.resource_version.to_string() {
            return Err(Report::new(ClusterError::Conflict {
                message: "stale resource version".to_string(),
            }));
        }
        state.replicas = desired;
        state.resource_version += 1;
        state.mutations += 1;
        Ok(())
    }
}

#[async_trait]
impl UsageApi for FakeCluster {
    async fn list_instance_usage(
        &self,
        _namespace: &str,
        _selector: &str,
    ) -> Result<Vec<InstanceUsage>, Report<ClusterError>> {
        let mut state = self.inner.lock().unwrap();
        if let Some(err) = state.usage_errors.pop_front() {
            return Err(Report::new(err));
        }
        Ok(state.usage.clone())
    }
}
