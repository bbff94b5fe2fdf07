//! Deployment-backed workload state reads and replica writes.

use std::time::Duration;

use async_trait::async_trait;
use error_stack::Report;
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::LabelSelector;
use kube::api::{Patch, PatchParams};
use kube::{Api, Client};
use tracing::warn;

use crate::domain::scaling::{ClusterError, WorkloadApi, WorkloadRef, WorkloadState};

use super::bounded;

pub struct DeploymentClient {
    client: Client,
    request_timeout: Duration,
}

impl DeploymentClient {
    pub fn new(client: Client, request_timeout: Duration) -> Self {
        Self {
            client,
            request_timeout,
        }
    }

    fn api(&self, namespace: &str) -> Api<Deployment> {
        Api::namespaced(self.client.clone(), namespace)
    }
}

#[async_trait]
impl WorkloadApi for DeploymentClient {
    async fn workload_state(
        &self,
        target: &WorkloadRef,
    ) -> Result<WorkloadState, Report<ClusterError>> {
        let api = self.api(&target.namespace);
        let deployment = bounded(self.request_timeout, api.get(&target.name)).await?;

        let resource_version = deployment.metadata.resource_version.ok_or_else(|| {
            Report::new(ClusterError::Transient {
                message: format!("deployment {target} carries no resourceVersion"),
            })
        })?;
        let spec = deployment.spec.ok_or_else(|| {
            Report::new(ClusterError::Transient {
                message: format!("deployment {target} carries no spec"),
            })
        })?;

        Ok(WorkloadState {
            replicas: spec.replicas.unwrap_or(1),
            resource_version,
            selector: format_label_selector(&spec.selector),
        })
    }

    async fn update_replicas(
        &self,
        target: &WorkloadRef,
        resource_version: &str,
        desired: i32,
    ) -> Result<(), Report<ClusterError>> {
        let api = self.api(&target.namespace);
        // Carrying the resourceVersion turns the patch into a compare-and-
        // swap: the API server answers 409 when another writer got there
        // first.
        let patch = serde_json::json!({
            "apiVersion": "apps/v1",
            "kind": "Deployment",
            "metadata": { "resourceVersion": resource_version },
            "spec": { "replicas": desired },
        });
        bounded(
            self.request_timeout,
            api.patch(&target.name, &PatchParams::default(), &Patch::Merge(&patch)),
        )
        .await?;
        Ok(())
    }
}

/// Render a Deployment label selector in list-call syntax,
/// e.g. `app=web,tier in (frontend,cache)`.
fn format_label_selector(selector: &LabelSelector) -> String {
    let mut terms = Vec::new();
    if let Some(labels) = &selector.match_labels {
        for (key, value) in labels {
            terms.push(format!("{key}={value}"));
        }
    }
    if let Some(expressions) = &selector.match_expressions {
        for expression in expressions {
            let values = expression.values.as_deref().unwrap_or(&[]).join(",");
            match expression.operator.as_str() {
                "In" => terms.push(format!("{} in ({values})", expression.key)),
                "NotIn" => terms.push(format!("{} notin ({values})", expression.key)),
                "Exists" => terms.push(expression.key.clone()),
                "DoesNotExist" => terms.push(format!("!{}", expression.key)),
                other => warn!(
                    operator = other,
                    key = %expression.key,
                    "ignoring selector requirement with unknown operator"
                ),
            }
        }
    }
    terms.join(",")
}
