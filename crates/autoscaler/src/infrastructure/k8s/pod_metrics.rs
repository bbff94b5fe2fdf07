//! metrics.k8s.io access: the PodMetrics resource and per-pod usage listing.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use error_stack::Report;
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::api::ListParams;
use kube::{Api, Client};
use serde::Deserialize;

use crate::domain::scaling::{ClusterError, InstanceUsage, UsageApi};

use super::bounded;
use super::quantity::{cpu_millicores, memory_bytes};

/// One pod's live usage as reported by metrics-server.
///
/// k8s-openapi does not ship the metrics.k8s.io group, so the resource is
/// declared here with just the fields the collector reads.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PodMetrics {
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub window: Option<String>,
    #[serde(default)]
    pub containers: Vec<ContainerMetrics>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ContainerMetrics {
    pub name: String,
    #[serde(default)]
    pub usage: BTreeMap<String, Quantity>,
}

impl k8s_openapi::Resource for PodMetrics {
    const API_VERSION: &'static str = "metrics.k8s.io/v1beta1";
    const GROUP: &'static str = "metrics.k8s.io";
    const KIND: &'static str = "PodMetrics";
    const VERSION: &'static str = "v1beta1";
    const URL_PATH_SEGMENT: &'static str = "pods";
    type Scope = k8s_openapi::NamespaceResourceScope;
}

impl k8s_openapi::Metadata for PodMetrics {
    type Ty = ObjectMeta;

    fn metadata(&self) -> &Self::Ty {
        &self.metadata
    }

    fn metadata_mut(&mut self) -> &mut Self::Ty {
        &mut self.metadata
    }
}

pub struct PodMetricsClient {
    client: Client,
    request_timeout: Duration,
}

impl PodMetricsClient {
    pub fn new(client: Client, request_timeout: Duration) -> Self {
        Self {
            client,
            request_timeout,
        }
    }
}

#[async_trait]
impl UsageApi for PodMetricsClient {
    async fn list_instance_usage(
        &self,
        namespace: &str,
        selector: &str,
    ) -> Result<Vec<InstanceUsage>, Report<ClusterError>> {
        let api: Api<PodMetrics> = Api::namespaced(self.client.clone(), namespace);
        let params = ListParams::default().labels(selector);
        let pod_metrics = bounded(self.request_timeout, api.list(&params)).await?;

        let mut usages = Vec::with_capacity(pod_metrics.items.len());
        for pod in &pod_metrics.items {
            usages.push(pod_usage(pod)?);
        }
        Ok(usages)
    }
}

/// Sum container usage into a single per-pod figure.
fn pod_usage(pod: &PodMetrics) -> Result<InstanceUsage, Report<ClusterError>> {
    let mut cpu = 0.0;
    let mut memory = 0.0;
    for container in &pod.containers {
        if let Some(quantity) = container.usage.get("cpu") {
            cpu += cpu_millicores(quantity).ok_or_else(|| malformed(pod, "cpu", quantity))?;
        }
        if let Some(quantity) = container.usage.get("memory") {
            memory += memory_bytes(quantity).ok_or_else(|| malformed(pod, "memory", quantity))?;
        }
    }
    Ok(InstanceUsage {
        cpu_millicores: cpu,
        memory_bytes: memory,
    })
}

fn malformed(pod: &PodMetrics, resource: &str, quantity: &Quantity) -> Report<ClusterError> {
    Report::new(ClusterError::Transient {
        message: format!(
            "malformed {resource} quantity {:?} reported for pod {}",
            quantity.0,
            pod.metadata.name.as_deref().unwrap_or("<unnamed>")
        ),
    })
}
