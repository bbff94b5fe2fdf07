//! Cluster-facing adapters behind the domain traits.

pub mod k8s;
pub mod kube_client;
