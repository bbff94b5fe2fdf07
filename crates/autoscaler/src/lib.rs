pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod logging;

// Re-export main modules
pub use domain::scaling;
pub use infrastructure::k8s;
pub use infrastructure::kube_client;
