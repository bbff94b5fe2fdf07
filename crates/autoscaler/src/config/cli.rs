use std::path::PathBuf;

use clap::Parser;

/// Keeps a Deployment's average pod usage inside a target band by nudging
/// its replica count one step per cycle.
#[derive(Debug, Parser)]
#[command(name = "autoscaler", about, version)]
pub struct Cli {
    #[arg(
        short = 'n',
        long,
        default_value = "default",
        help = "Kubernetes namespace of the target deployment"
    )]
    pub namespace: String,

    #[arg(
        short = 'd',
        long,
        default_value = "",
        help = "Name of the deployment to scale"
    )]
    pub deployment: String,

    #[arg(
        long,
        default_value_t = 500.0,
        help = "Average CPU per pod, in millicores, above which the deployment scales up"
    )]
    pub cpu_threshold: f64,

    #[arg(
        long,
        default_value_t = 512.0,
        help = "Average memory per pod, in MiB, above which the deployment scales up"
    )]
    pub memory_threshold: f64,

    #[arg(
        long,
        default_value_t = 50.0,
        help = "Dead zone below each threshold; both averages must fall this far under their thresholds before scaling down"
    )]
    pub hysteresis_margin: f64,

    #[arg(
        long,
        default_value_t = 1,
        help = "Replica floor; the loop never scales below this"
    )]
    pub min_replicas: i32,

    #[arg(long, help = "Optional replica ceiling; scale-ups beyond it are held")]
    pub max_replicas: Option<i32>,

    #[arg(long, default_value_t = 30, help = "Seconds between scaling cycles")]
    pub interval: u64,

    #[arg(long, help = "Compute and log decisions without touching the cluster")]
    pub dry_run: bool,

    #[arg(
        long,
        env = "KUBECONFIG",
        value_hint = clap::ValueHint::FilePath,
        help = "Path to kubeconfig file (defaults to in-cluster config or ~/.kube/config)"
    )]
    pub kubeconfig: Option<PathBuf>,

    #[arg(
        long,
        default_value_t = 10,
        help = "Per-request timeout for cluster calls, in seconds"
    )]
    pub request_timeout: u64,

    #[arg(
        long,
        default_value_t = 3,
        help = "Update attempts per cycle when a replica write hits a concurrent modification"
    )]
    pub conflict_retries: u32,
}
