//! Runtime configuration: CLI flags and their validated form.

pub mod cli;

pub use cli::Cli;

use core::error::Error;
use std::path::PathBuf;
use std::time::Duration;

use crate::domain::scaling::{ScalingPolicy, WorkloadRef};

/// Rejected startup configuration.
///
/// The only fatal error class in the program: anything that goes wrong once
/// the loop is running is logged and survived instead.
#[derive(Debug, PartialEq, Eq, derive_more::Display)]
pub enum ConfigError {
    #[display("a deployment name is required (--deployment)")]
    MissingDeployment,
    #[display("poll interval must be at least 1 second")]
    IntervalTooShort,
    #[display("minimum replicas must be at least 1, got {got}")]
    ReplicaFloorTooLow { got: i32 },
    #[display("replica ceiling {max} is below the floor {min}")]
    CeilingBelowFloor { min: i32, max: i32 },
    #[display("thresholds and hysteresis margin must not be negative")]
    NegativeThreshold,
    #[display("conflict retries must be at least 1")]
    NoRetryBudget,
}

impl Error for ConfigError {}

/// Immutable, validated runtime settings, built once at startup and handed
/// to the control loop by value.
#[derive(Debug, Clone)]
pub struct Settings {
    pub target: WorkloadRef,
    pub policy: ScalingPolicy,
    pub max_replicas: Option<i32>,
    pub interval: Duration,
    pub dry_run: bool,
    pub kubeconfig: Option<PathBuf>,
    pub request_timeout: Duration,
    pub conflict_retries: u32,
}

impl Settings {
    pub fn from_cli(cli: &Cli) -> Result<Self, ConfigError> {
        if cli.deployment.trim().is_empty() {
            return Err(ConfigError::MissingDeployment);
        }
        if cli.interval == 0 {
            return Err(ConfigError::IntervalTooShort);
        }
        if cli.min_replicas < 1 {
            return Err(ConfigError::ReplicaFloorTooLow {
                got: cli.min_replicas,
            });
        }
        if let Some(max) = cli.max_replicas {
            if max < cli.min_replicas {
                return Err(ConfigError::CeilingBelowFloor {
                    min: cli.min_replicas,
                    max,
                });
            }
        }
        if cli.cpu_threshold < 0.0 || cli.memory_threshold < 0.0 || cli.hysteresis_margin < 0.0 {
            return Err(ConfigError::NegativeThreshold);
        }
        if cli.conflict_retries == 0 {
            return Err(ConfigError::NoRetryBudget);
        }

        Ok(Self {
            target: WorkloadRef::new(&cli.namespace, &cli.deployment),
            policy: ScalingPolicy {
                cpu_threshold: cli.cpu_threshold,
                memory_threshold: cli.memory_threshold,
                hysteresis_margin: cli.hysteresis_margin,
                min_replicas: cli.min_replicas,
            },
            max_replicas: cli.max_replicas,
            interval: Duration::from_secs(cli.interval),
            dry_run: cli.dry_run,
            kubeconfig: cli.kubeconfig.clone(),
            request_timeout: Duration::from_secs(cli.request_timeout),
            conflict_retries: cli.conflict_retries,
        })
    }
}
