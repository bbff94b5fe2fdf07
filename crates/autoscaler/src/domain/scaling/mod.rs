//! The scaling core: collect pod usage, decide a bounded step, apply it.
//!
//! One cycle of the loop walks through these pieces in order:
//! - [`MetricsCollector`] reduces live pod metrics to workload averages
//! - [`ScalingPolicy`] maps averages to an up/down/hold step with hysteresis
//! - [`ScaleActuator`] writes the new replica count with conflict retries
//! - [`ControlLoop`] sequences them on a cancellable timer

pub mod actuator;
pub mod collector;
pub mod control_loop;
pub mod decision;
pub mod traits;
pub mod types;

#[cfg(test)]
mod mock;

pub use actuator::{ApplyOutcome, ScaleActuator, ScaleError};
pub use collector::MetricsCollector;
pub use control_loop::ControlLoop;
pub use decision::ScalingPolicy;
pub use traits::{UsageApi, WorkloadApi};
pub use types::{
    ClusterError, InstanceUsage, ScaleAction, ScalingDecision, UsageStats, WorkloadRef,
    WorkloadState,
};
