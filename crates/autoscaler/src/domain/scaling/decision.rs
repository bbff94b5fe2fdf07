//! Replica step decisions.

use super::types::{ScaleAction, ScalingDecision, UsageStats};

/// Thresholds and bounds that govern scaling decisions.
///
/// CPU values are in millicores, memory values in MiB, matching the units
/// the collector reports. The hysteresis margin sits below both thresholds
/// and defines the dead zone in which no action is taken.
#[derive(Debug, Clone)]
pub struct ScalingPolicy {
    pub cpu_threshold: f64,
    pub memory_threshold: f64,
    pub hysteresis_margin: f64,
    pub min_replicas: i32,
}

impl ScalingPolicy {
    /// Decide the next replica count for the observed averages.
    ///
    /// Scale-up takes strict precedence over scale-down, the step is fixed
    /// at one replica per call as a rate limit against thrash, and the
    /// result never drops below `min_replicas`. Pure function, no I/O.
    pub fn decide(&self, stats: &UsageStats, current_replicas: i32) -> ScalingDecision {
        if stats.avg_cpu_millicores > self.cpu_threshold
            || stats.avg_memory_mib > self.memory_threshold
        {
            return ScalingDecision {
                action: ScaleAction::Up,
                desired_replicas: current_replicas + 1,
            };
        }

        if stats.avg_cpu_millicores < self.cpu_threshold - self.hysteresis_margin
            && stats.avg_memory_mib < self.memory_threshold - self.hysteresis_margin
            && current_replicas > self.min_replicas
        {
            return ScalingDecision {
                action: ScaleAction::Down,
                desired_replicas: current_replicas - 1,
            };
        }

        ScalingDecision {
            action: ScaleAction::NoChange,
            desired_replicas: current_replicas,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(cpu: f64, memory: f64, margin: f64, min: i32) -> ScalingPolicy {
        ScalingPolicy {
            cpu_threshold: cpu,
            memory_threshold: memory,
            hysteresis_margin: margin,
            min_replicas: min,
        }
    }

    fn stats(cpu: f64, memory: f64) -> UsageStats {
        UsageStats {
            avg_cpu_millicores: cpu,
            avg_memory_mib: memory,
        }
    }

    #[test]
    fn cpu_above_threshold_scales_up() {
        let decision = policy(70.0, 80.0, 10.0, 1).decide(&stats(85.0, 40.0), 2);

        assert_eq!(decision.action, ScaleAction::Up);
        assert_eq!(decision.desired_replicas, 3);
    }

    #[test]
    fn memory_alone_above_threshold_scales_up() {
        let decision = policy(70.0, 80.0, 10.0, 1).decide(&stats(10.0, 95.0), 2);

        assert_eq!(decision.action, ScaleAction::Up);
        assert_eq!(decision.desired_replicas, 3);
    }

    #[test]
    fn both_below_band_scales_down() {
        let decision = policy(70.0, 80.0, 10.0, 1).decide(&stats(50.0, 30.0), 3);

        assert_eq!(decision.action, ScaleAction::Down);
        assert_eq!(decision.desired_replicas, 2);
    }

    #[test]
    fn idle_at_floor_holds() {
        let decision = policy(70.0, 80.0, 10.0, 1).decide(&stats(10.0, 10.0), 1);

        assert_eq!(decision.action, ScaleAction::NoChange);
        assert_eq!(decision.desired_replicas, 1);
    }

    #[test]
    fn dead_zone_between_bands_holds() {
        // CPU below its threshold but above threshold - margin: no flapping.
        let decision = policy(70.0, 80.0, 10.0, 1).decide(&stats(65.0, 30.0), 3);

        assert_eq!(decision.action, ScaleAction::NoChange);
        assert_eq!(decision.desired_replicas, 3);
    }

    #[test]
    fn one_metric_in_dead_zone_blocks_scale_down() {
        // Memory is well below its band, CPU is not; scale-down needs both.
        let decision = policy(70.0, 80.0, 10.0, 1).decide(&stats(65.0, 5.0), 3);

        assert_eq!(decision.action, ScaleAction::NoChange);
    }

    #[test]
    fn scale_up_wins_when_both_conditions_hold() {
        // A negative margin makes the down-band overlap the up-band, so both
        // conditions are true at once; up must win.
        let p = policy(50.0, 200.0, -100.0, 1);
        let s = stats(60.0, 250.0);
        assert!(s.avg_memory_mib > p.memory_threshold);
        assert!(s.avg_cpu_millicores < p.cpu_threshold - p.hysteresis_margin);

        let decision = p.decide(&s, 4);

        assert_eq!(decision.action, ScaleAction::Up);
        assert_eq!(decision.desired_replicas, 5);
    }

    #[test]
    fn desired_never_drops_below_floor() {
        let p = policy(70.0, 80.0, 10.0, 2);
        for current in 1..=6 {
            for cpu in [0.0, 5.0, 30.0, 59.9] {
                for memory in [0.0, 5.0, 30.0, 69.9] {
                    let decision = p.decide(&stats(cpu, memory), current);
                    assert!(
                        decision.desired_replicas >= p.min_replicas.min(current),
                        "cpu={cpu} memory={memory} current={current} -> {decision:?}"
                    );
                }
            }
        }
    }

    #[test]
    fn any_metric_above_threshold_scales_up_regardless_of_other() {
        let p = policy(70.0, 80.0, 10.0, 1);
        for other in [0.0f64, 40.0, 79.0, 300.0] {
            let decision = p.decide(&stats(70.1, other.min(80.0)), 2);
            assert_eq!(decision.action, ScaleAction::Up, "other={other}");
            assert_eq!(decision.desired_replicas, 3);
        }
        for other in [0.0, 40.0, 69.9] {
            let decision = p.decide(&stats(other, 80.1), 2);
            assert_eq!(decision.action, ScaleAction::Up, "other={other}");
        }
    }

    #[test]
    fn values_exactly_on_threshold_hold() {
        // Thresholds are strict inequalities in both directions.
        let p = policy(70.0, 80.0, 10.0, 1);

        let decision = p.decide(&stats(70.0, 80.0), 2);
        assert_eq!(decision.action, ScaleAction::NoChange);

        let decision = p.decide(&stats(60.0, 70.0), 2);
        assert_eq!(decision.action, ScaleAction::NoChange);
    }
}
