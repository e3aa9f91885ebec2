//! Continuous physics mode: friction, detent pull, peg drag, reversal clamp
//! and settle detection, one fixed step at a time.

use serde::{Deserialize, Serialize};
use wf_core::{boundary_slot, offset_from_segment_center};

use crate::config::PhysicsConfig;

/// Wheel angle and angular velocity (degrees, degrees per step)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RotationState {
    pub angle: f64,
    pub angular_velocity: f64,
}

/// Per-step velocity multiplier for a wheel moving at `speed`.
///
/// Fast wheels lose energy quickly; slow wheels coast, which stretches the
/// last few pegs out.
pub fn friction_factor(speed: f64, config: &PhysicsConfig) -> f64 {
    if speed >= config.high_speed_threshold {
        config.high_speed_friction
    } else if speed <= config.low_speed_threshold {
        config.low_speed_friction
    } else {
        let progress = (speed - config.low_speed_threshold)
            / (config.high_speed_threshold - config.low_speed_threshold);
        config.low_speed_friction
            + progress * (config.high_speed_friction - config.low_speed_friction)
    }
}

/// Velocity change pulling a slow wheel toward the centre of the segment
/// under the pointer. Zero above the detent speed.
pub fn detent_force(
    projected_angle: f64,
    velocity: f64,
    segment_angle: f64,
    config: &PhysicsConfig,
) -> f64 {
    let speed = velocity.abs();
    if speed >= config.detent_speed {
        return 0.0;
    }
    let distance = offset_from_segment_center(projected_angle, segment_angle);
    -distance * config.detent_factor * (config.detent_speed - speed)
}

/// A peg passing the pointer during one step
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PegCrossing {
    /// +1 when the wheel moved forward past the peg, -1 backward
    pub direction: f64,
    /// Pointer kick magnitude
    pub kick: f64,
}

/// Outcome of one physics step
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PhysicsStep {
    pub crossing: Option<PegCrossing>,
    /// The wheel came to rest this step
    pub settled: bool,
}

/// Per-session physics bookkeeping
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhysicsSession {
    /// Sign of the launch velocity; reversals are measured against it
    direction: f64,
    settling: bool,
    reversing: bool,
    peak_angle: f64,
}

impl PhysicsSession {
    pub fn new(initial_velocity: f64) -> Self {
        Self {
            direction: if initial_velocity < 0.0 { -1.0 } else { 1.0 },
            settling: false,
            reversing: false,
            peak_angle: 0.0,
        }
    }

    pub fn is_settling(&self) -> bool {
        self.settling
    }

    pub fn is_reversing(&self) -> bool {
        self.reversing
    }

    /// Angle where the current reversal began
    pub fn peak_angle(&self) -> Option<f64> {
        self.reversing.then_some(self.peak_angle)
    }

    /// Advance `state` by one fixed step
    pub fn step(
        &mut self,
        state: &mut RotationState,
        segment_angle: f64,
        config: &PhysicsConfig,
    ) -> PhysicsStep {
        let previous = state.angular_velocity;

        let mut velocity = previous * friction_factor(previous.abs(), config);
        velocity += detent_force(state.angle + velocity, velocity, segment_angle, config);
        // Clamp before crossing detection: ticks and kicks follow the travel
        // actually taken this step.
        velocity = self.limit_reversal(state.angle, previous, velocity, segment_angle, config);

        let from = boundary_slot(state.angle, segment_angle);
        let to = boundary_slot(state.angle + velocity, segment_angle);
        let crossing = if from != to {
            let direction = if velocity != 0.0 {
                velocity.signum()
            } else if to > from {
                1.0
            } else {
                -1.0
            };
            let kick = config.kick_base + velocity.abs() * config.kick_gain;
            velocity *= config.peg_drag;
            Some(PegCrossing { direction, kick })
        } else {
            None
        };

        if velocity.abs() < config.stop_velocity {
            self.settling = true;
        }
        let settled = self.settling && velocity.abs() < config.settle_velocity;
        if settled {
            velocity = 0.0;
            self.reversing = false;
        }

        state.angular_velocity = velocity;
        state.angle += velocity;

        PhysicsStep { crossing, settled }
    }

    /// Cap backward travel after the wheel turns against its launch
    /// direction. The cap holds until the wheel moves forward again.
    fn limit_reversal(
        &mut self,
        angle: f64,
        previous: f64,
        velocity: f64,
        segment_angle: f64,
        config: &PhysicsConfig,
    ) -> f64 {
        let forward = velocity * self.direction;
        if self.reversing {
            if forward > 0.0 {
                self.reversing = false;
            }
        } else if previous * self.direction >= 0.0 && forward < 0.0 {
            self.reversing = true;
            self.peak_angle = angle;
        }

        if !self.reversing {
            return velocity;
        }

        let limit = segment_angle * config.reversal_limit;
        let travelled = (self.peak_angle - (angle + velocity)) * self.direction;
        if travelled > limit {
            (self.peak_angle - limit * self.direction) - angle
        } else {
            velocity
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_friction_regimes() {
        let config = PhysicsConfig::default();
        assert_eq!(friction_factor(30.0, &config), 0.985);
        assert_eq!(friction_factor(15.0, &config), 0.985);
        assert_eq!(friction_factor(5.0, &config), 0.998);
        assert_eq!(friction_factor(0.1, &config), 0.998);
        assert_abs_diff_eq!(friction_factor(10.0, &config), 0.9915, epsilon = 1e-12);
    }

    #[test]
    fn test_friction_never_adds_energy() {
        let config = PhysicsConfig::default();
        for i in 0..500 {
            let speed = i as f64 * 0.1;
            let factor = friction_factor(speed, &config);
            assert!(factor > 0.0 && factor <= 1.0);
        }
    }

    #[test]
    fn test_detent_pulls_toward_center() {
        let config = PhysicsConfig::default();
        // 4 segments of 90°; centre at 225°.
        assert!(detent_force(210.0, 0.0, 90.0, &config) > 0.0);
        assert!(detent_force(240.0, 0.0, 90.0, &config) < 0.0);
        assert_abs_diff_eq!(detent_force(225.0, 0.0, 90.0, &config), 0.0);
        assert_eq!(detent_force(210.0, 2.5, 90.0, &config), 0.0);
    }

    #[test]
    fn test_crossing_kicks_and_drags() {
        let config = PhysicsConfig::default();
        let mut session = PhysicsSession::new(20.0);
        let mut state = RotationState {
            angle: 265.0,
            angular_velocity: 20.0,
        };
        let step = session.step(&mut state, 90.0, &config);
        let crossing = step.crossing.expect("peg at 270° should be crossed");
        assert_eq!(crossing.direction, 1.0);
        assert_abs_diff_eq!(crossing.kick, 5.0 + 20.0 * 0.985 * 2.0, epsilon = 1e-9);
        assert_abs_diff_eq!(state.angular_velocity, 20.0 * 0.985 * 0.96, epsilon = 1e-9);
        assert!(!step.settled);
    }

    #[test]
    fn test_backward_crossing_direction() {
        let config = PhysicsConfig::default();
        let mut session = PhysicsSession::new(-20.0);
        let mut state = RotationState {
            angle: 275.0,
            angular_velocity: -20.0,
        };
        let crossing = session.step(&mut state, 90.0, &config).crossing.unwrap();
        assert_eq!(crossing.direction, -1.0);
    }

    #[test]
    fn test_settles_at_rest() {
        let config = PhysicsConfig::default();
        let mut session = PhysicsSession::new(0.0);
        // Already centred and still: settles on the first step.
        let mut state = RotationState {
            angle: 225.0,
            angular_velocity: 0.0,
        };
        let step = session.step(&mut state, 90.0, &config);
        assert!(step.settled);
        assert_eq!(state.angular_velocity, 0.0);
    }

    #[test]
    fn test_reversal_is_capped_at_half_segment() {
        let config = PhysicsConfig::default();
        let mut session = PhysicsSession::new(1.0);
        let mut state = RotationState {
            angle: 100.0,
            angular_velocity: 0.5,
        };
        // First step records the peak when the wheel is shoved backward.
        let clamped = session.limit_reversal(state.angle, 0.5, -80.0, 90.0, &config);
        assert!(session.is_reversing());
        assert_eq!(session.peak_angle(), Some(100.0));
        assert_abs_diff_eq!(state.angle + clamped, 55.0, epsilon = 1e-12);

        state.angle += clamped;
        // Still backward: pinned to the bound.
        let clamped = session.limit_reversal(state.angle, clamped, -5.0, 90.0, &config);
        assert_abs_diff_eq!(state.angle + clamped, 55.0, epsilon = 1e-12);

        // Forward motion clears the flag.
        session.limit_reversal(state.angle, clamped, 0.3, 90.0, &config);
        assert!(!session.is_reversing());
    }
}
