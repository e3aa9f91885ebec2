//! Springy pointer needle

use serde::{Deserialize, Serialize};

use crate::config::PointerConfig;

/// Needle deflection around rest, in degrees
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PointerState {
    pub deflection: f64,
    pub velocity: f64,
}

impl PointerState {
    /// One damped-spring step toward zero deflection
    #[inline]
    pub fn step(&mut self, config: &PointerConfig) {
        self.velocity += -self.deflection * config.stiffness;
        self.velocity *= config.damping;
        self.deflection += self.velocity;
    }

    /// Knock the needle away from a peg moving in `direction`.
    ///
    /// Deflection already on the kicked side is dropped first so successive
    /// kicks replace each other instead of piling up.
    #[inline]
    pub fn kick(&mut self, direction: f64, magnitude: f64) {
        if direction > 0.0 {
            if self.deflection > 0.0 {
                self.deflection = 0.0;
            }
            self.velocity = -magnitude;
        } else {
            if self.deflection < 0.0 {
                self.deflection = 0.0;
            }
            self.velocity = magnitude;
        }
    }

    #[inline]
    pub fn is_at_rest(&self, threshold: f64) -> bool {
        self.velocity.abs() < threshold && self.deflection.abs() < threshold
    }
}
