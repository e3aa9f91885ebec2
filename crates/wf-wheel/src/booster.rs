//! Deterministic ("booster") spin: the winner is drawn up front and the wheel
//! is tweened onto its centre.

use serde::{Deserialize, Serialize};
use wf_core::{POINTER_OFFSET_DEG, boundary_slot, segment_angle};

use crate::config::BoosterConfig;
use crate::easing::EaseCurve;

/// Planned tween from the current rotation onto a pre-drawn segment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoosterTween {
    winner: usize,
    start_angle: f64,
    target_angle: f64,
    duration_ms: f64,
    easing: EaseCurve,
    /// Host time of the first sampled frame
    started_ms: Option<f64>,
    last_angle: f64,
}

/// One sampled frame of a tween
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoosterSample {
    pub angle: f64,
    /// Linear time progress, 0.0 - 1.0
    pub progress: f64,
    /// A peg passed the pointer since the previous sample
    pub crossed: bool,
    pub finished: bool,
}

impl BoosterTween {
    /// Plan a tween starting at `start_angle` that comes to rest on `winner`
    pub fn plan(start_angle: f64, winner: usize, segment_count: usize, config: &BoosterConfig) -> Self {
        Self {
            winner,
            start_angle,
            target_angle: target_rotation(start_angle, winner, segment_count, config.full_turns),
            duration_ms: config.duration_ms,
            easing: config.easing,
            started_ms: None,
            last_angle: start_angle,
        }
    }

    pub fn winner(&self) -> usize {
        self.winner
    }

    pub fn start_angle(&self) -> f64 {
        self.start_angle
    }

    pub fn target_angle(&self) -> f64 {
        self.target_angle
    }

    /// Sample the tween at host time `now_ms`.
    ///
    /// The clock starts at the first sample, so a tween planned long before
    /// its first frame still runs for its full duration.
    pub fn sample(&mut self, now_ms: f64, segment_angle: f64) -> BoosterSample {
        let started = *self.started_ms.get_or_insert(now_ms);
        let progress = ((now_ms - started) / self.duration_ms).clamp(0.0, 1.0);
        let finished = progress >= 1.0;

        let angle = if finished {
            self.target_angle
        } else {
            self.start_angle + (self.target_angle - self.start_angle) * self.easing.evaluate(progress)
        };

        let crossed =
            boundary_slot(self.last_angle, segment_angle) != boundary_slot(angle, segment_angle);
        self.last_angle = angle;

        BoosterSample {
            angle,
            progress,
            crossed,
            finished,
        }
    }
}

/// Rotation that lands segment `winner` under the pointer after at least
/// `full_turns` whole turns and more than half a turn of travel.
pub fn target_rotation(start_angle: f64, winner: usize, segment_count: usize, full_turns: u32) -> f64 {
    let angle = segment_angle(segment_count);
    let base = ((start_angle / 360.0).floor() + full_turns as f64) * 360.0;
    let mut target = base + POINTER_OFFSET_DEG - (winner as f64 * angle + angle / 2.0);
    while target <= start_angle + 180.0 {
        target += 360.0;
    }
    target
}
