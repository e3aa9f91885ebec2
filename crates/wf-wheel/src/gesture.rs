//! Drag-to-fling capture.
//!
//! While the pointer is held the wheel follows it 1:1. Each move records the
//! drag speed; on release the recent samples are averaged into a launch
//! velocity for a physics spin.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use wf_core::{normalize_delta, per_reference_frame};

use crate::config::GestureConfig;

/// Drag speed at one pointer move
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GestureSample {
    /// Degrees per reference frame
    pub angular_velocity: f64,
    pub timestamp_ms: f64,
}

/// Rolling drag history between pointer down and pointer up
#[derive(Debug, Clone, Default)]
pub struct FlingTracker {
    capturing: bool,
    last_angle: f64,
    last_time_ms: f64,
    samples: VecDeque<GestureSample>,
}

impl FlingTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a capture at pointer angle `angle`
    pub fn begin(&mut self, angle: f64, now_ms: f64) {
        self.capturing = true;
        self.last_angle = angle;
        self.last_time_ms = now_ms;
        self.samples.clear();
    }

    pub fn is_capturing(&self) -> bool {
        self.capturing
    }

    pub fn samples(&self) -> impl Iterator<Item = &GestureSample> {
        self.samples.iter()
    }

    /// Track an absolute pointer angle. Returns the rotation delta to apply,
    /// or `None` when no capture is active.
    pub fn track_angle(&mut self, angle: f64, now_ms: f64, config: &GestureConfig) -> Option<f64> {
        if !self.capturing {
            return None;
        }
        let delta = normalize_delta(angle - self.last_angle);
        self.last_angle = angle;
        self.record(delta, now_ms, config);
        Some(delta)
    }

    /// Track a precomputed rotation delta covering `dt_ms`
    pub fn track_delta(&mut self, delta: f64, dt_ms: f64, config: &GestureConfig) -> Option<f64> {
        if !self.capturing {
            return None;
        }
        let now_ms = self.last_time_ms + dt_ms.max(0.0);
        self.record(delta, now_ms, config);
        Some(delta)
    }

    fn record(&mut self, delta: f64, now_ms: f64, config: &GestureConfig) {
        let dt = now_ms - self.last_time_ms;
        self.last_time_ms = now_ms;
        // Two events in the same millisecond carry no speed information.
        let Some(angular_velocity) = per_reference_frame(delta, dt, config.reference_frame_ms) else {
            return;
        };
        self.samples.push_back(GestureSample {
            angular_velocity,
            timestamp_ms: now_ms,
        });
        while self.samples.len() > config.max_samples {
            self.samples.pop_front();
        }
    }

    /// End the capture and compute the fling velocity.
    ///
    /// Averages samples younger than the window, clamps to the fling limit
    /// and returns `None` for slow releases (taps and careful drags).
    pub fn release(&mut self, now_ms: f64, config: &GestureConfig) -> Option<f64> {
        if !self.capturing {
            return None;
        }
        self.capturing = false;

        let (sum, count) = self
            .samples
            .drain(..)
            .filter(|sample| now_ms - sample.timestamp_ms < config.window_ms)
            .fold((0.0, 0usize), |(sum, count), sample| {
                (sum + sample.angular_velocity, count + 1)
            });
        if count == 0 {
            return None;
        }

        let velocity = (sum / count as f64).clamp(-config.max_fling, config.max_fling);
        (velocity.abs() > config.min_fling).then_some(velocity)
    }

    /// Drop the capture without producing a fling
    pub fn cancel(&mut self) {
        self.capturing = false;
        self.samples.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_moves_require_capture() {
        let config = GestureConfig::default();
        let mut tracker = FlingTracker::new();
        assert_eq!(tracker.track_angle(10.0, 5.0, &config), None);
        assert_eq!(tracker.track_delta(10.0, 5.0, &config), None);
        assert_eq!(tracker.release(10.0, &config), None);
    }

    #[test]
    fn test_delta_wraps_across_seam() {
        let config = GestureConfig::default();
        let mut tracker = FlingTracker::new();
        tracker.begin(170.0, 0.0);
        let delta = tracker.track_angle(-170.0, 10.0, &config).unwrap();
        assert_abs_diff_eq!(delta, 20.0, epsilon = 1e-9);
    }

    #[test]
    fn test_history_is_bounded() {
        let config = GestureConfig::default();
        let mut tracker = FlingTracker::new();
        tracker.begin(0.0, 0.0);
        for i in 1..=12 {
            tracker.track_delta(2.0, 10.0, &config);
            assert!(tracker.samples().count() <= config.max_samples, "after {i} moves");
        }
        assert_eq!(tracker.samples().count(), 5);
    }

    #[test]
    fn test_release_averages_recent_samples() {
        let config = GestureConfig::default();
        let mut tracker = FlingTracker::new();
        tracker.begin(0.0, 0.0);
        // Old, slow sample falls out of the window
        tracker.track_angle(1.0, 400.0, &config);
        tracker.track_angle(21.0, 400.0 + config.reference_frame_ms, &config);
        tracker.track_angle(41.0, 400.0 + 2.0 * config.reference_frame_ms, &config);
        let velocity = tracker.release(510.0, &config).unwrap();
        assert_abs_diff_eq!(velocity, 20.0, epsilon = 1e-9);
        assert!(!tracker.is_capturing());
    }

    #[test]
    fn test_release_clamps_and_ignores_taps() {
        let config = GestureConfig::default();

        let mut tracker = FlingTracker::new();
        tracker.begin(0.0, 0.0);
        tracker.track_angle(120.0, 5.0, &config);
        assert_eq!(tracker.release(10.0, &config), Some(45.0));

        let mut tracker = FlingTracker::new();
        tracker.begin(0.0, 0.0);
        tracker.track_delta(-0.5, config.reference_frame_ms, &config);
        assert_eq!(tracker.release(20.0, &config), None);

        let mut tracker = FlingTracker::new();
        tracker.begin(0.0, 0.0);
        assert_eq!(tracker.release(20.0, &config), None);
    }

    #[test]
    fn test_same_timestamp_moves_skip_sample() {
        let config = GestureConfig::default();
        let mut tracker = FlingTracker::new();
        tracker.begin(0.0, 100.0);
        assert_eq!(tracker.track_angle(5.0, 100.0, &config), Some(5.0));
        assert_eq!(tracker.samples().count(), 0);
    }
}
