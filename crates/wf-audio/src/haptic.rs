//! Vibration pulses for devices with a haptic motor

use serde::{Deserialize, Serialize};

/// One vibration burst per peg tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HapticPulse {
    pub duration_ms: f64,
}

impl Default for HapticPulse {
    fn default() -> Self {
        Self { duration_ms: 15.0 }
    }
}

/// Motor on-interval
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VibrationSpan {
    pub start_ms: f64,
    pub end_ms: f64,
}

impl HapticPulse {
    /// Motor schedule for a run of ticks. Overlapping pulses merge into one
    /// span.
    pub fn schedule(&self, tick_times_ms: &[f64]) -> Vec<VibrationSpan> {
        let mut times = tick_times_ms.to_vec();
        times.sort_by(f64::total_cmp);

        let mut spans: Vec<VibrationSpan> = Vec::new();
        for start_ms in times {
            let end_ms = start_ms + self.duration_ms;
            match spans.last_mut() {
                Some(last) if start_ms <= last.end_ms => last.end_ms = last.end_ms.max(end_ms),
                _ => spans.push(VibrationSpan { start_ms, end_ms }),
            }
        }
        spans
    }
}
