//! Peg tick synthesis

use serde::{Deserialize, Serialize};
use wf_core::{WfError, WfResult};

/// Default output sample rate
pub const DEFAULT_SAMPLE_RATE: u32 = 48_000;

/// Oscillator shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Waveform {
    Sine,
    #[default]
    Triangle,
    Square,
}

impl Waveform {
    /// Value at `phase` (0.0 - 1.0), in [-1, 1]
    #[inline]
    pub fn value(&self, phase: f64) -> f64 {
        match self {
            Waveform::Sine => (phase * std::f64::consts::TAU).sin(),
            Waveform::Triangle => {
                if phase < 0.25 {
                    4.0 * phase
                } else if phase < 0.75 {
                    2.0 - 4.0 * phase
                } else {
                    4.0 * phase - 4.0
                }
            }
            Waveform::Square => {
                if phase < 0.5 {
                    1.0
                } else {
                    -1.0
                }
            }
        }
    }
}

/// Short pitched click played on every peg crossing
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TickSynth {
    pub waveform: Waveform,
    pub frequency_hz: f64,
    pub duration_ms: f64,
    /// Gain at the start of the click
    pub start_gain: f64,
    /// Gain reached at the end of the exponential ramp
    pub end_gain: f64,
}

impl Default for TickSynth {
    fn default() -> Self {
        Self {
            waveform: Waveform::Triangle,
            frequency_hz: 1200.0,
            duration_ms: 50.0,
            start_gain: 0.4,
            end_gain: 0.001,
        }
    }
}

impl TickSynth {
    pub fn validate(&self) -> WfResult<()> {
        if !(self.frequency_hz > 0.0 && self.duration_ms > 0.0) {
            return Err(WfError::InvalidConfig(
                "tick frequency and duration must be positive".into(),
            ));
        }
        // Exponential ramps cannot reach or start from zero.
        if !(self.start_gain > 0.0 && self.end_gain > 0.0) {
            return Err(WfError::InvalidConfig(
                "tick gains must be positive for an exponential ramp".into(),
            ));
        }
        Ok(())
    }

    /// Samples in one click at `sample_rate`
    pub fn len_at(&self, sample_rate: u32) -> usize {
        (self.duration_ms * sample_rate as f64 / 1000.0).round() as usize
    }

    /// Gain `t_ms` into the click
    #[inline]
    pub fn gain_at(&self, t_ms: f64) -> f64 {
        let progress = (t_ms / self.duration_ms).clamp(0.0, 1.0);
        self.start_gain * (self.end_gain / self.start_gain).powf(progress)
    }

    /// Render one click, mono
    pub fn render(&self, sample_rate: u32) -> Vec<f32> {
        let rate = sample_rate as f64;
        (0..self.len_at(sample_rate))
            .map(|i| {
                let t = i as f64 / rate;
                let phase = (t * self.frequency_hz).fract();
                (self.waveform.value(phase) * self.gain_at(t * 1000.0)) as f32
            })
            .collect()
    }
}

/// Mix one click per tick time into a mono track of `total_ms`.
///
/// Overlapping clicks add up; the mix is clipped to ±1. Clicks starting
/// outside the track are dropped, clicks running past its end are cut.
pub fn render_tick_track(
    synth: &TickSynth,
    tick_times_ms: &[f64],
    total_ms: f64,
    sample_rate: u32,
) -> Vec<f32> {
    let rate = sample_rate as f64;
    let len = (total_ms.max(0.0) * rate / 1000.0).ceil() as usize;
    let mut track = vec![0.0f32; len];
    let click = synth.render(sample_rate);

    let mut placed = 0usize;
    for &time in tick_times_ms {
        if !(0.0..total_ms).contains(&time) {
            continue;
        }
        let offset = (time * rate / 1000.0).round() as usize;
        if offset >= len {
            continue;
        }
        for (out, &sample) in track[offset..].iter_mut().zip(&click) {
            *out += sample;
        }
        placed += 1;
    }

    for sample in &mut track {
        *sample = sample.clamp(-1.0, 1.0);
    }
    log::debug!(
        "Rendered tick track: {placed}/{} ticks, {len} samples @ {sample_rate} Hz",
        tick_times_ms.len()
    );
    track
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_triangle_shape() {
        let wave = Waveform::Triangle;
        assert_abs_diff_eq!(wave.value(0.0), 0.0);
        assert_abs_diff_eq!(wave.value(0.25), 1.0);
        assert_abs_diff_eq!(wave.value(0.5), 0.0);
        assert_abs_diff_eq!(wave.value(0.75), -1.0);
        assert_abs_diff_eq!(wave.value(0.999), -0.004, epsilon = 1e-9);
    }

    #[test]
    fn test_gain_ramp_endpoints() {
        let synth = TickSynth::default();
        assert_abs_diff_eq!(synth.gain_at(0.0), 0.4);
        assert_abs_diff_eq!(synth.gain_at(50.0), 0.001, epsilon = 1e-12);
        assert_abs_diff_eq!(synth.gain_at(500.0), 0.001, epsilon = 1e-12);
        assert!(synth.gain_at(10.0) > synth.gain_at(20.0));
    }

    #[test]
    fn test_click_length_and_peak() {
        let synth = TickSynth::default();
        let click = synth.render(48_000);
        assert_eq!(click.len(), 2_400);
        let peak = click.iter().fold(0.0f32, |m, s| m.max(s.abs()));
        assert!(peak <= 0.4 + 1e-6);
        assert!(peak > 0.3);
        // Tail has decayed
        assert!(click[2_390..].iter().all(|s| s.abs() < 0.002));
    }

    #[test]
    fn test_track_places_and_clips() {
        let synth = TickSynth {
            start_gain: 0.9,
            ..TickSynth::default()
        };
        let track = render_tick_track(&synth, &[0.0, 0.0, 100.0, 5_000.0, -3.0], 200.0, 8_000);
        assert_eq!(track.len(), 1_600);
        assert!(track.iter().all(|s| s.abs() <= 1.0));
        // Second click starts at sample 800
        assert_eq!(track[799], 0.0);
        assert!(track[800..1_200].iter().any(|s| s.abs() > 0.1));
        // Silence between the clicks
        assert!(track[400..800].iter().all(|&s| s == 0.0));
    }

    #[test]
    fn test_validate() {
        assert!(TickSynth::default().validate().is_ok());
        let silent = TickSynth {
            end_gain: 0.0,
            ..TickSynth::default()
        };
        assert!(silent.validate().is_err());
    }
}
