//! Frame timing: display profiles, the fixed-step physics clock and the
//! virtual frame clock used by headless hosts.

use serde::{Deserialize, Serialize};
use wf_core::{REFERENCE_FRAME_MS, WfError, WfResult};

/// Display refresh profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimingProfile {
    /// 60 Hz, the rate the physics constants were tuned for
    Display60,
    /// 120 Hz high refresh
    Display120,
    /// 144 Hz gaming monitors
    Display144,
    /// Custom frame interval
    Custom,
}

impl Default for TimingProfile {
    fn default() -> Self {
        Self::Display60
    }
}

/// Frame timing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Profile type
    pub profile: TimingProfile,

    /// Interval between host frames (ms)
    pub frame_interval_ms: f64,

    /// Step the physics integrator by elapsed time instead of once per frame.
    ///
    /// Off by default: the reference behaviour advances one physics step per
    /// frame callback whatever its real duration.
    pub normalize_physics: bool,

    /// Upper bound on physics steps run in a single frame when normalizing
    pub max_catch_up_steps: u32,
}

impl TimingConfig {
    /// 60 Hz, one physics step per frame
    pub fn display_60() -> Self {
        Self {
            profile: TimingProfile::Display60,
            frame_interval_ms: REFERENCE_FRAME_MS,
            normalize_physics: false,
            max_catch_up_steps: 4,
        }
    }

    /// 120 Hz, physics normalized to the 60 Hz reference step
    pub fn display_120() -> Self {
        Self {
            profile: TimingProfile::Display120,
            frame_interval_ms: 1000.0 / 120.0,
            normalize_physics: true,
            max_catch_up_steps: 4,
        }
    }

    /// 144 Hz, physics normalized to the 60 Hz reference step
    pub fn display_144() -> Self {
        Self {
            profile: TimingProfile::Display144,
            frame_interval_ms: 1000.0 / 144.0,
            normalize_physics: true,
            max_catch_up_steps: 4,
        }
    }

    /// Get config for profile
    pub fn from_profile(profile: TimingProfile) -> Self {
        match profile {
            TimingProfile::Display60 => Self::display_60(),
            TimingProfile::Display120 => Self::display_120(),
            TimingProfile::Display144 => Self::display_144(),
            TimingProfile::Custom => Self::display_60(),
        }
    }

    /// Custom frame interval, keeping the normalization choice
    pub fn with_frame_interval(mut self, interval_ms: f64) -> Self {
        self.profile = TimingProfile::Custom;
        self.frame_interval_ms = interval_ms;
        self
    }

    /// Host frames per second
    pub fn frames_per_second(&self) -> f64 {
        1000.0 / self.frame_interval_ms
    }

    pub fn validate(&self) -> WfResult<()> {
        if !(self.frame_interval_ms > 0.0) {
            return Err(WfError::InvalidConfig(format!(
                "frame_interval_ms must be positive, got {}",
                self.frame_interval_ms
            )));
        }
        if self.max_catch_up_steps == 0 {
            return Err(WfError::InvalidConfig(
                "max_catch_up_steps must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self::display_60()
    }
}

/// Decides how many fixed physics steps a host frame is worth.
#[derive(Debug, Clone, Default)]
pub struct PhysicsClock {
    last_frame_ms: Option<f64>,
    accumulator_ms: f64,
}

impl PhysicsClock {
    /// Forget the previous frame (used when the frame loop resumes from idle)
    pub fn reset(&mut self) {
        self.last_frame_ms = None;
        self.accumulator_ms = 0.0;
    }

    /// Number of physics steps to run for a frame arriving at `now_ms`
    pub fn steps(&mut self, now_ms: f64, config: &TimingConfig) -> u32 {
        let previous = self.last_frame_ms.replace(now_ms);
        if !config.normalize_physics {
            return 1;
        }
        let Some(previous) = previous else {
            return 1;
        };

        self.accumulator_ms += (now_ms - previous).max(0.0);
        let whole = (self.accumulator_ms / REFERENCE_FRAME_MS).floor();
        self.accumulator_ms -= whole * REFERENCE_FRAME_MS;

        let steps = whole as u32;
        if steps > config.max_catch_up_steps {
            // A long stall is dropped rather than replayed.
            self.accumulator_ms = 0.0;
            config.max_catch_up_steps
        } else {
            steps
        }
    }
}

/// Virtual clock for hosts without a real animation scheduler
#[derive(Debug, Clone)]
pub struct FrameClock {
    current_ms: f64,
    frames: u64,
    interval_ms: f64,
}

impl FrameClock {
    /// Create new clock
    pub fn new(config: &TimingConfig) -> Self {
        Self {
            current_ms: 0.0,
            frames: 0,
            interval_ms: config.frame_interval_ms,
        }
    }

    /// Reset to zero
    pub fn reset(&mut self) {
        self.current_ms = 0.0;
        self.frames = 0;
    }

    /// Get current timestamp
    pub fn current(&self) -> f64 {
        self.current_ms
    }

    /// Frames produced so far
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Frame interval (ms)
    pub fn interval(&self) -> f64 {
        self.interval_ms
    }

    /// Advance one frame and return the new timestamp
    pub fn tick(&mut self) -> f64 {
        self.frames += 1;
        self.current_ms = self.frames as f64 * self.interval_ms;
        self.current_ms
    }
}
