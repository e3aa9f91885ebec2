//! wf-core: Shared types and angle math for the wheel workspace
//!
//! This crate provides the foundational pieces used by every other wheel crate.

mod angle;
mod error;

pub use angle::*;
pub use error::*;

/// Duration of the frame the simulation constants were tuned against (ms).
///
/// Gesture velocities are expressed in degrees per reference frame so that a
/// fling and a button spin share one velocity scale.
pub const REFERENCE_FRAME_MS: f64 = 16.67;

/// Convert a per-sample angular delta into degrees per frame of `frame_ms`.
///
/// Returns `None` for a zero or negative sample interval.
#[inline]
pub fn per_reference_frame(delta_deg: f64, dt_ms: f64, frame_ms: f64) -> Option<f64> {
    (dt_ms > 0.0).then(|| delta_deg / (dt_ms / frame_ms))
}

/// Spin mode selected for button-triggered spins
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpinMode {
    /// Friction/detent physics, settles wherever the wheel stops
    #[default]
    Physics,
    /// Pre-drawn winner, fixed-length eased tween
    Booster,
}

impl SpinMode {
    /// Get display name
    pub fn name(&self) -> &'static str {
        match self {
            SpinMode::Physics => "physics",
            SpinMode::Booster => "booster",
        }
    }
}

impl std::str::FromStr for SpinMode {
    type Err = WfError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "physics" | "normal" => Ok(SpinMode::Physics),
            "booster" | "deterministic" => Ok(SpinMode::Booster),
            other => Err(WfError::InvalidConfig(format!("unknown spin mode '{other}'"))),
        }
    }
}
