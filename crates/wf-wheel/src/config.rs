//! Wheel engine configuration
//!
//! Every constant of the spin simulation lives here. Defaults reproduce the
//! reference feel at 60 Hz; all sections accept partial JSON/YAML documents.

use std::path::Path;

use serde::{Deserialize, Serialize};
use wf_core::{REFERENCE_FRAME_MS, SpinMode, WfError, WfResult};

use crate::easing::EaseCurve;
use crate::timing::TimingConfig;

/// Friction, detent and settle constants of the physics mode
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Speed at or above which the fast-decay friction applies
    pub high_speed_threshold: f64,
    /// Speed at or below which the slow-decay friction applies
    pub low_speed_threshold: f64,
    /// Per-frame velocity multiplier at high speed
    pub high_speed_friction: f64,
    /// Per-frame velocity multiplier at low speed
    pub low_speed_friction: f64,

    /// Strength of the pull toward the centre of the segment under the pointer
    pub detent_factor: f64,
    /// Speed below which the detent engages
    pub detent_speed: f64,

    /// Velocity multiplier applied on every peg crossing
    pub peg_drag: f64,
    /// Pointer kick at zero wheel speed
    pub kick_base: f64,
    /// Additional pointer kick per unit of wheel speed
    pub kick_gain: f64,

    /// Speed below which the wheel starts settling
    pub stop_velocity: f64,
    /// Speed below which a settling wheel is declared at rest
    pub settle_velocity: f64,

    /// Maximum backward travel after a reversal, in segment widths
    pub reversal_limit: f64,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            high_speed_threshold: 15.0,
            low_speed_threshold: 5.0,
            high_speed_friction: 0.985,
            low_speed_friction: 0.998,
            detent_factor: 0.0012,
            detent_speed: 2.0,
            peg_drag: 0.96,
            kick_base: 5.0,
            kick_gain: 2.0,
            stop_velocity: 0.005,
            settle_velocity: 0.001,
            reversal_limit: 0.5,
        }
    }
}

impl PhysicsConfig {
    pub fn validate(&self) -> WfResult<()> {
        if !(self.low_speed_threshold > 0.0 && self.low_speed_threshold < self.high_speed_threshold) {
            return Err(invalid(format!(
                "speed thresholds must satisfy 0 < low ({}) < high ({})",
                self.low_speed_threshold, self.high_speed_threshold
            )));
        }
        for (name, value) in [
            ("high_speed_friction", self.high_speed_friction),
            ("low_speed_friction", self.low_speed_friction),
            ("peg_drag", self.peg_drag),
        ] {
            if !(value > 0.0 && value <= 1.0) {
                return Err(invalid(format!("{name} must be in (0, 1], got {value}")));
            }
        }
        if self.detent_factor < 0.0 || self.detent_speed < 0.0 {
            return Err(invalid("detent factor and speed must be non-negative"));
        }
        if !(self.settle_velocity > 0.0 && self.stop_velocity >= self.settle_velocity) {
            return Err(invalid(format!(
                "settle velocities must satisfy 0 < settle ({}) <= stop ({})",
                self.settle_velocity, self.stop_velocity
            )));
        }
        if self.reversal_limit < 0.0 {
            return Err(invalid("reversal_limit must be non-negative"));
        }
        Ok(())
    }
}

/// Spring constants of the pointer needle
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PointerConfig {
    /// Restoring force per degree of deflection
    pub stiffness: f64,
    /// Per-frame velocity multiplier
    pub damping: f64,
    /// Deflection and speed under which the needle counts as at rest
    pub rest_threshold: f64,
}

impl Default for PointerConfig {
    fn default() -> Self {
        Self {
            stiffness: 0.3,
            damping: 0.85,
            rest_threshold: 0.01,
        }
    }
}

impl PointerConfig {
    pub fn validate(&self) -> WfResult<()> {
        if !(self.stiffness > 0.0) {
            return Err(invalid("pointer stiffness must be positive"));
        }
        if !(self.damping > 0.0 && self.damping < 1.0) {
            return Err(invalid(format!(
                "pointer damping must be in (0, 1), got {}",
                self.damping
            )));
        }
        if !(self.rest_threshold > 0.0) {
            return Err(invalid("pointer rest_threshold must be positive"));
        }
        Ok(())
    }
}

/// Deterministic (booster) spin settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BoosterConfig {
    /// Tween duration (ms of host time)
    pub duration_ms: f64,
    /// Full revolutions before the target segment
    pub full_turns: u32,
    /// Minimum pointer kick per crossing
    pub kick_base: f64,
    /// Random extra kick, uniform in `[0, kick_jitter)`
    pub kick_jitter: f64,
    /// Tween easing
    pub easing: EaseCurve,
}

impl Default for BoosterConfig {
    fn default() -> Self {
        Self {
            duration_ms: 900.0,
            full_turns: 5,
            kick_base: 15.0,
            kick_jitter: 5.0,
            easing: EaseCurve::QuintOut,
        }
    }
}

impl BoosterConfig {
    pub fn validate(&self) -> WfResult<()> {
        if !(self.duration_ms > 0.0) {
            return Err(invalid("booster duration_ms must be positive"));
        }
        if self.kick_base < 0.0 || self.kick_jitter < 0.0 {
            return Err(invalid("booster kick values must be non-negative"));
        }
        Ok(())
    }
}

/// Drag-to-fling capture settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    /// Samples kept in the rolling history
    pub max_samples: usize,
    /// Only samples this recent at release are averaged (ms)
    pub window_ms: f64,
    /// Frame length used to express drag velocity (ms)
    pub reference_frame_ms: f64,
    /// Release velocity clamp (degrees per reference frame)
    pub max_fling: f64,
    /// Release velocities at or below this magnitude are taps
    pub min_fling: f64,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            max_samples: 5,
            window_ms: 100.0,
            reference_frame_ms: REFERENCE_FRAME_MS,
            max_fling: 45.0,
            min_fling: 1.0,
        }
    }
}

impl GestureConfig {
    pub fn validate(&self) -> WfResult<()> {
        if self.max_samples == 0 {
            return Err(invalid("gesture max_samples must be at least 1"));
        }
        if !(self.window_ms > 0.0 && self.reference_frame_ms > 0.0) {
            return Err(invalid("gesture window and reference frame must be positive"));
        }
        if !(self.min_fling >= 0.0 && self.max_fling > self.min_fling) {
            return Err(invalid(format!(
                "fling limits must satisfy 0 <= min ({}) < max ({})",
                self.min_fling, self.max_fling
            )));
        }
        Ok(())
    }
}

/// Initial velocity range of a button-triggered physics spin
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ButtonConfig {
    pub min_velocity: f64,
    pub max_velocity: f64,
}

impl Default for ButtonConfig {
    fn default() -> Self {
        Self {
            min_velocity: 25.0,
            max_velocity: 40.0,
        }
    }
}

impl ButtonConfig {
    pub fn validate(&self) -> WfResult<()> {
        if !(self.min_velocity > 0.0 && self.max_velocity >= self.min_velocity) {
            return Err(invalid(format!(
                "button velocities must satisfy 0 < min ({}) <= max ({})",
                self.min_velocity, self.max_velocity
            )));
        }
        Ok(())
    }
}

/// Complete engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WheelConfig {
    /// Mode used by button spins
    pub mode: SpinMode,
    /// Fewest segments a spin is allowed with (never below 2)
    pub min_segments: usize,
    /// RNG seed for reproducible spins (None = OS entropy)
    pub seed: Option<u64>,
    pub physics: PhysicsConfig,
    pub pointer: PointerConfig,
    pub booster: BoosterConfig,
    pub gesture: GestureConfig,
    pub button: ButtonConfig,
    pub timing: TimingConfig,
}

impl Default for WheelConfig {
    fn default() -> Self {
        Self {
            mode: SpinMode::Physics,
            min_segments: 2,
            seed: None,
            physics: PhysicsConfig::default(),
            pointer: PointerConfig::default(),
            booster: BoosterConfig::default(),
            gesture: GestureConfig::default(),
            button: ButtonConfig::default(),
            timing: TimingConfig::default(),
        }
    }
}

impl WheelConfig {
    /// Booster mode with otherwise default settings
    pub fn booster() -> Self {
        Self {
            mode: SpinMode::Booster,
            ..Default::default()
        }
    }

    /// Builder: set seed for reproducibility
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Builder: set button spin mode
    pub fn with_mode(mut self, mode: SpinMode) -> Self {
        self.mode = mode;
        self
    }

    /// Builder: set frame timing
    pub fn with_timing(mut self, timing: TimingConfig) -> Self {
        self.timing = timing;
        self
    }

    pub fn validate(&self) -> WfResult<()> {
        if self.min_segments < 2 {
            return Err(invalid(format!(
                "min_segments must be at least 2, got {}",
                self.min_segments
            )));
        }
        self.physics.validate()?;
        self.pointer.validate()?;
        self.booster.validate()?;
        self.gesture.validate()?;
        self.button.validate()?;
        self.timing.validate()
    }

    /// Parse and validate a JSON document
    pub fn from_json(json: &str) -> WfResult<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| WfError::Serialization(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a YAML document
    pub fn from_yaml(yaml: &str) -> WfResult<Self> {
        let config: Self =
            serde_yml::from_str(yaml).map_err(|e| WfError::Serialization(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a `.json`, `.yaml` or `.yml` file
    pub fn load(path: impl AsRef<Path>) -> WfResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::from_json(&text),
            Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => {
                Self::from_yaml(&text)
            }
            _ => Err(invalid(format!(
                "unsupported config file '{}': expected .json, .yaml or .yml",
                path.display()
            ))),
        }
    }

    /// Export as pretty JSON
    pub fn to_json(&self) -> WfResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| WfError::Serialization(e.to_string()))
    }
}

fn invalid(message: impl Into<String>) -> WfError {
    WfError::InvalidConfig(message.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = WheelConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.mode, SpinMode::Physics);
        assert_eq!(config.booster.full_turns, 5);
        assert_eq!(config.gesture.max_samples, 5);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = WheelConfig::from_json(
            r#"{ "mode": "booster", "seed": 7, "booster": { "duration_ms": 600 } }"#,
        )
        .unwrap();
        assert_eq!(config.mode, SpinMode::Booster);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.booster.duration_ms, 600.0);
        assert_eq!(config.booster.full_turns, 5);
        assert_eq!(config.physics.peg_drag, 0.96);
    }

    #[test]
    fn test_yaml() {
        let yaml = "mode: physics\nphysics:\n  detent_factor: 0.002\ntiming:\n  profile: display120\n  frame_interval_ms: 8.33\n  normalize_physics: true\n";
        let config = WheelConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.physics.detent_factor, 0.002);
        assert!(config.timing.normalize_physics);
    }

    #[test]
    fn test_json_roundtrip_preserves_config() {
        let config = WheelConfig::booster().with_seed(99);
        let json = config.to_json().unwrap();
        let parsed = WheelConfig::from_json(&json).unwrap();
        assert_eq!(parsed.seed, Some(99));
        assert_eq!(parsed.mode, SpinMode::Booster);
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = WheelConfig::default();
        config.min_segments = 1;
        assert!(config.validate().is_err());

        let mut config = WheelConfig::default();
        config.physics.high_speed_friction = 1.5;
        assert!(config.validate().is_err());

        let mut config = WheelConfig::default();
        config.physics.settle_velocity = 0.01;
        assert!(matches!(config.validate(), Err(WfError::InvalidConfig(_))));

        let mut config = WheelConfig::default();
        config.gesture.max_fling = 0.5;
        assert!(config.validate().is_err());

        assert!(WheelConfig::from_json("{ not json").is_err());
    }
}
