//! Simulation configuration

use serde::{Deserialize, Serialize};
use wf_core::{SpinMode, WfError, WfResult};
use wf_wheel::WheelConfig;

/// Batch simulation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Total spins to run
    pub spins: usize,
    /// Segment count of the simulated wheel
    pub segments: usize,
    /// Spin mode, overrides `wheel.mode`
    pub mode: SpinMode,
    /// Master seed (None = OS entropy)
    pub seed: Option<u64>,
    /// Spins per independently seeded chunk
    pub chunk_size: usize,
    /// Frames after which a spin is abandoned
    pub max_frames_per_spin: u64,
    /// Worker threads (None = all cores)
    pub threads: Option<usize>,
    /// Engine configuration
    pub wheel: WheelConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            spins: 10_000,
            segments: 6,
            mode: SpinMode::Booster,
            seed: None,
            chunk_size: 500,
            max_frames_per_spin: 100_000,
            threads: None,
            wheel: WheelConfig::default(),
        }
    }
}

impl SimConfig {
    /// Quick run for smoke tests
    pub fn quick() -> Self {
        Self {
            spins: 600,
            chunk_size: 100,
            ..Default::default()
        }
    }

    pub fn with_spins(mut self, spins: usize) -> Self {
        self.spins = spins;
        self
    }

    pub fn with_segments(mut self, segments: usize) -> Self {
        self.segments = segments;
        self
    }

    pub fn with_mode(mut self, mode: SpinMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = Some(threads);
        self
    }

    pub fn with_wheel(mut self, wheel: WheelConfig) -> Self {
        self.wheel = wheel;
        self
    }

    /// Threads the run will use
    pub fn effective_threads(&self) -> usize {
        self.threads.unwrap_or_else(num_cpus::get).max(1)
    }

    pub fn validate(&self) -> WfResult<()> {
        if self.spins == 0 {
            return Err(WfError::InvalidConfig("spins must be at least 1".into()));
        }
        if self.segments < self.wheel.min_segments.max(2) {
            return Err(WfError::InvalidConfig(format!(
                "a wheel needs at least {} segments to spin, got {}",
                self.wheel.min_segments.max(2),
                self.segments
            )));
        }
        if self.chunk_size == 0 || self.max_frames_per_spin == 0 {
            return Err(WfError::InvalidConfig(
                "chunk_size and max_frames_per_spin must be positive".into(),
            ));
        }
        if self.threads == Some(0) {
            return Err(WfError::InvalidConfig("threads must be at least 1".into()));
        }
        self.wheel.validate()
    }
}
