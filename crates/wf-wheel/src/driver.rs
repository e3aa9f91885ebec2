//! Headless frame host
//!
//! Stands in for a display's frame callback: feeds the engine virtual frame
//! times from a [`FrameClock`] for as long as it asks for frames.

use serde::{Deserialize, Serialize};

use crate::engine::{FrameStatus, RenderState, SpinEngine};
use crate::events::SpinEvents;
use crate::timing::{FrameClock, TimingConfig};

/// Default cap on frames per run (about 30 minutes at 60 Hz)
pub const DEFAULT_MAX_FRAMES: u64 = 100_000;

/// Summary of a driver run
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DriveReport {
    pub frames: u64,
    /// Virtual time covered by the run
    pub elapsed_ms: f64,
    /// The engine still wanted frames when the cap was reached
    pub hit_frame_limit: bool,
}

/// Runs an engine on virtual time
#[derive(Debug, Clone)]
pub struct FrameDriver {
    clock: FrameClock,
    max_frames: u64,
}

impl FrameDriver {
    pub fn new(timing: &TimingConfig) -> Self {
        Self {
            clock: FrameClock::new(timing),
            max_frames: DEFAULT_MAX_FRAMES,
        }
    }

    /// Builder: cap frames per run
    pub fn with_max_frames(mut self, max_frames: u64) -> Self {
        self.max_frames = max_frames;
        self
    }

    /// Current virtual time
    pub fn now(&self) -> f64 {
        self.clock.current()
    }

    pub fn clock(&self) -> &FrameClock {
        &self.clock
    }

    /// Call `frame()` until the engine goes idle or the cap is hit
    pub fn run_until_idle<E: SpinEvents>(&mut self, engine: &mut SpinEngine<E>) -> DriveReport {
        self.run_observed(engine, |_| {})
    }

    /// Like [`run_until_idle`](Self::run_until_idle), handing every frame's
    /// render state to `observer`
    pub fn run_observed<E, F>(&mut self, engine: &mut SpinEngine<E>, mut observer: F) -> DriveReport
    where
        E: SpinEvents,
        F: FnMut(&RenderState),
    {
        let start_ms = self.clock.current();
        let mut frames = 0;
        while engine.needs_frame() {
            if frames >= self.max_frames {
                log::warn!(
                    "Frame limit {} reached with the engine still active",
                    self.max_frames
                );
                return DriveReport {
                    frames,
                    elapsed_ms: self.clock.current() - start_ms,
                    hit_frame_limit: true,
                };
            }
            let now = self.clock.tick();
            let status = engine.frame(now);
            frames += 1;
            observer(&engine.render_state());
            if status == FrameStatus::Idle {
                break;
            }
        }
        DriveReport {
            frames,
            elapsed_ms: self.clock.current() - start_ms,
            hit_frame_limit: false,
        }
    }

    /// Run exactly `count` frames (or fewer if the engine goes idle)
    pub fn run_frames<E: SpinEvents>(&mut self, engine: &mut SpinEngine<E>, count: u64) -> u64 {
        let mut frames = 0;
        while frames < count && engine.needs_frame() {
            let now = self.clock.tick();
            engine.frame(now);
            frames += 1;
        }
        frames
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WheelConfig;
    use crate::events::EventLog;
    use crate::segments::SegmentList;

    fn engine() -> SpinEngine<EventLog> {
        let mut engine =
            SpinEngine::with_config(WheelConfig::booster().with_seed(3), EventLog::new()).unwrap();
        engine
            .set_segments(SegmentList::new(["a", "b", "c", "d"]))
            .unwrap();
        engine
    }

    #[test]
    fn test_idle_engine_runs_no_frames() {
        let mut engine = engine();
        let mut driver = FrameDriver::new(&TimingConfig::default());
        let report = driver.run_until_idle(&mut engine);
        assert_eq!(report.frames, 0);
        assert!(!report.hit_frame_limit);
    }

    #[test]
    fn test_booster_run_covers_tween_duration() {
        let mut engine = engine();
        let timing = TimingConfig::default();
        let mut driver = FrameDriver::new(&timing);
        assert!(engine.request_spin());

        let mut rotations = Vec::new();
        let report = driver.run_observed(&mut engine, |state| rotations.push(state.rotation));
        assert!(!report.hit_frame_limit);
        assert_eq!(report.frames as usize, rotations.len());
        // 900 ms tween plus needle relaxation
        assert!(report.elapsed_ms >= 900.0);
        assert_eq!(engine.events().settles(), 1);
        assert!(!engine.needs_frame());
    }

    #[test]
    fn test_frame_limit_is_reported() {
        let mut engine = engine();
        let mut driver = FrameDriver::new(&TimingConfig::default()).with_max_frames(5);
        engine.request_spin();
        let report = driver.run_until_idle(&mut engine);
        assert!(report.hit_frame_limit);
        assert_eq!(report.frames, 5);
        assert!(engine.is_spinning());
    }

    #[test]
    fn test_run_frames_stops_at_count() {
        let mut engine = engine();
        let mut driver = FrameDriver::new(&TimingConfig::default());
        engine.request_spin();
        assert_eq!(driver.run_frames(&mut engine, 3), 3);
        assert_eq!(engine.frame_count(), 3);
    }
}
