//! Spin engine
//!
//! Owns the wheel rotation and the pointer needle, runs one simulation step
//! per host frame and resolves the winner when motion ends.
//!
//! ## Lifecycle
//!
//! ```text
//! spin / spin_deterministic / pointer_up ──► session ──► frame()* ──► on_settle
//!                                              │
//!                                              └── cancel() ──► on_cancel
//! ```
//!
//! The host calls [`SpinEngine::frame`] while [`SpinEngine::needs_frame`] is
//! true. Once the spin has settled and the needle has stopped wobbling the
//! engine goes idle until the next spin or drag.

use log::{debug, info, trace};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use wf_core::{SpinMode, WfError, WfResult, winning_index};

use crate::booster::BoosterTween;
use crate::config::WheelConfig;
use crate::events::{FrameStamp, NullEvents, SpinEvents};
use crate::gesture::FlingTracker;
use crate::physics::{PhysicsSession, RotationState};
use crate::pointer::PointerState;
use crate::segments::SegmentList;
use crate::timing::PhysicsClock;

/// What the renderer needs each frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RenderState {
    /// Wheel rotation in degrees (unbounded)
    pub rotation: f64,
    /// Needle deflection in degrees
    pub pointer_deflection: f64,
    /// A spin session is active
    pub spinning: bool,
}

/// Result of one [`SpinEngine::frame`] call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameStatus {
    /// More frames are needed
    Active,
    /// Nothing left to animate; stop scheduling frames
    Idle,
}

#[derive(Debug, Clone)]
enum SessionMotion {
    Physics(PhysicsSession),
    Booster(BoosterTween),
}

/// One accepted spin, from start to settle or cancel
#[derive(Debug, Clone)]
pub struct SpinSession {
    id: u64,
    segment_count: usize,
    segment_angle: f64,
    start_rotation: f64,
    started_frame: u64,
    motion: SessionMotion,
}

impl SpinSession {
    /// Sequential id, starting at 1 for the engine's first spin
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Physics or booster, fixed for the session
    pub fn mode(&self) -> SpinMode {
        match self.motion {
            SessionMotion::Physics(_) => SpinMode::Physics,
            SessionMotion::Booster(_) => SpinMode::Booster,
        }
    }

    /// Segment count snapshotted at spin start
    pub fn segment_count(&self) -> usize {
        self.segment_count
    }

    /// Degrees per segment at spin start
    pub fn segment_angle(&self) -> f64 {
        self.segment_angle
    }

    /// Wheel rotation when the spin was accepted
    pub fn start_rotation(&self) -> f64 {
        self.start_rotation
    }

    /// Booster only: the tween's end rotation
    pub fn target_rotation(&self) -> Option<f64> {
        match &self.motion {
            SessionMotion::Booster(tween) => Some(tween.target_angle()),
            SessionMotion::Physics(_) => None,
        }
    }

    /// Booster only: the pre-drawn winner
    pub fn winner(&self) -> Option<usize> {
        match &self.motion {
            SessionMotion::Booster(tween) => Some(tween.winner()),
            SessionMotion::Physics(_) => None,
        }
    }
}

/// Wheel of fortune spin engine
pub struct SpinEngine<E: SpinEvents = NullEvents> {
    config: WheelConfig,
    segments: SegmentList,
    rotation: RotationState,
    pointer: PointerState,
    session: Option<SpinSession>,
    gesture: FlingTracker,
    physics_clock: PhysicsClock,
    /// Host should keep calling `frame`
    scheduled: bool,
    frame: u64,
    last_frame_ms: f64,
    next_session_id: u64,
    rng: StdRng,
    events: E,
}

impl SpinEngine<NullEvents> {
    /// Engine with default config and no event sink
    pub fn new() -> Self {
        Self::with_events(NullEvents)
    }
}

impl Default for SpinEngine<NullEvents> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: SpinEvents> SpinEngine<E> {
    /// Engine with default config reporting to `events`
    pub fn with_events(events: E) -> Self {
        Self::build(WheelConfig::default(), events)
    }

    /// Engine with a validated custom config
    pub fn with_config(config: WheelConfig, events: E) -> WfResult<Self> {
        config.validate()?;
        Ok(Self::build(config, events))
    }

    fn build(config: WheelConfig, events: E) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            config,
            segments: SegmentList::default(),
            rotation: RotationState::default(),
            pointer: PointerState::default(),
            session: None,
            gesture: FlingTracker::new(),
            physics_clock: PhysicsClock::default(),
            scheduled: false,
            frame: 0,
            last_frame_ms: 0.0,
            next_session_id: 1,
            rng,
            events,
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // ACCESSORS
    // ═══════════════════════════════════════════════════════════════════════

    pub fn config(&self) -> &WheelConfig {
        &self.config
    }

    pub fn segments(&self) -> &SegmentList {
        &self.segments
    }

    pub fn render_state(&self) -> RenderState {
        RenderState {
            rotation: self.rotation.angle,
            pointer_deflection: self.pointer.deflection,
            spinning: self.session.is_some(),
        }
    }

    pub fn rotation(&self) -> f64 {
        self.rotation.angle
    }

    pub fn angular_velocity(&self) -> f64 {
        self.rotation.angular_velocity
    }

    pub fn pointer(&self) -> PointerState {
        self.pointer
    }

    pub fn session(&self) -> Option<&SpinSession> {
        self.session.as_ref()
    }

    pub fn is_spinning(&self) -> bool {
        self.session.is_some()
    }

    pub fn is_dragging(&self) -> bool {
        self.gesture.is_capturing()
    }

    /// The physics session is inside a reversal
    pub fn is_reversing(&self) -> bool {
        matches!(
            self.session.as_ref().map(|session| &session.motion),
            Some(SessionMotion::Physics(physics)) if physics.is_reversing()
        )
    }

    /// The host should call [`frame`](Self::frame) again
    pub fn needs_frame(&self) -> bool {
        self.scheduled
    }

    /// Frames run so far
    pub fn frame_count(&self) -> u64 {
        self.frame
    }

    pub fn events(&self) -> &E {
        &self.events
    }

    pub fn events_mut(&mut self) -> &mut E {
        &mut self.events
    }

    pub fn into_events(self) -> E {
        self.events
    }

    /// Reseed the engine RNG
    pub fn seed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }

    // ═══════════════════════════════════════════════════════════════════════
    // INPUTS
    // ═══════════════════════════════════════════════════════════════════════

    /// Replace the segment list. Refused while a spin is in flight.
    pub fn set_segments(&mut self, segments: SegmentList) -> WfResult<()> {
        if self.session.is_some() {
            return Err(WfError::SessionActive);
        }
        debug!("Segment list replaced: {} segments", segments.len());
        self.segments = segments;
        Ok(())
    }

    /// Start a physics spin with `initial_velocity` degrees per frame.
    ///
    /// Returns `false` without side effects while a spin is in flight, when
    /// the wheel has too few segments or when `initial_velocity` is not finite.
    pub fn spin(&mut self, initial_velocity: f64) -> bool {
        if !initial_velocity.is_finite() {
            debug!("spin rejected: non-finite velocity {initial_velocity}");
            return false;
        }
        if !self.can_start("spin") {
            return false;
        }
        self.rotation.angular_velocity = initial_velocity;
        let id = self.open_session(SessionMotion::Physics(PhysicsSession::new(initial_velocity)));
        debug!("Spin #{id} accepted: physics, v0={initial_velocity:.3}");
        true
    }

    /// Start a booster spin: draw the winner now, tween onto it.
    pub fn spin_deterministic(&mut self) -> bool {
        if !self.can_start("deterministic spin") {
            return false;
        }
        let count = self.segments.len();
        let winner = self.rng.random_range(0..count);
        let tween = BoosterTween::plan(self.rotation.angle, winner, count, &self.config.booster);
        let target = tween.target_angle();
        self.rotation.angular_velocity = 0.0;
        let id = self.open_session(SessionMotion::Booster(tween));
        debug!("Spin #{id} accepted: booster, winner={winner}, target={target:.2}");
        true
    }

    /// Button press: spin in the configured mode
    pub fn request_spin(&mut self) -> bool {
        match self.config.mode {
            SpinMode::Physics => {
                let button = &self.config.button;
                let velocity = self.rng.random_range(button.min_velocity..=button.max_velocity);
                self.spin(velocity)
            }
            SpinMode::Booster => self.spin_deterministic(),
        }
    }

    /// Close the active session without a winner
    pub fn cancel(&mut self) -> bool {
        let Some(session) = self.session.take() else {
            return false;
        };
        self.rotation.angular_velocity = 0.0;
        info!(
            "Spin #{} cancelled at rotation {:.2}",
            session.id, self.rotation.angle
        );
        let stamp = self.stamp();
        self.events.on_cancel(stamp);
        // Keep running until the needle settles.
        self.schedule();
        true
    }

    /// Pointer pressed at `angle` degrees around the wheel centre
    pub fn pointer_down(&mut self, angle: f64, now_ms: f64) -> bool {
        if self.session.is_some() {
            debug!("Pointer down ignored: spin in progress");
            return false;
        }
        self.gesture.begin(angle, now_ms);
        self.schedule();
        true
    }

    /// Pointer moved to `angle`; the wheel follows 1:1
    pub fn pointer_move(&mut self, angle: f64, now_ms: f64) -> bool {
        match self.gesture.track_angle(angle, now_ms, &self.config.gesture) {
            Some(delta) => {
                self.rotation.angle += delta;
                true
            }
            None => false,
        }
    }

    /// Rotate by a precomputed `delta` covering `dt_ms` of drag
    pub fn drag(&mut self, delta: f64, dt_ms: f64) -> bool {
        match self.gesture.track_delta(delta, dt_ms, &self.config.gesture) {
            Some(delta) => {
                self.rotation.angle += delta;
                true
            }
            None => false,
        }
    }

    /// Pointer released. Returns the fling velocity when it started a spin.
    pub fn pointer_up(&mut self, now_ms: f64) -> Option<f64> {
        let velocity = self.gesture.release(now_ms, &self.config.gesture);
        match velocity {
            Some(velocity) if self.spin(velocity) => Some(velocity),
            Some(velocity) => {
                debug!("Fling {velocity:.3} dropped: spin rejected");
                None
            }
            None => {
                trace!("Pointer up without fling");
                None
            }
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // FRAME LOOP
    // ═══════════════════════════════════════════════════════════════════════

    /// Advance one host frame at time `now_ms`
    pub fn frame(&mut self, now_ms: f64) -> FrameStatus {
        if !self.scheduled {
            return FrameStatus::Idle;
        }
        self.frame += 1;
        self.last_frame_ms = now_ms;
        let stamp = self.stamp();

        self.pointer.step(&self.config.pointer);

        let settled = match self.session.as_mut() {
            Some(session) => {
                let segment_angle = session.segment_angle;
                match &mut session.motion {
                    SessionMotion::Physics(physics) => {
                        let steps = self.physics_clock.steps(now_ms, &self.config.timing);
                        let mut winner = None;
                        for _ in 0..steps {
                            let step = physics.step(
                                &mut self.rotation,
                                segment_angle,
                                &self.config.physics,
                            );
                            if let Some(crossing) = step.crossing {
                                self.events.on_tick(stamp);
                                self.pointer.kick(crossing.direction, crossing.kick);
                            }
                            if step.settled {
                                winner = Some(winning_index(
                                    self.rotation.angle,
                                    session.segment_count,
                                ));
                                break;
                            }
                        }
                        winner
                    }
                    SessionMotion::Booster(tween) => {
                        let sample = tween.sample(now_ms, segment_angle);
                        self.rotation.angular_velocity = sample.angle - self.rotation.angle;
                        self.rotation.angle = sample.angle;
                        if sample.crossed {
                            self.events.on_tick(stamp);
                            let booster = &self.config.booster;
                            let kick = booster.kick_base
                                + self.rng.random::<f64>() * booster.kick_jitter;
                            self.pointer.kick(1.0, kick);
                        }
                        sample.finished.then(|| tween.winner())
                    }
                }
            }
            None => None,
        };

        if let Some(winner) = settled {
            self.finish(winner, stamp);
        }

        trace!(
            "frame {} rot={:.3} v={:.4} pd={:.3}",
            self.frame, self.rotation.angle, self.rotation.angular_velocity, self.pointer.deflection
        );

        if self.session.is_none()
            && !self.gesture.is_capturing()
            && self.pointer.is_at_rest(self.config.pointer.rest_threshold)
        {
            self.scheduled = false;
            return FrameStatus::Idle;
        }
        FrameStatus::Active
    }

    // ═══════════════════════════════════════════════════════════════════════
    // INTERNALS
    // ═══════════════════════════════════════════════════════════════════════

    fn can_start(&self, what: &str) -> bool {
        if let Some(session) = &self.session {
            debug!("{what} rejected: spin #{} in progress", session.id);
            return false;
        }
        let minimum = self.config.min_segments.max(2);
        if self.segments.len() < minimum {
            debug!(
                "{what} rejected: {} segments, need at least {minimum}",
                self.segments.len()
            );
            return false;
        }
        true
    }

    fn open_session(&mut self, motion: SessionMotion) -> u64 {
        // A spin ends any drag in progress.
        self.gesture.cancel();
        let id = self.next_session_id;
        self.next_session_id += 1;
        self.session = Some(SpinSession {
            id,
            segment_count: self.segments.len(),
            segment_angle: self.segments.segment_angle(),
            start_rotation: self.rotation.angle,
            started_frame: self.frame,
            motion,
        });
        self.physics_clock.reset();
        self.schedule();
        id
    }

    fn finish(&mut self, winner: usize, stamp: FrameStamp) {
        let Some(session) = self.session.take() else {
            return;
        };
        self.rotation.angular_velocity = 0.0;
        info!(
            "Spin #{} settled on segment {} ({:?}) after {} frames, rotation {:.2}",
            session.id,
            winner,
            self.segments.label(winner).unwrap_or("?"),
            self.frame - session.started_frame,
            self.rotation.angle
        );
        self.events.on_settle(winner, stamp);
    }

    fn schedule(&mut self) {
        if !self.scheduled {
            self.scheduled = true;
            self.physics_clock.reset();
        }
    }

    fn stamp(&self) -> FrameStamp {
        FrameStamp {
            frame: self.frame,
            timestamp_ms: self.last_frame_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventLog;

    fn engine(labels: &[&str]) -> SpinEngine<EventLog> {
        let config = WheelConfig::default().with_seed(42);
        let mut engine = SpinEngine::with_config(config, EventLog::new()).unwrap();
        engine
            .set_segments(SegmentList::new(labels.iter().copied()))
            .unwrap();
        engine
    }

    fn run(engine: &mut SpinEngine<EventLog>, max_frames: usize) -> usize {
        let mut now = 0.0;
        for frame in 0..max_frames {
            now += 16.67;
            if engine.frame(now) == FrameStatus::Idle {
                return frame;
            }
        }
        panic!("engine still active after {max_frames} frames");
    }

    #[test]
    fn test_idle_engine_requests_no_frames() {
        let mut engine = SpinEngine::new();
        assert!(!engine.needs_frame());
        assert_eq!(engine.frame(16.0), FrameStatus::Idle);
        assert_eq!(engine.frame_count(), 0);
    }

    #[test]
    fn test_spin_rejected_below_two_segments() {
        let mut engine = engine(&[]);
        assert!(!engine.spin(30.0));
        assert!(!engine.spin_deterministic());

        engine.set_segments(SegmentList::new(["only"])).unwrap();
        assert!(!engine.spin(30.0));
        assert!(!engine.request_spin());
        assert!(!engine.needs_frame());
    }

    #[test]
    fn test_spin_rejects_non_finite_velocity() {
        let mut engine = engine(&["a", "b", "c", "d", "e", "f"]);
        assert!(!engine.spin(f64::NAN));
        assert!(!engine.spin(f64::INFINITY));
        assert!(!engine.spin(f64::NEG_INFINITY));
        assert!(!engine.is_spinning());
        assert!(!engine.needs_frame());

        assert!(engine.spin(30.0));
        run(&mut engine, 200_000);
        assert_eq!(engine.events().settles(), 1);
    }

    #[test]
    fn test_physics_crossing_kicks_pointer() {
        let mut engine = engine(&["a", "b", "c", "d", "e", "f"]);
        let physics = engine.config().physics.clone();
        assert!(engine.spin(30.0));

        let mut now = 0.0;
        let mut kicks = 0;
        while engine.needs_frame() {
            let ticks = engine.events().ticks();
            now += 16.67;
            engine.frame(now);
            let v = engine.angular_velocity();
            if engine.events().ticks() == ticks || v == 0.0 {
                continue;
            }
            kicks += 1;
            // Peg drag was applied after the kick was sized.
            let expected = physics.kick_base + v.abs() / physics.peg_drag * physics.kick_gain;
            let pointer = engine.pointer();
            assert!(
                (pointer.velocity + v.signum() * expected).abs() < 1e-9,
                "needle velocity {} for wheel velocity {v}",
                pointer.velocity
            );
            // Deflection on the kicked side was reset.
            assert!(pointer.deflection * v.signum() <= 0.0);
        }
        assert!(kicks > 0);
    }

    #[test]
    fn test_booster_crossing_kicks_pointer_backward() {
        let config = WheelConfig::booster().with_seed(7);
        let mut engine = SpinEngine::with_config(config, EventLog::new()).unwrap();
        engine
            .set_segments(SegmentList::new(["a", "b", "c", "d", "e", "f", "g", "h"]))
            .unwrap();
        assert!(engine.spin_deterministic());

        let mut now = 0.0;
        let mut kicks = Vec::new();
        while engine.needs_frame() {
            let ticks = engine.events().ticks();
            now += 16.67;
            engine.frame(now);
            if engine.events().ticks() > ticks {
                let pointer = engine.pointer();
                kicks.push(pointer.velocity);
                assert!(pointer.deflection <= 0.0);
            }
        }
        assert!(!kicks.is_empty());
        for kick in kicks {
            assert!((-20.0..=-15.0).contains(&kick), "booster kick {kick}");
        }
    }

    #[test]
    fn test_physics_spin_settles_once() {
        let mut engine = engine(&["a", "b", "c", "d", "e", "f"]);
        assert!(engine.spin(30.0));
        assert!(!engine.spin(30.0));
        assert!(engine.is_spinning());
        assert_eq!(engine.session().map(|s| s.mode()), Some(SpinMode::Physics));

        run(&mut engine, 200_000);
        let log = engine.events();
        assert_eq!(log.settles(), 1);
        assert!(log.ticks() > 0);
        let winner = log.last_winner().unwrap();
        assert!(winner < 6);
        assert_eq!(winner, winning_index(engine.rotation(), 6));
        assert_eq!(engine.angular_velocity(), 0.0);
    }

    #[test]
    fn test_booster_lands_on_drawn_winner() {
        let mut engine = engine(&["a", "b", "c", "d", "e"]);
        assert!(engine.spin_deterministic());
        let drawn = engine.session().and_then(|s| s.winner()).unwrap();
        let target = engine.session().and_then(|s| s.target_rotation()).unwrap();

        run(&mut engine, 10_000);
        assert_eq!(engine.events().last_winner(), Some(drawn));
        assert_eq!(engine.rotation(), target);
        assert_eq!(winning_index(target, 5), drawn);
    }

    #[test]
    fn test_set_segments_refused_mid_spin() {
        let mut engine = engine(&["a", "b"]);
        engine.spin(20.0);
        let result = engine.set_segments(SegmentList::new(["x", "y", "z"]));
        assert!(matches!(result, Err(WfError::SessionActive)));
        assert_eq!(engine.session().unwrap().segment_count(), 2);

        run(&mut engine, 200_000);
        assert!(engine.set_segments(SegmentList::new(["x", "y", "z"])).is_ok());
    }

    #[test]
    fn test_cancel_fires_cancel_not_settle() {
        let mut engine = engine(&["a", "b", "c"]);
        assert!(!engine.cancel());
        engine.spin(35.0);
        engine.frame(16.67);
        assert!(engine.cancel());
        assert!(!engine.is_spinning());
        assert_eq!(engine.angular_velocity(), 0.0);

        run(&mut engine, 10_000);
        assert_eq!(engine.events().cancels(), 1);
        assert_eq!(engine.events().settles(), 0);
    }

    #[test]
    fn test_drag_moves_wheel_and_flings() {
        let mut engine = engine(&["a", "b", "c", "d"]);
        assert!(!engine.pointer_move(10.0, 5.0));
        assert!(engine.pointer_down(0.0, 0.0));
        assert!(engine.is_dragging());
        assert!(engine.pointer_move(10.0, 16.67));
        assert_eq!(engine.rotation(), 10.0);

        assert_eq!(engine.pointer_up(20.0), Some(10.0));
        assert!(engine.is_spinning());
        assert!(!engine.is_dragging());
        assert!(!engine.pointer_down(0.0, 30.0));
    }

    #[test]
    fn test_slow_release_is_a_tap() {
        let mut engine = engine(&["a", "b", "c", "d"]);
        engine.pointer_down(0.0, 0.0);
        engine.drag(0.5, 16.67);
        assert_eq!(engine.pointer_up(20.0), None);
        assert!(!engine.is_spinning());
    }

    #[test]
    fn test_request_spin_uses_button_range() {
        let mut engine = engine(&["a", "b", "c"]);
        assert!(engine.request_spin());
        let v = engine.angular_velocity();
        assert!((25.0..=40.0).contains(&v), "button velocity {v}");
    }
}
