//! Engine output events
//!
//! The engine reports peg ticks, settles and cancellations through the
//! [`SpinEvents`] trait. Hosts implement it directly, pass a closure-backed
//! [`CallbackEvents`], or record everything with an [`EventLog`].

use serde::{Deserialize, Serialize};

/// Frame the event happened on
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameStamp {
    /// Engine frame counter (1-based once frames run)
    pub frame: u64,
    /// Host time passed to the frame
    pub timestamp_ms: f64,
}

/// Sink for engine output
pub trait SpinEvents {
    /// A peg passed the pointer
    fn on_tick(&mut self, _at: FrameStamp) {}

    /// The spin came to rest on `winner`. Fires exactly once per accepted spin
    /// unless the spin is cancelled.
    fn on_settle(&mut self, winner: usize, at: FrameStamp);

    /// The spin was cancelled before settling
    fn on_cancel(&mut self, _at: FrameStamp) {}
}

impl<E: SpinEvents + ?Sized> SpinEvents for &mut E {
    fn on_tick(&mut self, at: FrameStamp) {
        (**self).on_tick(at)
    }

    fn on_settle(&mut self, winner: usize, at: FrameStamp) {
        (**self).on_settle(winner, at)
    }

    fn on_cancel(&mut self, at: FrameStamp) {
        (**self).on_cancel(at)
    }
}

impl<E: SpinEvents + ?Sized> SpinEvents for Box<E> {
    fn on_tick(&mut self, at: FrameStamp) {
        (**self).on_tick(at)
    }

    fn on_settle(&mut self, winner: usize, at: FrameStamp) {
        (**self).on_settle(winner, at)
    }

    fn on_cancel(&mut self, at: FrameStamp) {
        (**self).on_cancel(at)
    }
}

/// Discards every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NullEvents;

impl SpinEvents for NullEvents {
    fn on_settle(&mut self, _winner: usize, _at: FrameStamp) {}
}

/// Closure-backed sink: `on_settle` is required, ticks are optional
pub struct CallbackEvents<S, T = fn(FrameStamp)>
where
    S: FnMut(usize, FrameStamp),
    T: FnMut(FrameStamp),
{
    settle: S,
    tick: Option<T>,
}

impl<S> CallbackEvents<S>
where
    S: FnMut(usize, FrameStamp),
{
    pub fn settle_only(settle: S) -> Self {
        Self { settle, tick: None }
    }
}

impl<S, T> CallbackEvents<S, T>
where
    S: FnMut(usize, FrameStamp),
    T: FnMut(FrameStamp),
{
    pub fn with_tick(settle: S, tick: T) -> Self {
        Self {
            settle,
            tick: Some(tick),
        }
    }
}

impl<S, T> SpinEvents for CallbackEvents<S, T>
where
    S: FnMut(usize, FrameStamp),
    T: FnMut(FrameStamp),
{
    fn on_tick(&mut self, at: FrameStamp) {
        if let Some(tick) = self.tick.as_mut() {
            tick(at);
        }
    }

    fn on_settle(&mut self, winner: usize, at: FrameStamp) {
        (self.settle)(winner, at);
    }
}

/// Recorded engine event
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WheelEvent {
    pub at: FrameStamp,
    pub kind: WheelEventKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WheelEventKind {
    Tick,
    Settled { winner: usize },
    Cancelled,
}

/// Records every event in order
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventLog {
    events: Vec<WheelEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[WheelEvent] {
        &self.events
    }

    pub fn ticks(&self) -> usize {
        self.count(|kind| matches!(kind, WheelEventKind::Tick))
    }

    pub fn settles(&self) -> usize {
        self.count(|kind| matches!(kind, WheelEventKind::Settled { .. }))
    }

    pub fn cancels(&self) -> usize {
        self.count(|kind| matches!(kind, WheelEventKind::Cancelled))
    }

    /// Winner of the most recent settle
    pub fn last_winner(&self) -> Option<usize> {
        self.events.iter().rev().find_map(|event| match event.kind {
            WheelEventKind::Settled { winner } => Some(winner),
            _ => None,
        })
    }

    /// Host times of all ticks, for audio rendering
    pub fn tick_times_ms(&self) -> Vec<f64> {
        self.events
            .iter()
            .filter(|event| event.kind == WheelEventKind::Tick)
            .map(|event| event.at.timestamp_ms)
            .collect()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    fn count(&self, predicate: impl Fn(&WheelEventKind) -> bool) -> usize {
        self.events.iter().filter(|event| predicate(&event.kind)).count()
    }

    fn push(&mut self, at: FrameStamp, kind: WheelEventKind) {
        self.events.push(WheelEvent { at, kind });
    }
}

impl SpinEvents for EventLog {
    fn on_tick(&mut self, at: FrameStamp) {
        self.push(at, WheelEventKind::Tick);
    }

    fn on_settle(&mut self, winner: usize, at: FrameStamp) {
        self.push(at, WheelEventKind::Settled { winner });
    }

    fn on_cancel(&mut self, at: FrameStamp) {
        self.push(at, WheelEventKind::Cancelled);
    }
}
