//! wf-audio: Tick sound and haptics for the wheel
//!
//! The spin engine reports one tick per peg. This crate turns those ticks
//! into sound (a short triangle click, mixed into a track and exported as
//! WAV) and into a vibration schedule.

mod haptic;
mod tick;
mod wav;

pub use haptic::*;
pub use tick::*;
pub use wav::*;
