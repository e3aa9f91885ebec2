//! wf-wheel: Wheel of fortune spin engine
//!
//! Headless simulation of a spinning prize wheel with a springy pointer:
//!
//! - **Physics spins** - friction, detent pull and peg drag until the wheel
//!   comes to rest wherever it stops
//! - **Booster spins** - winner drawn up front, fixed-length eased tween
//! - **Fling gesture** - drag the wheel and release to spin it
//! - **Events** - one tick per peg, exactly one settle per accepted spin
//!
//! ## Usage
//!
//! ```rust,ignore
//! use wf_wheel::{EventLog, FrameDriver, SegmentList, SpinEngine, WheelConfig};
//!
//! let mut engine = SpinEngine::with_config(WheelConfig::default(), EventLog::new())?;
//! engine.set_segments(SegmentList::new(["Alice", "Bob", "Carol"]))?;
//! engine.spin(30.0);
//!
//! let mut driver = FrameDriver::new(&engine.config().timing);
//! driver.run_until_idle(&mut engine);
//! println!("winner: {:?}", engine.events().last_winner());
//! ```

pub mod booster;
pub mod config;
pub mod driver;
pub mod easing;
pub mod engine;
pub mod events;
pub mod gesture;
pub mod layout;
pub mod physics;
pub mod pointer;
pub mod segments;
pub mod timing;

pub use booster::*;
pub use config::*;
pub use driver::*;
pub use easing::*;
pub use engine::*;
pub use events::*;
pub use gesture::*;
pub use layout::*;
pub use physics::*;
pub use pointer::*;
pub use segments::*;
pub use timing::*;

pub use wf_core::{SpinMode, WfError, WfResult};
