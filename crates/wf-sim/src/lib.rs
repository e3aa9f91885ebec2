//! wf-sim: Batch spin simulator
//!
//! Runs thousands of headless spins in parallel to check that the winner
//! distribution is fair and to measure how long spins take to settle.
//!
//! ```rust,ignore
//! use wf_sim::{BatchSimulator, SimConfig};
//!
//! let report = BatchSimulator::new(SimConfig::default().with_seed(7))?.run()?;
//! assert!(report.passes_uniformity());
//! ```

mod config;
mod report;
mod simulator;

pub use config::*;
pub use report::*;
pub use simulator::*;
