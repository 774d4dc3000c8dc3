//! Event-driven simulation of Brownian motion: one heavy tracked disk among
//! many light ones, bouncing elastically inside a square box.
//!
//! ```no_run
//! use brownsim::config::RunParameters;
//!
//! # fn main() -> brownsim::error::Result<()> {
//! let mut params = RunParameters::default();
//! params.system.seed = Some(42);
//! let mut engine = params.build_engine()?;
//! engine.initialize()?;
//! engine.simulate(params.simulation.duration)?;
//! println!("{} collisions", engine.processed_events().len());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod core;
pub mod error;
pub mod io;
pub mod provider;

#[cfg(feature = "python")]
mod python;

pub use crate::core::{BrownSystem, SimulationEngine};
