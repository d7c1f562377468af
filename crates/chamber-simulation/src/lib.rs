//! # Chamber Simulation Engine
//!
//! CPU simulation of charged particles curling through a magnetic field,
//! slowing under friction and decaying into smaller fragments.

pub mod clock;
pub mod config;
pub mod decay;
pub mod error;
pub mod simulation;

pub use clock::*;
pub use config::*;
pub use decay::*;
pub use error::{Result, SimulationError};
pub use simulation::*;
