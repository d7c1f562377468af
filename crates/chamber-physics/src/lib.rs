//! # Chamber Physics
//!
//! Data model for the bubble chamber simulation: the chamber itself, charged
//! particles built from elementary charge units, and the forces acting on
//! them.

pub mod chamber;
pub mod constants;
pub mod error;
pub mod forces;
pub mod particle;

pub use chamber::*;
pub use constants::*;
pub use error::{Error, Result};
pub use forces::*;
pub use particle::*;
