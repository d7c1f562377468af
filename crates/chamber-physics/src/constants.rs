//! Physical constants for the bubble chamber simulation
//!
//! Simulation units throughout: one mass unit per elementary charge unit,
//! one time unit per second of (modified) wall-clock time.

/// Rate of the exponential distribution decay thresholds are drawn from.
/// The mean lifetime of a particle is `1.0 / DECAY_RATE` time units.
pub const DECAY_RATE: f64 = 0.5;

/// Particles at or below this mass never split when they decay
pub const STABLE_MASS: u32 = 1;

/// Consecutive rejected fraction draws tolerated while splitting before a
/// single unit is peeled off deterministically.
pub const MAX_SPLIT_ATTEMPTS: u32 = 64;

/// Default multiplier between sampled clock time and simulated time
pub const DEFAULT_TIME_MODIFIER: f64 = 1.0;
