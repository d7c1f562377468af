//! Time sources driving `Simulation::step`

use std::time::Instant;

use crate::error::{Result, SimulationError};

/// A monotonic source of time in seconds.
///
/// Only differences between samples matter; the origin is arbitrary.
pub trait Clock {
    fn now(&mut self) -> f64;
}

impl<C: Clock + ?Sized> Clock for Box<C> {
    fn now(&mut self) -> f64 {
        (**self).now()
    }
}

/// Samples the system's monotonic clock
#[derive(Debug, Clone, Copy)]
pub struct WallClock {
    origin: Instant,
}

impl WallClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for WallClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for WallClock {
    fn now(&mut self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }
}

/// Deterministic clock that moves forward by exactly `dt` every sample.
///
/// The first sample is `0.0`, so `start()` followed by `step()` yields a
/// delta of `dt` (before the time modifier is applied).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedStepClock {
    dt: f64,
    ticks: u64,
}

impl FixedStepClock {
    /// `dt` must be finite and >= 0, so every delta the clock produces is
    /// valid for `Simulation::advance`.
    pub fn new(dt: f64) -> Result<Self> {
        if !dt.is_finite() || dt < 0.0 {
            return Err(SimulationError::invalid(format!(
                "fixed step must be finite and >= 0, got {dt}"
            )));
        }
        Ok(Self { dt, ticks: 0 })
    }

    pub fn dt(&self) -> f64 {
        self.dt
    }
}

impl Clock for FixedStepClock {
    fn now(&mut self) -> f64 {
        let t = self.ticks as f64 * self.dt;
        self.ticks += 1;
        t
    }
}
