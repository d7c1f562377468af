//! Particle types and properties for the bubble chamber simulation

use std::fmt;
use std::iter::Sum;
use std::ops::Add;

use glam::DVec3;
use rand::Rng;
use rand_distr::Exp1;

use crate::constants::{DECAY_RATE, STABLE_MASS};
use crate::error::{Error, Result};

/// A bag of elementary charge units: `(positive, neutral, negative)`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Charges {
    pub positive: u32,
    pub neutral: u32,
    pub negative: u32,
}

impl Charges {
    pub const ZERO: Self = Self::new(0, 0, 0);

    pub const fn new(positive: u32, neutral: u32, negative: u32) -> Self {
        Self {
            positive,
            neutral,
            negative,
        }
    }

    /// Build a charge triple from raw signed counts, rejecting negatives and
    /// triples whose mass does not fit in a `u32`.
    pub fn from_counts(positive: i64, neutral: i64, negative: i64) -> Result<Self> {
        let count = |name: &str, value: i64| {
            u32::try_from(value).map_err(|_| {
                Error::invalid(format!(
                    "{name} charge count must be a non-negative integer, got {value}"
                ))
            })
        };
        let charges = Self::new(
            count("positive", positive)?,
            count("neutral", neutral)?,
            count("negative", negative)?,
        );
        charges.validate()?;
        Ok(charges)
    }

    /// Total number of charge units, `None` on overflow
    pub const fn checked_mass(&self) -> Option<u32> {
        match self.positive.checked_add(self.neutral) {
            Some(sum) => sum.checked_add(self.negative),
            None => None,
        }
    }

    fn validate(&self) -> Result<()> {
        if self.checked_mass().is_none() {
            return Err(Error::invalid(format!(
                "total charge count of {self} exceeds {}",
                u32::MAX
            )));
        }
        Ok(())
    }

    /// Total number of charge units. Validated triples never overflow.
    pub const fn mass(&self) -> u32 {
        self.positive + self.neutral + self.negative
    }

    /// Net electric charge in elementary units
    pub const fn total_charge(&self) -> i64 {
        self.positive as i64 - self.negative as i64
    }

    pub const fn is_empty(&self) -> bool {
        self.mass() == 0
    }

    /// Component-wise subtraction, `None` if any count would go negative
    pub fn checked_sub(self, other: Self) -> Option<Self> {
        Some(Self {
            positive: self.positive.checked_sub(other.positive)?,
            neutral: self.neutral.checked_sub(other.neutral)?,
            negative: self.negative.checked_sub(other.negative)?,
        })
    }

    pub const fn to_array(self) -> [u32; 3] {
        [self.positive, self.neutral, self.negative]
    }

    pub const fn from_array(counts: [u32; 3]) -> Self {
        Self::new(counts[0], counts[1], counts[2])
    }
}

impl Add for Charges {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            positive: self.positive + other.positive,
            neutral: self.neutral + other.neutral,
            negative: self.negative + other.negative,
        }
    }
}

impl Sum for Charges {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Charges> for Charges {
    fn sum<I: Iterator<Item = &'a Self>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

impl fmt::Display for Charges {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.positive, self.neutral, self.negative)
    }
}

/// Draw a decay threshold from the exponential distribution with rate
/// [`DECAY_RATE`].
pub fn sample_decay_threshold<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    let unit: f64 = rng.sample(Exp1);
    unit / DECAY_RATE
}

/// A charged particle moving through the chamber.
///
/// Kinematics are public and mutated by the simulation every step. Charges,
/// age and lifecycle flags are only changed through methods so a dead
/// particle can never come back to life.
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    /// Position in 3D space
    pub position: DVec3,
    /// Velocity vector
    pub velocity: DVec3,

    charges: Charges,
    lifetime: f64,
    decays_after: f64,
    alive: bool,
    dirty: bool,
}

impl Particle {
    /// Create a particle with an explicit decay threshold.
    pub fn new(
        position: DVec3,
        velocity: DVec3,
        charges: Charges,
        decays_after: f64,
    ) -> Result<Self> {
        charges.validate()?;
        if !position.is_finite() {
            return Err(Error::invalid(format!("position must be finite, got {position}")));
        }
        if !velocity.is_finite() {
            return Err(Error::invalid(format!("velocity must be finite, got {velocity}")));
        }
        if !decays_after.is_finite() || decays_after < 0.0 {
            return Err(Error::invalid(format!(
                "decay threshold must be finite and >= 0, got {decays_after}"
            )));
        }
        Ok(Self {
            position,
            velocity,
            charges,
            lifetime: 0.0,
            decays_after,
            alive: true,
            dirty: true,
        })
    }

    /// Create a particle whose decay threshold is drawn from `rng`
    pub fn with_random_decay<R: Rng + ?Sized>(
        position: DVec3,
        velocity: DVec3,
        charges: Charges,
        rng: &mut R,
    ) -> Result<Self> {
        Self::new(position, velocity, charges, sample_decay_threshold(rng))
    }

    /// Create a decay fragment of `parent` carrying `charges`.
    ///
    /// The fragment inherits the parent's position and velocity, starts with
    /// zero lifetime and draws a fresh decay threshold.
    pub fn fragment_of<R: Rng + ?Sized>(parent: &Particle, charges: Charges, rng: &mut R) -> Self {
        Self {
            position: parent.position,
            velocity: parent.velocity,
            charges,
            lifetime: 0.0,
            decays_after: sample_decay_threshold(rng),
            alive: true,
            dirty: true,
        }
    }

    pub fn charges(&self) -> Charges {
        self.charges
    }

    /// Inertial weight: total number of charge units
    pub fn mass(&self) -> u32 {
        self.charges.mass()
    }

    /// Net charge: positive minus negative units
    pub fn total_charge(&self) -> i64 {
        self.charges.total_charge()
    }

    /// A stable particle dies without splitting
    pub fn is_stable(&self) -> bool {
        self.mass() <= STABLE_MASS
    }

    pub fn lifetime(&self) -> f64 {
        self.lifetime
    }

    pub fn decays_after(&self) -> f64 {
        self.decays_after
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    /// True until a consumer acknowledges the particle's terminal state
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Add `delta` to the particle's age. Returns true once the decay
    /// threshold has been reached.
    pub fn age(&mut self, delta: f64) -> bool {
        self.lifetime += delta;
        self.lifetime >= self.decays_after
    }

    /// Mark the particle dead. Death is permanent.
    pub fn kill(&mut self) {
        self.alive = false;
    }

    /// Clear the dirty flag after a consumer has handled the particle's death.
    ///
    /// Returns true if the flag was cleared by this call. Living particles
    /// cannot be acknowledged.
    pub fn acknowledge(&mut self) -> bool {
        if self.alive || !self.dirty {
            return false;
        }
        self.dirty = false;
        true
    }
}

impl fmt::Display for Particle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Particle {{ charges: {}, position: {:.3}, lifetime: {:.3}/{:.3} }}",
            self.charges, self.position, self.lifetime, self.decays_after
        )
    }
}
