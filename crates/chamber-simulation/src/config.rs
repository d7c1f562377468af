//! Scenario configuration loaded from YAML.
//!
//! A scenario describes the chamber, the initial particles and how fast
//! simulated time runs relative to the clock:
//!
//! ```yaml
//! chamber:
//!   dimensions: [20.0, 20.0, 20.0]
//!   magnetic_field: [0.0, 0.0, 2.0]
//!   friction: 0.3
//! time_modifier: 0.5        # optional, defaults to 1.0
//! seed: 42                  # optional, entropy-seeded when absent
//! particles:
//!   - position: [-10.0, 0.0, 0.0]
//!     velocity: [5.0, 0.0, 0.0]
//!     charges: [5, 5, 5]    # positive, neutral, negative
//!     decays_after: 1.5     # optional, drawn from Exp(0.5) when absent
//! ```

use std::fs;
use std::path::Path;

use chamber_physics::{Chamber, Charges, Particle, DEFAULT_TIME_MODIFIER};
use glam::DVec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::clock::{Clock, WallClock};
use crate::error::Result;
use crate::simulation::Simulation;

/// Edge length of the built-in demo chamber
const DEMO_CHAMBER_SIZE: f64 = 20.0;

fn default_time_modifier() -> f64 {
    DEFAULT_TIME_MODIFIER
}

/// Chamber geometry and field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChamberConfig {
    pub dimensions: [f64; 3],
    pub magnetic_field: [f64; 3],
    pub friction: f64,
}

/// Initial state of one particle. Charges are signed here so that negative
/// counts in a file are reported instead of failing to parse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticleConfig {
    pub position: [f64; 3],
    pub velocity: [f64; 3],
    pub charges: [i64; 3],
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decays_after: Option<f64>,
}

/// Top-level scenario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioConfig {
    pub chamber: ChamberConfig,
    #[serde(default = "default_time_modifier")]
    pub time_modifier: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    pub particles: Vec<ParticleConfig>,
}

impl Default for ScenarioConfig {
    /// Four particles fired into a 20-unit chamber from its corners and faces
    fn default() -> Self {
        let half = DEMO_CHAMBER_SIZE / 2.0;
        Self {
            chamber: ChamberConfig {
                dimensions: [DEMO_CHAMBER_SIZE; 3],
                magnetic_field: [0.0, 0.0, 2.0],
                friction: 0.3,
            },
            time_modifier: 0.5,
            seed: None,
            particles: vec![
                ParticleConfig {
                    position: [-half, 0.0, 0.0],
                    velocity: [5.0, 0.0, 0.0],
                    charges: [5, 5, 5],
                    decays_after: None,
                },
                ParticleConfig {
                    position: [half, 0.0, half],
                    velocity: [-5.0, 2.0, -2.0],
                    charges: [2, 2, 2],
                    decays_after: None,
                },
                ParticleConfig {
                    position: [half, half, half],
                    velocity: [-5.0, -5.0, -5.0],
                    charges: [3, 3, 2],
                    decays_after: None,
                },
                ParticleConfig {
                    position: [-half, -half, -half],
                    velocity: [4.0, 4.0, 4.0],
                    charges: [3, 2, 4],
                    decays_after: None,
                },
            ],
        }
    }
}

impl ChamberConfig {
    pub fn build(&self) -> Result<Chamber> {
        Ok(Chamber::from_arrays(
            self.dimensions,
            self.magnetic_field,
            self.friction,
        )?)
    }
}

impl ParticleConfig {
    /// Build the particle, drawing a decay threshold from `rng` if none is
    /// configured.
    pub fn build<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Particle> {
        let [positive, neutral, negative] = self.charges;
        let charges = Charges::from_counts(positive, neutral, negative)?;
        let position = DVec3::from_array(self.position);
        let velocity = DVec3::from_array(self.velocity);
        let particle = match self.decays_after {
            Some(decays_after) => Particle::new(position, velocity, charges, decays_after)?,
            None => Particle::with_random_decay(position, velocity, charges, rng)?,
        };
        Ok(particle)
    }
}

impl ScenarioConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Ok(serde_yaml_ng::from_str(yaml)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        log::info!("Loading scenario from {}", path.display());
        let contents = fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    pub fn to_yaml_string(&self) -> Result<String> {
        Ok(serde_yaml_ng::to_string(self)?)
    }

    pub fn build_particles<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Vec<Particle>> {
        self.particles.iter().map(|p| p.build(&mut *rng)).collect()
    }

    /// Build a wall-clock simulation. Uses the configured seed, or entropy
    /// when there is none.
    pub fn build(&self) -> Result<Simulation> {
        let seed = self.seed.unwrap_or_else(|| rand::rng().random());
        self.build_with_sources(StdRng::seed_from_u64(seed), WallClock::new())
    }

    /// Build a simulation with injected sources. Initial decay thresholds
    /// that are not configured are drawn from `rng` before the simulation
    /// takes ownership of it.
    pub fn build_with_sources<R: Rng, C: Clock>(
        &self,
        mut rng: R,
        clock: C,
    ) -> Result<Simulation<R, C>> {
        let chamber = self.chamber.build()?;
        let particles = self.build_particles(&mut rng)?;
        Simulation::with_sources(chamber, particles, self.time_modifier, rng, clock)
    }
}
