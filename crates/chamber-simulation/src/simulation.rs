//! CPU particle simulation manager
//!
//! A host drives the simulation by calling [`Simulation::start`] once and then
//! [`Simulation::step`] once per frame. Between steps it may read particle
//! state and acknowledge deaths; `step` borrows the simulation mutably, so
//! nothing can observe a half-finished step.

use chamber_physics::{friction_factor, magnetic_acceleration, Chamber, Particle};
use glam::DVec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::clock::{Clock, WallClock};
use crate::decay::split_charges;
use crate::error::{Result, SimulationError};

/// Read-only view of one particle, for consumers that render or inspect the
/// simulation once per frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleView {
    /// Stable index into the particle collection
    pub index: usize,
    pub position: DVec3,
    pub is_alive: bool,
    pub is_dirty: bool,
    pub total_charge: i64,
    pub mass: u32,
}

/// Charged particles moving and decaying inside a chamber
pub struct Simulation<R = StdRng, C = WallClock> {
    chamber: Chamber,
    particles: Vec<Particle>,
    // Fragments produced during the current step; merged once it completes
    pending_spawns: Vec<Particle>,

    clock: C,
    clock_ref: Option<f64>,
    time_passed: f64,
    time_modifier: f64,

    rng: R,
}

impl Simulation {
    /// Create a simulation driven by the wall clock with an entropy-seeded
    /// random source.
    pub fn new(chamber: Chamber, particles: Vec<Particle>, time_modifier: f64) -> Result<Self> {
        let seed = rand::rng().random();
        Self::seeded(chamber, particles, time_modifier, seed)
    }

    /// Create a simulation driven by the wall clock with a seeded random
    /// source. Decay thresholds and split ratios are reproducible; deltas are
    /// not.
    pub fn seeded(
        chamber: Chamber,
        particles: Vec<Particle>,
        time_modifier: f64,
        seed: u64,
    ) -> Result<Self> {
        Self::with_sources(
            chamber,
            particles,
            time_modifier,
            StdRng::seed_from_u64(seed),
            WallClock::new(),
        )
    }
}

impl<R: Rng, C: Clock> Simulation<R, C> {
    /// Create a simulation with an injected random source and clock.
    ///
    /// `time_modifier` must be finite and > 0.
    pub fn with_sources(
        chamber: Chamber,
        particles: Vec<Particle>,
        time_modifier: f64,
        rng: R,
        clock: C,
    ) -> Result<Self> {
        if !time_modifier.is_finite() || time_modifier <= 0.0 {
            return Err(SimulationError::invalid(format!(
                "time modifier must be finite and > 0, got {time_modifier}"
            )));
        }

        log::info!(
            "Initializing Simulation with {} particles (chamber size {}, field {}, friction {})",
            particles.len(),
            chamber.size(),
            chamber.magnetic_field(),
            chamber.friction()
        );

        Ok(Self {
            chamber,
            particles,
            pending_spawns: Vec::new(),
            clock,
            clock_ref: None,
            time_passed: 0.0,
            time_modifier,
            rng,
        })
    }

    /// Reset the clock reference to now. Must be called before the first
    /// [`step`](Self::step); calling it again restarts the reference.
    pub fn start(&mut self) {
        self.clock_ref = Some(self.clock.now());
        log::debug!("Simulation clock started");
    }

    /// Advance the simulation by the clock time elapsed since the previous
    /// step (or `start`), scaled by the time modifier.
    pub fn step(&mut self) -> Result<()> {
        let last = self.clock_ref.ok_or(SimulationError::PrecedingStart)?;
        let now = self.clock.now();
        self.clock_ref = Some(now);
        self.advance((now - last) * self.time_modifier)
    }

    /// Advance the simulation by an explicit amount of simulated time.
    ///
    /// Every particle alive at the start of the step is updated with the same
    /// `delta`. Fragments from decays are appended afterwards and only start
    /// moving on the next step.
    pub fn advance(&mut self, delta: f64) -> Result<()> {
        if !delta.is_finite() || delta < 0.0 {
            return Err(SimulationError::InvalidTimeDelta(delta));
        }
        self.time_passed += delta;

        let Self {
            chamber,
            particles,
            pending_spawns,
            rng,
            ..
        } = self;
        for particle in particles.iter_mut().filter(|p| p.is_alive()) {
            update_particle(chamber, particle, delta, pending_spawns, rng);
        }

        if !pending_spawns.is_empty() {
            log::trace!("Spawning {} fragments", pending_spawns.len());
            particles.append(pending_spawns);
        }
        Ok(())
    }

    /// Split `particle` into fragments, queued until the end of the current
    /// step. Stable particles (mass <= 1) produce nothing.
    ///
    /// Returns the number of fragments queued. The parent's own charges are
    /// left untouched rather than zeroed: conservation holds across the
    /// fragments, whose per-type counts always sum to the parent's.
    pub fn split_particle(&mut self, particle: &Particle) -> usize {
        spawn_fragments(particle, &mut self.pending_spawns, &mut self.rng)
    }

    pub fn chamber(&self) -> &Chamber {
        &self.chamber
    }

    /// Every particle, including dead ones awaiting acknowledgement
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Fragments queued by [`split_particle`](Self::split_particle) that have
    /// not been merged into the collection yet
    pub fn pending_spawns(&self) -> &[Particle] {
        &self.pending_spawns
    }

    /// Total simulated time
    pub fn time_passed(&self) -> f64 {
        self.time_passed
    }

    pub fn time_modifier(&self) -> f64 {
        self.time_modifier
    }

    pub fn is_started(&self) -> bool {
        self.clock_ref.is_some()
    }

    pub fn alive_count(&self) -> usize {
        self.particles.iter().filter(|p| p.is_alive()).count()
    }

    pub fn any_alive(&self) -> bool {
        self.particles.iter().any(Particle::is_alive)
    }

    /// Snapshot of the state a consumer needs each frame
    pub fn snapshot(&self) -> Vec<ParticleView> {
        self.particles
            .iter()
            .enumerate()
            .map(|(index, p)| ParticleView {
                index,
                position: p.position,
                is_alive: p.is_alive(),
                is_dirty: p.is_dirty(),
                total_charge: p.total_charge(),
                mass: p.mass(),
            })
            .collect()
    }

    /// Indices of dead particles whose death has not been acknowledged yet
    pub fn unacknowledged_deaths(&self) -> Vec<usize> {
        self.particles
            .iter()
            .enumerate()
            .filter(|(_, p)| !p.is_alive() && p.is_dirty())
            .map(|(i, _)| i)
            .collect()
    }

    /// Record that the consumer has handled the death of particle `index`.
    ///
    /// Returns false if the index is out of range, the particle is still
    /// alive, or it was already acknowledged. The simulation itself never
    /// looks at this flag.
    pub fn acknowledge(&mut self, index: usize) -> bool {
        self.particles
            .get_mut(index)
            .is_some_and(Particle::acknowledge)
    }
}

fn update_particle<R: Rng + ?Sized>(
    chamber: &Chamber,
    particle: &mut Particle,
    delta: f64,
    pending_spawns: &mut Vec<Particle>,
    rng: &mut R,
) {
    if particle.age(delta) {
        particle.kill();
        log::debug!("{particle} decayed");

        if !particle.is_stable() {
            spawn_fragments(particle, pending_spawns, rng);
        }
        return;
    }

    let acceleration = magnetic_acceleration(particle, chamber);
    particle.velocity += acceleration * delta;
    particle.velocity *= friction_factor(chamber.friction(), delta);
    particle.position += particle.velocity * delta;
}

fn spawn_fragments<R: Rng + ?Sized>(
    parent: &Particle,
    pending_spawns: &mut Vec<Particle>,
    rng: &mut R,
) -> usize {
    let fragments = split_charges(parent.charges(), rng);
    if fragments.is_empty() {
        return 0;
    }

    log::debug!(
        "{} split into {:?}",
        parent.charges(),
        fragments.iter().map(|c| c.to_array()).collect::<Vec<_>>()
    );
    let count = fragments.len();
    pending_spawns.extend(
        fragments
            .into_iter()
            .map(|charges| Particle::fragment_of(parent, charges, rng)),
    );
    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedStepClock;
    use chamber_physics::Charges;

    fn chamber() -> Chamber {
        Chamber::from_arrays([10.0, 10.0, 10.0], [0.0, 0.0, 2.0], 0.3).unwrap()
    }

    fn particle(charges: Charges, decays_after: f64) -> Particle {
        Particle::new(DVec3::ZERO, DVec3::new(1.0, 0.0, 0.0), charges, decays_after).unwrap()
    }

    fn fixed_sim(
        chamber: Chamber,
        particles: Vec<Particle>,
        dt: f64,
    ) -> Simulation<StdRng, FixedStepClock> {
        Simulation::with_sources(
            chamber,
            particles,
            1.0,
            StdRng::seed_from_u64(11),
            FixedStepClock::new(dt).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn test_step_before_start_fails() {
        let mut sim = fixed_sim(chamber(), vec![], 1.0);
        assert!(matches!(sim.step(), Err(SimulationError::PrecedingStart)));
        sim.start();
        assert!(sim.step().is_ok());
    }

    #[test]
    fn test_rejects_bad_time_modifier() {
        for modifier in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let result = Simulation::new(chamber(), vec![], modifier);
            assert!(matches!(result, Err(SimulationError::InvalidConfiguration(_))));
        }
    }

    #[test]
    fn test_rejects_bad_delta() {
        let mut sim = fixed_sim(chamber(), vec![], 1.0);
        assert!(matches!(sim.advance(-0.1), Err(SimulationError::InvalidTimeDelta(_))));
        assert!(matches!(sim.advance(f64::NAN), Err(SimulationError::InvalidTimeDelta(_))));
        assert_eq!(sim.time_passed(), 0.0);
    }

    #[test]
    fn test_time_modifier_scales_delta() {
        let mut sim = Simulation::with_sources(
            chamber(),
            vec![],
            0.5,
            StdRng::seed_from_u64(0),
            FixedStepClock::new(1.0).unwrap(),
        )
        .unwrap();
        sim.start();
        sim.step().unwrap();
        sim.step().unwrap();
        assert_eq!(sim.time_passed(), 1.0);
    }

    #[test]
    fn test_split_particle_mass_one_is_noop() {
        let mut sim = fixed_sim(chamber(), vec![], 1.0);
        let p = particle(Charges::new(1, 0, 0), 1.0);
        assert_eq!(sim.split_particle(&p), 0);
        assert!(sim.pending_spawns().is_empty());
    }

    #[test]
    fn test_split_particle_mass_two_splits_in_two() {
        let mut sim = fixed_sim(chamber(), vec![], 1.0);
        let p = particle(Charges::new(1, 1, 0), 1.0);
        assert_eq!(sim.split_particle(&p), 2);

        let spawned = sim.pending_spawns();
        assert_eq!(spawned.len(), 2);
        for frag in spawned {
            assert_eq!(frag.position, p.position);
            assert_eq!(frag.velocity, p.velocity);
            assert_eq!(frag.lifetime(), 0.0);
        }
        let total: Charges = spawned.iter().map(Particle::charges).sum();
        assert_eq!(total, Charges::new(1, 1, 0));
        // Parent keeps its charges
        assert_eq!(p.charges(), Charges::new(1, 1, 0));
    }

    #[test]
    fn test_magnetic_field_bends_without_changing_speed() {
        let frictionless = Chamber::from_arrays([10.0; 3], [0.0, 0.0, 2.0], 0.0).unwrap();
        let mut sim = fixed_sim(frictionless, vec![particle(Charges::new(1, 0, 0), 1e9)], 0.001);
        sim.start();
        for _ in 0..10 {
            sim.step().unwrap();
        }
        let p = &sim.particles()[0];
        // Positive charge moving along +x in +z field curls towards -y
        assert!(p.velocity.y < 0.0);
        assert_eq!(p.velocity.z, 0.0);
        // Explicit Euler only gains a little energy over a short run
        assert!((p.velocity.length() - 1.0).abs() < 1e-3);
    }

    #[test]
    fn test_friction_slows_particles() {
        let no_field = Chamber::from_arrays([10.0; 3], [0.0; 3], 0.3).unwrap();
        let mut sim = fixed_sim(no_field, vec![particle(Charges::new(1, 0, 0), 1e9)], 0.5);
        sim.start();
        sim.step().unwrap();
        let p = &sim.particles()[0];
        assert!((p.velocity.x - 0.85).abs() < 1e-12);
        assert!((p.position.x - 0.425).abs() < 1e-12);
    }

    #[test]
    fn test_neutral_and_empty_particles_drift_straight() {
        let mut sim = fixed_sim(
            Chamber::from_arrays([10.0; 3], [0.0, 0.0, 5.0], 0.0).unwrap(),
            vec![
                particle(Charges::new(1, 3, 1), 1e9),
                particle(Charges::ZERO, 1e9),
            ],
            1.0,
        );
        sim.start();
        sim.step().unwrap();
        for p in sim.particles() {
            assert_eq!(p.velocity, DVec3::X);
            assert_eq!(p.position, DVec3::X);
        }
    }

    #[test]
    fn test_acknowledge() {
        let mut sim = fixed_sim(chamber(), vec![particle(Charges::new(0, 1, 0), 0.5)], 1.0);
        assert!(!sim.acknowledge(0)); // alive
        assert!(!sim.acknowledge(7)); // out of range

        sim.start();
        sim.step().unwrap();
        assert_eq!(sim.unacknowledged_deaths(), vec![0]);
        assert!(sim.acknowledge(0));
        assert!(!sim.acknowledge(0));
        assert!(sim.unacknowledged_deaths().is_empty());
    }

    #[test]
    fn test_snapshot() {
        let sim = fixed_sim(chamber(), vec![particle(Charges::new(5, 0, 1), 1.0)], 1.0);
        let views = sim.snapshot();
        assert_eq!(views.len(), 1);
        assert_eq!(views[0].index, 0);
        assert_eq!(views[0].total_charge, 4);
        assert_eq!(views[0].mass, 6);
        assert!(views[0].is_alive && views[0].is_dirty);
    }
}
