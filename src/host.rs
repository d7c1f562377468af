//! Headless consumer of the simulation
//!
//! Plays the part a renderer would: once per frame it reads every particle,
//! handles each fresh death exactly once and acknowledges it.

use std::collections::VecDeque;
use std::time::Instant;

use chamber_simulation::{Clock, Simulation};
use rand::Rng;

/// Frame loop settings
#[derive(Debug, Clone, Copy)]
pub struct HostOptions {
    /// Stop after this many frames even if particles are still alive
    pub max_steps: u64,
    /// Log a frame summary every N frames (0 disables)
    pub log_every: u64,
}

/// What happened over a whole run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunSummary {
    pub frames: u64,
    pub time_passed: f64,
    pub particles: usize,
    pub deaths: usize,
    pub still_alive: usize,
}

pub struct Host {
    options: HostOptions,
    frame_times: VecDeque<f64>,
    frame_counter: u64,
    deaths: usize,
}

impl Host {
    pub fn new(options: HostOptions) -> Self {
        Self {
            options,
            frame_times: VecDeque::with_capacity(100),
            frame_counter: 0,
            deaths: 0,
        }
    }

    /// Drive `sim` until every particle has died or the frame cap is hit.
    pub fn run<R: Rng, C: Clock>(
        &mut self,
        sim: &mut Simulation<R, C>,
    ) -> chamber_simulation::Result<RunSummary> {
        sim.start();
        while sim.any_alive() && self.frame_counter < self.options.max_steps {
            let frame_start = Instant::now();
            sim.step()?;
            self.frame_counter += 1;
            self.observe(sim);
            self.record_frame_time(frame_start.elapsed().as_secs_f64());
        }

        if sim.any_alive() {
            log::warn!(
                "Stopped after {} frames with {} particles still alive",
                self.frame_counter,
                sim.alive_count()
            );
        }

        Ok(RunSummary {
            frames: self.frame_counter,
            time_passed: sim.time_passed(),
            particles: sim.particles().len(),
            deaths: self.deaths,
            still_alive: sim.alive_count(),
        })
    }

    fn observe<R: Rng, C: Clock>(&mut self, sim: &mut Simulation<R, C>) {
        for view in sim.snapshot().iter().filter(|v| v.is_alive) {
            log::trace!(
                "frame {} particle {} at {:.3} (charge {}, mass {})",
                self.frame_counter,
                view.index,
                view.position,
                view.total_charge,
                view.mass
            );
        }

        for index in sim.unacknowledged_deaths() {
            if let Some(p) = sim.particles().get(index) {
                log::debug!(
                    "frame {}: particle {} died at {:.3} after {:.3} (charges {})",
                    self.frame_counter,
                    index,
                    p.position,
                    p.lifetime(),
                    p.charges()
                );
            }
            if sim.acknowledge(index) {
                self.deaths += 1;
            }
        }

        let every = self.options.log_every;
        if every > 0 && self.frame_counter % every == 0 {
            log::info!(
                "frame {}: t = {:.3}, {} alive / {} total, avg step {:.1}µs",
                self.frame_counter,
                sim.time_passed(),
                sim.alive_count(),
                sim.particles().len(),
                self.average_frame_time() * 1e6
            );
        }
    }

    fn record_frame_time(&mut self, seconds: f64) {
        self.frame_times.push_back(seconds);
        if self.frame_times.len() > 100 {
            self.frame_times.pop_front();
        }
    }

    fn average_frame_time(&self) -> f64 {
        if self.frame_times.is_empty() {
            return 0.0;
        }
        self.frame_times.iter().sum::<f64>() / self.frame_times.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chamber_simulation::{FixedStepClock, ScenarioConfig};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_run_until_everything_decays() {
        let mut sim = ScenarioConfig::default()
            .build_with_sources(StdRng::seed_from_u64(3), FixedStepClock::new(0.05).unwrap())
            .unwrap();
        let mut host = Host::new(HostOptions {
            max_steps: 1_000_000,
            log_every: 0,
        });

        let summary = host.run(&mut sim).unwrap();
        assert_eq!(summary.still_alive, 0);
        assert_eq!(summary.deaths, summary.particles);
        assert!(summary.frames > 0);
        assert!(sim.unacknowledged_deaths().is_empty());
    }

    #[test]
    fn test_frame_cap() {
        let mut sim = ScenarioConfig::default()
            .build_with_sources(StdRng::seed_from_u64(3), FixedStepClock::new(1e-6).unwrap())
            .unwrap();
        let mut host = Host::new(HostOptions {
            max_steps: 10,
            log_every: 5,
        });

        let summary = host.run(&mut sim).unwrap();
        assert_eq!(summary.frames, 10);
        assert!(summary.still_alive > 0);
    }
}
