//! Bubble Chamber Simulation
//!
//! Runs charged particles through a magnetic field until every one of them
//! has decayed, logging what a renderer would draw.

mod host;

use std::path::PathBuf;

use anyhow::{Context, Result};
use chamber_simulation::{Clock, FixedStepClock, ScenarioConfig, Simulation, WallClock};
use clap::Parser;
use host::{Host, HostOptions};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[derive(Parser, Debug)]
#[command(
    name = "bubble-chamber",
    version,
    about = "Charged particles decaying in a magnetic bubble chamber"
)]
struct Cli {
    /// YAML scenario file (defaults to the built-in demo scenario)
    #[arg(short, long)]
    scenario: Option<PathBuf>,

    /// Override the scenario's time modifier
    #[arg(short, long)]
    time_modifier: Option<f64>,

    /// Seed for decay thresholds and split ratios
    #[arg(long)]
    seed: Option<u64>,

    /// Advance by this many clock seconds per step instead of sampling the wall clock
    #[arg(long)]
    fixed_dt: Option<f64>,

    /// Stop after this many steps
    #[arg(long, default_value_t = 100_000)]
    max_steps: u64,

    /// Log a summary every N steps (0 disables)
    #[arg(long, default_value_t = 1_000)]
    log_every: u64,

    /// Print the scenario as YAML and exit
    #[arg(long)]
    dump_scenario: bool,

    /// Increase verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

fn init_logging(cli: &Cli) {
    // RUST_LOG overrides the level picked from -v/-q
    let default_level = match (cli.quiet, cli.verbose) {
        (true, _) => "error",
        (false, 0) => "info",
        (false, 1) => "debug",
        (false, _) => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();
}

fn load_scenario(cli: &Cli) -> Result<ScenarioConfig> {
    let mut scenario = match &cli.scenario {
        Some(path) => ScenarioConfig::from_path(path)
            .with_context(|| format!("failed to load scenario {}", path.display()))?,
        None => ScenarioConfig::default(),
    };
    if let Some(time_modifier) = cli.time_modifier {
        scenario.time_modifier = time_modifier;
    }
    if cli.seed.is_some() {
        scenario.seed = cli.seed;
    }
    Ok(scenario)
}

fn build_clock(cli: &Cli) -> Result<Box<dyn Clock>> {
    Ok(match cli.fixed_dt {
        Some(dt) => Box::new(FixedStepClock::new(dt).context("invalid --fixed-dt")?),
        None => Box::new(WallClock::new()),
    })
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli);

    let scenario = load_scenario(&cli)?;
    if cli.dump_scenario {
        print!("{}", scenario.to_yaml_string()?);
        return Ok(());
    }

    let seed = scenario.seed.unwrap_or_else(|| rand::rng().random());
    let clock = build_clock(&cli)?;
    let mut sim: Simulation<StdRng, Box<dyn Clock>> = scenario
        .build_with_sources(StdRng::seed_from_u64(seed), clock)
        .context("failed to build simulation")?;

    log::info!("Starting bubble chamber simulation (seed {seed})...");
    let mut host = Host::new(HostOptions {
        max_steps: cli.max_steps,
        log_every: cli.log_every,
    });
    let summary = host.run(&mut sim)?;

    log::info!(
        "✓ Finished after {} steps: {:.3} time units, {} particles ({} deaths, {} alive)",
        summary.frames,
        summary.time_passed,
        summary.particles,
        summary.deaths,
        summary.still_alive
    );
    Ok(())
}
