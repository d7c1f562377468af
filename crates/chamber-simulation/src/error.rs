use thiserror::Error;

/// Result alias for simulation operations.
pub type Result<T> = std::result::Result<T, SimulationError>;

/// Errors surfaced by the simulation engine.
///
/// None of these are transient: each one is a configuration or usage error
/// reported synchronously to the caller.
#[derive(Debug, Error)]
pub enum SimulationError {
    /// Malformed chamber, particle or engine inputs.
    #[error(transparent)]
    InvalidConfiguration(#[from] chamber_physics::Error),

    /// `step()` was called before `start()`, so there is no clock reference.
    #[error("step() called before start(): the simulation clock has no reference point")]
    PrecedingStart,

    /// A time step that is negative or not finite.
    #[error("invalid time delta: {0}")]
    InvalidTimeDelta(f64),

    /// The scenario file could not be read.
    #[error("failed to read scenario: {0}")]
    ScenarioIo(#[from] std::io::Error),

    /// The scenario file is not valid YAML for a scenario.
    #[error("failed to parse scenario: {0}")]
    ScenarioFormat(#[from] serde_yaml_ng::Error),
}

impl SimulationError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidConfiguration(chamber_physics::Error::InvalidConfiguration(msg.into()))
    }
}
