use thiserror::Error;

/// Result alias for data model construction.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while building chambers and particles from raw inputs.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// Malformed construction input (negative dimensions or charge counts,
    /// friction outside [0, 1), non-finite vectors).
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
}

impl Error {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidConfiguration(msg.into())
    }
}
