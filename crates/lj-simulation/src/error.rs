use std::path::PathBuf;

use lj_core::{EntityId, LjError};

/// Alias for `Result<T, SimError>`.
pub type SimResult<T> = Result<T, SimError>;

/// Errors raised while configuring or stepping a simulation.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    /// A system referenced an entity that is not in the world.
    #[error("entity not found in simulation: {0}")]
    EntityNotFound(EntityId),

    /// A configuration value is out of range.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// A config file could not be read.
    #[error("cannot read config {}: {source}", path.display())]
    ConfigIo {
        /// The file that failed to load.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// A config or script file is not valid JSON for its schema.
    #[error("cannot parse JSON: {0}")]
    ConfigParse(#[from] serde_json::Error),

    /// A scene operation failed.
    #[error(transparent)]
    World(#[from] LjError),

    /// A system failed for a reason of its own.
    #[error("system error: {0}")]
    SystemError(String),
}
