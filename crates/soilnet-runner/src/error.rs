//! Error types for the runner.

use soilnet_station::StationError;
use thiserror::Error;

/// Errors that can occur while loading or running a simulation.
#[derive(Debug, Error)]
pub enum RunnerError {
    /// I/O error reading a configuration file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file is not valid YAML for a simulation.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Summary could not be serialized.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration parsed but is not usable.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The logging subscriber could not be installed.
    #[error("failed to initialize logging: {0}")]
    Logging(String),

    /// Station settings were rejected.
    #[error("station error: {0}")]
    Station(#[from] StationError),
}

/// Result type alias for runner operations.
pub type RunnerResult<T> = Result<T, RunnerError>;
