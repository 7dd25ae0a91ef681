//! Error types for the station layer.

use thiserror::Error;

use crate::settings::Param;

/// Errors that can occur when configuring a station.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StationError {
    /// A configuration parameter is out of its allowed range.
    #[error("{param} = {value} is out of range (max {max})")]
    ParamOutOfRange {
        /// Offending parameter.
        param: Param,
        /// Value supplied.
        value: u8,
        /// Largest allowed value.
        max: u8,
    },

    /// A lower bound exceeds its upper bound.
    #[error("{lower} ({lower_value}) exceeds {upper} ({upper_value})")]
    InvertedBounds {
        /// Lower-bound parameter.
        lower: Param,
        /// Its value.
        lower_value: u8,
        /// Upper-bound parameter.
        upper: Param,
        /// Its value.
        upper_value: u8,
    },

    /// A soil sensor was configured to take no samples.
    #[error("soil sensor needs at least one sample")]
    NoSamples,
}

/// Result type alias for station operations.
pub type StationResult<T> = Result<T, StationError>;
