//! Error types for the ridership-forecast library.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Result type alias for forecast operations.
pub type Result<T> = std::result::Result<T, ForecastError>;

/// Errors that can occur while extracting, fitting, forecasting or evaluating.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ForecastError {
    /// Malformed or unparsable input data.
    #[error("data error: {0}")]
    Data(String),

    /// The optimizer did not converge within its iteration budget.
    #[error("model fitting did not converge after {iterations} iterations")]
    Convergence { iterations: usize },

    /// Forecast and ground-truth windows do not line up.
    #[error("alignment error: {0}")]
    Alignment(String),

    /// Insufficient data points for the operation.
    #[error("insufficient data: need at least {needed}, got {got}")]
    InsufficientData { needed: usize, got: usize },

    /// Invalid parameter value.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Filesystem failure.
    #[error("I/O error: {0}")]
    Io(String),

    /// Record (de)serialization failure.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl ForecastError {
    /// Reason code recorded for skipped services.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ForecastError::Data(_) => ErrorKind::DataError,
            ForecastError::Convergence { .. } => ErrorKind::ConvergenceError,
            ForecastError::Alignment(_) => ErrorKind::AlignmentError,
            ForecastError::InsufficientData { .. } => ErrorKind::InsufficientData,
            ForecastError::InvalidParameter(_) => ErrorKind::InvalidParameter,
            ForecastError::Io(_) => ErrorKind::IoError,
            ForecastError::Serialization(_) => ErrorKind::SerializationError,
        }
    }
}

impl From<std::io::Error> for ForecastError {
    fn from(err: std::io::Error) -> Self {
        ForecastError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for ForecastError {
    fn from(err: serde_json::Error) -> Self {
        ForecastError::Serialization(err.to_string())
    }
}

impl From<csv::Error> for ForecastError {
    fn from(err: csv::Error) -> Self {
        ForecastError::Data(err.to_string())
    }
}

/// Serializable error category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    DataError,
    ConvergenceError,
    AlignmentError,
    InsufficientData,
    InvalidParameter,
    IoError,
    SerializationError,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::DataError => "data_error",
            ErrorKind::ConvergenceError => "convergence_error",
            ErrorKind::AlignmentError => "alignment_error",
            ErrorKind::InsufficientData => "insufficient_data",
            ErrorKind::InvalidParameter => "invalid_parameter",
            ErrorKind::IoError => "io_error",
            ErrorKind::SerializationError => "serialization_error",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
