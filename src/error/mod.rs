use std::path::PathBuf;

use thiserror::Error;

/// Application-level errors
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Range error: {0}")]
    Range(#[from] RangeError),

    #[error("Dataset error: {0}")]
    Dataset(#[from] DatasetError),

    #[error("Model error: {0}")]
    Llm(#[from] LlmError),

    #[error("Solver error: {0}")]
    Solver(#[from] SolverError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl AppError {
    /// Whether this error is a configuration problem detected before any job runs.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            AppError::Config { .. } | AppError::Range(_) | AppError::Dataset(_)
        )
    }
}

/// Index range parsing errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RangeError {
    #[error("Range must be a single integer or two comma-separated integers, got '{input}'")]
    Format { input: String },

    #[error("Range start {start} is greater than end {end}")]
    Reversed { start: usize, end: usize },
}

/// Dataset loading errors
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Range [{start}, {end}) is out of bounds for dataset of length {len}")]
    OutOfBounds { start: usize, end: usize, len: usize },

    #[error("Dataset {dataset} has no valid problems in the requested range")]
    Empty { dataset: String },
}

/// Model endpoint errors
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Invalid response: {message}")]
    InvalidResponse { message: String },

    #[error("Request timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Solver precondition errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SolverError {
    #[error("No problem set: call set_problem before solving")]
    ProblemNotSet,
}

/// Result type alias for application errors
pub type AppResult<T> = Result<T, AppError>;

/// Result type alias for dataset operations
pub type DatasetResult<T> = Result<T, DatasetError>;

/// Result type alias for model operations
pub type LlmResult<T> = Result<T, LlmError>;
