//! Error types for RiskMap

use thiserror::Error;

/// Main error type for RiskMap operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid raster dimensions: {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },

    #[error("Index out of bounds: ({row}, {col}) in raster of size ({rows}, {cols})")]
    IndexOutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    #[error("Raster size mismatch: expected ({er}, {ec}), got ({ar}, {ac})")]
    SizeMismatch { er: usize, ec: usize, ar: usize, ac: usize },

    #[error("Raster grids are not aligned: {0}")]
    GridMismatch(String),

    #[error("Invalid normalization band [{min}, {max}]: {reason}")]
    InvalidBand {
        min: f64,
        max: f64,
        reason: String,
    },

    #[error("Invalid weights: {0}")]
    InvalidWeights(String),

    #[error("Invalid legend: {0}")]
    InvalidLegend(String),

    #[error("Invalid period: {start} is after {end}")]
    InvalidPeriod { start: String, end: String },

    #[error("No valid data: {0}")]
    NoData(String),

    #[error("Unsupported data type: {0}")]
    UnsupportedDataType(String),

    #[error("Invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Whether this error stems from invalid configuration rather than data or I/O.
    ///
    /// Configuration errors are detected before any cell is computed.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Error::SizeMismatch { .. }
                | Error::GridMismatch(_)
                | Error::InvalidBand { .. }
                | Error::InvalidWeights(_)
                | Error::InvalidLegend(_)
                | Error::InvalidPeriod { .. }
                | Error::InvalidParameter { .. }
        )
    }
}

/// Result type alias for RiskMap operations
pub type Result<T> = std::result::Result<T, Error>;
