//! Error types for NetCDF reading operations.

use ofs_common::PlotError;
use thiserror::Error;

/// Result type for NetCDF parser operations.
pub type NetCdfResult<T> = Result<T, NetCdfError>;

/// Error types for NetCDF reading.
#[derive(Error, Debug)]
pub enum NetCdfError {
    /// File I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error reported by libnetcdf
    #[error("NetCDF error: {0}")]
    NetCdf(#[from] netcdf::Error),

    /// Missing required variable, dimension or coordinate value
    #[error("Missing required data: {0}")]
    MissingData(String),

    /// Invalid data format
    #[error("Invalid data format: {0}")]
    InvalidFormat(String),

    /// Unparseable CF time units
    #[error("Unsupported time units: {0}")]
    TimeUnits(String),
}

impl From<NetCdfError> for PlotError {
    fn from(err: NetCdfError) -> Self {
        PlotError::DataRead(err.to_string())
    }
}
