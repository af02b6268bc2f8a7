//! Error types for the plotting pipeline.

use thiserror::Error;

/// Result type alias using PlotError.
pub type PlotResult<T> = Result<T, PlotError>;

/// Primary error type for a single plotting task.
#[derive(Debug, Error)]
pub enum PlotError {
    // === Catalogue lookups ===
    #[error("Region not found: {0}")]
    RegionNotFound(String),

    #[error("Variable not found: {0}")]
    VariableNotFound(String),

    #[error("Color scale not found: {0}")]
    ScaleNotFound(String),

    #[error("No boundary features for region '{region}': {message}")]
    BoundaryNotFound { region: String, message: String },

    // === Data Errors ===
    #[error("Failed to read data: {0}")]
    DataRead(String),

    // === Rendering Errors ===
    #[error("Rendering failed: {0}")]
    Render(String),

    // === Infrastructure Errors ===
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl PlotError {
    /// Short, stable name of the error kind for log records.
    pub fn kind(&self) -> &'static str {
        match self {
            PlotError::RegionNotFound(_) => "RegionNotFound",
            PlotError::VariableNotFound(_) => "VariableNotFound",
            PlotError::ScaleNotFound(_) => "ScaleNotFound",
            PlotError::BoundaryNotFound { .. } => "BoundaryNotFound",
            PlotError::DataRead(_) => "DataRead",
            PlotError::Render(_) => "Render",
            PlotError::Config(_) => "Config",
            PlotError::Io(_) => "Io",
        }
    }

    /// Whether this error came from a catalogue lookup with an unknown key.
    pub fn is_lookup_failure(&self) -> bool {
        matches!(
            self,
            PlotError::RegionNotFound(_)
                | PlotError::VariableNotFound(_)
                | PlotError::ScaleNotFound(_)
        )
    }
}

impl From<serde_json::Error> for PlotError {
    fn from(err: serde_json::Error) -> Self {
        PlotError::Config(format!("JSON error: {}", err))
    }
}

impl From<serde_yaml::Error> for PlotError {
    fn from(err: serde_yaml::Error) -> Self {
        PlotError::Config(format!("YAML error: {}", err))
    }
}
