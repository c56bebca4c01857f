//! Error types for lidarview

use thiserror::Error;

/// Main error type for lidarview operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Ingestion produced no points")]
    EmptyPointSet,

    #[error("Unknown {kind}: {value:?}")]
    UnknownVariant { kind: &'static str, value: String },

    #[error("Camera path not found: {0}")]
    PathNotFound(String),

    /// Every source failed; `causes` holds one `"source: error"` line per failure
    #[error("No data available: all {attempted} source(s) failed to load{}", describe_causes(.causes))]
    NoDataAvailable { attempted: usize, causes: Vec<String> },
}

fn describe_causes(causes: &[String]) -> String {
    if causes.is_empty() {
        String::new()
    } else {
        format!(" ({})", causes.join("; "))
    }
}

impl Error {
    /// Shorthand for rejecting an unrecognised enumeration tag
    pub fn unknown(kind: &'static str, value: impl Into<String>) -> Self {
        Error::UnknownVariant {
            kind,
            value: value.into(),
        }
    }
}

/// Result type alias for lidarview operations
pub type Result<T> = std::result::Result<T, Error>;
