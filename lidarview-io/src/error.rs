//! Error types for decoding a single point cloud source

use thiserror::Error;

/// Errors that can occur while decoding one source
#[derive(Error, Debug)]
pub enum IoError {
    #[error("File not found: {path}")]
    FileNotFound { path: String },

    #[error("Invalid file format: {format}")]
    InvalidFormat { format: String },

    #[error("Parse error: {message}")]
    ParseError { message: String },

    #[error("LAS error: {0}")]
    Las(#[from] las::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
