//! Error types for the softglow enhancement pipeline.
//!
//! Errors are organized by stage so a failure names the image and the stage
//! that rejected it. Pixel stages themselves are total over valid buffers;
//! everything here is raised at the boundaries (validation, decode, encode).

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for softglow operations.
#[derive(Error, Debug)]
pub enum SoftglowError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Pipeline processing errors
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Pipeline errors, organized by stage.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// The codec could not produce a buffer; nothing reached stage 1
    #[error("Decode error for {path}: {message}")]
    DecodeFailure { path: PathBuf, message: String },

    /// Zero width or height
    #[error("Invalid dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    /// The resize plan would exceed the dimension limit
    #[error("Working size {width}x{height} exceeds {max_dim}")]
    WorkingSizeTooLarge { width: u32, height: u32, max_dim: u32 },

    /// Buffer is not an interleaved 8-bit channel triple
    #[error("Unsupported channel layout: {message}")]
    UnsupportedChannelLayout { message: String },

    /// Encoding the finished buffer failed
    #[error("Encode error for {path}: {message}")]
    Encode { path: PathBuf, message: String },

    /// The overlay collaborator returned an unusable buffer
    #[error("Overlay error: {message}")]
    Overlay { message: String },

    /// File exceeds size limit
    #[error("File too large: {path} ({size_mb}MB > {max_mb}MB)")]
    FileTooLarge {
        path: PathBuf,
        size_mb: u64,
        max_mb: u64,
    },

    /// Image dimensions exceed limit
    #[error("Image too large: {path} ({width}x{height} > {max_dim})")]
    ImageTooLarge {
        path: PathBuf,
        width: u32,
        height: u32,
        max_dim: u32,
    },
}

/// Convenience type alias for softglow results.
pub type Result<T> = std::result::Result<T, SoftglowError>;

/// Convenience type alias for pipeline-specific results.
pub type PipelineResult<T> = std::result::Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_failure_names_path() {
        let err = PipelineError::DecodeFailure {
            path: PathBuf::from("/photos/ring.jpg"),
            message: "truncated".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("ring.jpg"));
        assert!(msg.contains("truncated"));
    }

    #[test]
    fn test_pipeline_error_wraps_into_top_level() {
        let err: SoftglowError = PipelineError::InvalidDimensions {
            width: 0,
            height: 4,
        }
        .into();
        assert!(err.to_string().starts_with("Pipeline error"));
        assert!(err.to_string().contains("0x4"));
    }
}
