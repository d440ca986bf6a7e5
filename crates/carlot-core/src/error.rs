//! Error types for the carlot photo gate.
//!
//! Errors are split so callers can tell a bad upload (fix the photo) from a
//! broken dependency (try again later) without string matching.

use thiserror::Error;

use crate::types::Rejection;

/// Top-level error type for carlot operations.
#[derive(Error, Debug)]
pub enum CarlotError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Upload validation and gating errors
    #[error("Gate error: {0}")]
    Gate(#[from] GateError),

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
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

/// Errors raised while checking, gating, or storing an uploaded image.
#[derive(Error, Debug)]
pub enum GateError {
    /// The request carried no images at all
    #[error("At least one image is required")]
    NoImages,

    /// An upload had zero bytes
    #[error("Image {name} is empty")]
    EmptyUpload { name: String },

    /// File extension is not on the allow-list
    #[error("Unsupported file extension for {name}: .{extension} (allowed: {allowed})")]
    UnsupportedExtension {
        name: String,
        extension: String,
        allowed: String,
    },

    /// Upload exceeds the configured size limit
    #[error("File too large: {name} ({size_mb}MB > {max_mb}MB)")]
    FileTooLarge {
        name: String,
        size_mb: u64,
        max_mb: u64,
    },

    /// Bytes could not be decoded as an image
    #[error("Decode error for {name}: {message}")]
    Decode { name: String, message: String },

    /// Well-formed image failed the quality or subject gate
    #[error("Image {name} rejected: {reason}")]
    ContentRejection { name: String, reason: Rejection },

    /// Classification service unreachable, failing, or returning an unexpected shape
    #[error("Classifier error: {message}")]
    RemoteService {
        message: String,
        status_code: Option<u16>,
    },

    /// A stage exceeded its time limit
    #[error("Timeout in {stage} stage after {timeout_ms}ms")]
    Timeout { stage: String, timeout_ms: u64 },

    /// Writing or reading the image store failed
    #[error("Storage error for {path}: {message}")]
    Storage { path: String, message: String },

    /// A worker task panicked or was cancelled
    #[error("Internal error in {stage} stage: {message}")]
    Internal { stage: String, message: String },
}

impl GateError {
    /// Whether the failure comes from a dependency and may succeed on a later attempt.
    ///
    /// Timeouts, rate limits (429), server errors (5xx), and transport
    /// failures are retryable. Rejections and bad uploads never are.
    pub fn is_retryable(&self) -> bool {
        match self {
            GateError::Timeout { .. } => true,
            GateError::RemoteService { status_code, .. } => match status_code {
                Some(code) => *code == 429 || (500..=599).contains(code),
                // No status: connection refused, DNS, malformed body
                None => true,
            },
            _ => false,
        }
    }

    /// Whether the uploader can fix this by sending a different file.
    pub fn is_user_correctable(&self) -> bool {
        matches!(
            self,
            GateError::NoImages
                | GateError::EmptyUpload { .. }
                | GateError::UnsupportedExtension { .. }
                | GateError::FileTooLarge { .. }
                | GateError::Decode { .. }
                | GateError::ContentRejection { .. }
        )
    }
}

/// Convenience type alias for carlot results.
pub type Result<T> = std::result::Result<T, CarlotError>;

/// Convenience type alias for gate-specific results.
pub type GateResult<T> = std::result::Result<T, GateError>;
