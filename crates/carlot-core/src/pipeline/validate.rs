//! Upload checks that run before any decoding.

use std::path::Path;

use crate::config::{IntakeConfig, LimitsConfig};
use crate::error::GateError;

/// Cheap pre-decode checks on a single upload.
pub struct UploadValidator {
    limits: LimitsConfig,
    allowed_extensions: Vec<String>,
}

impl UploadValidator {
    /// Create a new validator with the given limits and allow-list.
    pub fn new(limits: LimitsConfig, intake: &IntakeConfig) -> Self {
        Self {
            limits,
            allowed_extensions: intake
                .allowed_extensions
                .iter()
                .map(|e| e.trim_start_matches('.').to_lowercase())
                .collect(),
        }
    }

    /// Check an upload before it enters the gate.
    ///
    /// Checks, in order:
    /// - Upload is not empty
    /// - Extension is on the allow-list (case-insensitive)
    /// - Size is within limits
    /// - Leading bytes carry a JPEG or PNG signature
    pub fn check(&self, name: &str, bytes: &[u8]) -> Result<(), GateError> {
        if bytes.is_empty() {
            return Err(GateError::EmptyUpload {
                name: name.to_string(),
            });
        }

        let extension = extension_of(name);
        if !self.allowed_extensions.contains(&extension) {
            return Err(GateError::UnsupportedExtension {
                name: name.to_string(),
                extension,
                allowed: self.allowed_extensions.join(", "),
            });
        }

        let max_bytes = self.limits.max_file_size_mb * 1024 * 1024;
        if bytes.len() as u64 > max_bytes {
            return Err(GateError::FileTooLarge {
                name: name.to_string(),
                size_mb: bytes.len() as u64 / (1024 * 1024),
                max_mb: self.limits.max_file_size_mb,
            });
        }

        if !Self::is_valid_image_header(bytes) {
            return Err(GateError::Decode {
                name: name.to_string(),
                message: "Unrecognized image format (invalid magic bytes)".to_string(),
            });
        }

        Ok(())
    }

    /// Check if the header bytes match an accepted container.
    ///
    /// APNG shares the PNG signature.
    fn is_valid_image_header(header: &[u8]) -> bool {
        // JPEG: FF D8 FF
        if header.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return true;
        }

        // PNG / APNG: 89 50 4E 47 0D 0A 1A 0A
        header.starts_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A])
    }
}

/// Lower-cased extension without the dot; empty when there is none.
pub fn extension_of(name: &str) -> String {
    Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default()
}
