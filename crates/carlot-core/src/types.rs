//! Core data types produced by the photo gate.
//!
//! Everything here is derived per validation call and never persisted, apart
//! from [`ImageRef`] which describes a stored file.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::GateError;

/// Why the sharpness stage failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SharpnessFailure {
    /// Decoded width or height is below the configured minimum
    TooSmall,
    /// Laplacian variance is below the threshold (or nothing was measured)
    LowVariance,
}

impl fmt::Display for SharpnessFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SharpnessFailure::TooSmall => write!(f, "too small"),
            SharpnessFailure::LowVariance => write!(f, "too blurry"),
        }
    }
}

/// Result of the local sharpness analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SharpnessResult {
    /// Whether the image is large and sharp enough
    pub passed: bool,

    /// Population variance of the absolute Laplacian response
    pub variance: f64,

    /// Mean absolute Laplacian response
    pub mean: f64,

    /// Number of interior pixels that contributed to the statistics
    pub pixels_evaluated: u64,

    /// Decoded width in pixels
    pub width: u32,

    /// Decoded height in pixels
    pub height: u32,

    /// Width actually analyzed (after downsampling)
    pub analyzed_width: u32,

    /// Height actually analyzed (after downsampling)
    pub analyzed_height: u32,

    /// Failure cause, when `passed` is false
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<SharpnessFailure>,
}

/// One labelled confidence returned by the classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Concept {
    /// Label name, e.g. "car" or "sports car"
    pub name: String,

    /// Confidence in `0.0..=1.0`
    pub value: f32,
}

impl Concept {
    pub fn new(name: impl Into<String>, value: f32) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// Result of the remote subject classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    /// Whether a vehicle label matched at or above the threshold
    pub passed: bool,

    /// The matching label, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    /// Confidence of the matching label, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,

    /// Number of concepts the service returned
    pub concepts_seen: usize,
}

/// A user-facing reason an image was turned away.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rejection {
    BlurryOrLowResolution,
    NoVehicleDetected,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::BlurryOrLowResolution => {
                write!(f, "image appears blurry or low resolution")
            }
            Rejection::NoVehicleDetected => write!(f, "no vehicle detected in the image"),
        }
    }
}

/// Terminal state of a successful (non-erroring) validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Accepted,
    RejectedBlurry,
    RejectedNotVehicle,
}

/// Aggregate of both gates for one image.
///
/// `verdict` is `Accepted` iff the sharpness result passed and a
/// classification result is present and passed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationOutcome {
    pub verdict: Verdict,

    pub sharpness: SharpnessResult,

    /// Absent when the sharpness gate short-circuited
    #[serde(skip_serializing_if = "Option::is_none")]
    pub classification: Option<ClassificationResult>,
}

impl ValidationOutcome {
    /// Outcome for an image that failed the sharpness gate.
    pub fn blurry(sharpness: SharpnessResult) -> Self {
        Self {
            verdict: Verdict::RejectedBlurry,
            sharpness,
            classification: None,
        }
    }

    /// Combine a passing sharpness result with a classification.
    pub fn classified(sharpness: SharpnessResult, classification: ClassificationResult) -> Self {
        let verdict = if sharpness.passed && classification.passed {
            Verdict::Accepted
        } else if !sharpness.passed {
            Verdict::RejectedBlurry
        } else {
            Verdict::RejectedNotVehicle
        };
        Self {
            verdict,
            sharpness,
            classification: Some(classification),
        }
    }

    pub fn is_accepted(&self) -> bool {
        self.verdict == Verdict::Accepted
    }

    /// The rejection reason, or `None` when accepted.
    pub fn rejection(&self) -> Option<Rejection> {
        match self.verdict {
            Verdict::Accepted => None,
            Verdict::RejectedBlurry => Some(Rejection::BlurryOrLowResolution),
            Verdict::RejectedNotVehicle => Some(Rejection::NoVehicleDetected),
        }
    }

    /// Turn a rejection into `GateError::ContentRejection` for `?` callers.
    pub fn ensure_accepted(&self, name: &str) -> Result<(), GateError> {
        match self.rejection() {
            None => Ok(()),
            Some(reason) => Err(GateError::ContentRejection {
                name: name.to_string(),
                reason,
            }),
        }
    }
}

/// Reference to an image written by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRef {
    /// File name inside the image directory (`<blake3>.<ext>`)
    pub file_name: String,

    /// Public URL, e.g. `/images/<file_name>`
    pub url: String,

    /// Stored size in bytes
    pub size: u64,

    /// BLAKE3 hash of the stored bytes
    pub content_hash: String,
}
