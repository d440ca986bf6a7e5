//! Classifier trait, vocabulary matching, and the timed `classify` call.
//!
//! The network side is reduced to one capability (image in, labelled
//! confidences out) so the gate can run against a fake in tests.

use async_trait::async_trait;
use base64::Engine;
use std::time::Duration;

use crate::error::GateError;
use crate::types::{ClassificationResult, Concept};

/// Labels that count as "this photo shows a vehicle".
///
/// Matching is a case-insensitive substring test, so "sports car" and
/// "Vehicle" match while "truck" or "sedan" on their own do not.
pub const VEHICLE_VOCABULARY: [&str; 3] = ["car", "vehicle", "automobile"];

/// Base64-encoded image ready to send to a classification API.
#[derive(Debug, Clone)]
pub struct ImageInput {
    /// Base64-encoded image bytes
    pub data: String,
}

impl ImageInput {
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self {
            data: base64::engine::general_purpose::STANDARD.encode(bytes),
        }
    }
}

/// A remote service that labels the subjects of an image.
///
/// Uses `async_trait` because native async fn in trait is not object-safe
/// (the gate holds an `Arc<dyn ContentClassifier>`). Implementations must be
/// safe to call concurrently.
#[async_trait]
pub trait ContentClassifier: Send + Sync {
    /// Classifier name for logging (e.g., "clarifai").
    fn name(&self) -> &str;

    /// Submit an image and return the labelled confidences.
    ///
    /// A successful call with no labels returns an empty vec. Transport
    /// failures, non-2xx statuses, and unexpected response shapes are
    /// `GateError::RemoteService`.
    async fn concepts(&self, image: &ImageInput) -> Result<Vec<Concept>, GateError>;

    /// Per-request timeout for this classifier.
    fn timeout(&self) -> Duration;
}

/// Resolve `${ENV_VAR}` references in config strings.
pub fn resolve_env_var(value: &str) -> Option<String> {
    if value.starts_with("${") && value.ends_with('}') {
        let var_name = &value[2..value.len() - 1];
        std::env::var(var_name).ok().filter(|v| !v.is_empty())
    } else if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Whether a label names a vehicle per [`VEHICLE_VOCABULARY`].
pub fn is_vehicle_label(name: &str) -> bool {
    let name = name.to_lowercase();
    VEHICLE_VOCABULARY.iter().any(|word| name.contains(word))
}

/// Apply the vehicle vocabulary to a concept list.
///
/// Passes on the first concept (in response order) that is a vehicle label
/// with confidence at or above `threshold`.
pub fn match_vehicle(concepts: &[Concept], threshold: f32) -> ClassificationResult {
    let hit = concepts
        .iter()
        .find(|c| c.value >= threshold && is_vehicle_label(&c.name));

    ClassificationResult {
        passed: hit.is_some(),
        label: hit.map(|c| c.name.clone()),
        confidence: hit.map(|c| c.value),
        concepts_seen: concepts.len(),
    }
}

/// Classify an image, bounded by the classifier's timeout.
pub async fn classify(
    classifier: &dyn ContentClassifier,
    bytes: &[u8],
    confidence_threshold: f32,
) -> Result<ClassificationResult, GateError> {
    let image = ImageInput::from_bytes(bytes);
    let limit = classifier.timeout();

    let concepts = tokio::time::timeout(limit, classifier.concepts(&image))
        .await
        .map_err(|_| GateError::Timeout {
            stage: "classify".to_string(),
            timeout_ms: limit.as_millis() as u64,
        })??;

    let result = match_vehicle(&concepts, confidence_threshold);
    tracing::debug!(
        "{} returned {} concept(s), vehicle match: {:?}",
        classifier.name(),
        concepts.len(),
        result.label
    );
    Ok(result)
}
