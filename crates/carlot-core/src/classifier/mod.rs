//! Remote subject classification.
//!
//! Provides the `ContentClassifier` seam, the Clarifai implementation, and
//! the fixed vehicle vocabulary used to turn labels into a pass/fail result.

pub(crate) mod clarifai;
pub(crate) mod provider;

pub use clarifai::{ClarifaiClassifier, ClarifaiCredentials};
pub use provider::{
    classify, is_vehicle_label, match_vehicle, resolve_env_var, ContentClassifier, ImageInput,
    VEHICLE_VOCABULARY,
};
