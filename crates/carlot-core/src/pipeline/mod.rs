//! Upload gating pipeline.
//!
//! This module contains the stages an uploaded photo passes through:
//! - **validate**: Cheap pre-decode checks (size, extension, magic bytes)
//! - **decode**: Turn bytes into pixels
//! - **sharpness**: Laplacian-variance blur and resolution check
//! - **gate**: Sharpness then remote classification, producing a verdict
//! - **store**: Content-addressed storage for accepted photos
//! - **intake**: All-or-nothing batch acceptance

pub mod decode;
pub mod gate;
pub mod intake;
pub mod sharpness;
pub mod store;
pub mod validate;

// Re-exports for convenient access
pub use decode::{decode_bytes, DecodedImage};
pub use gate::ImageGate;
pub use intake::{ImageIntake, UploadedImage};
pub use sharpness::{downscale_dimensions, laplacian_stats, LaplacianStats, SharpnessAnalyzer};
pub use store::ImageStore;
pub use validate::UploadValidator;
