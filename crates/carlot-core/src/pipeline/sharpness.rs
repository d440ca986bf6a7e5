//! Blur detection via Laplacian variance.
//!
//! Applies the 4-neighbour Laplacian (centre ×4, up/down/left/right ×−1) to
//! every interior pixel of the luminance channel and measures the population
//! variance of the absolute response. Sharp photos have many strong edges and
//! a wide spread of responses; blurred or featureless photos do not.
//!
//! Images whose longer edge exceeds `max_analysis_dimension` are downsampled
//! first so the cost is bounded and the threshold means the same thing for a
//! phone photo and a DSLR export.

use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, GrayImage};

use crate::config::SharpnessConfig;
use crate::error::GateError;
use crate::types::{SharpnessFailure, SharpnessResult};

use super::decode::{decode_bytes, format_to_string};

/// Mean and population variance of the absolute Laplacian response.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LaplacianStats {
    pub mean: f64,
    pub variance: f64,
    pub count: u64,
}

/// Scores uploads for focus and resolution.
#[derive(Debug, Clone)]
pub struct SharpnessAnalyzer {
    config: SharpnessConfig,
}

impl SharpnessAnalyzer {
    pub fn new(config: SharpnessConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SharpnessConfig {
        &self.config
    }

    /// Decode `bytes` and score them.
    ///
    /// Fails only when the bytes are not a decodable image; a small or blurry
    /// image is a normal result with `passed == false`.
    pub fn analyze(&self, bytes: &[u8], name: &str) -> Result<SharpnessResult, GateError> {
        let decoded = decode_bytes(bytes, name)?;
        tracing::trace!(
            "Decoded {} as {} {}x{} ({} bytes)",
            name,
            format_to_string(decoded.format),
            decoded.width,
            decoded.height,
            decoded.byte_len
        );
        Ok(self.analyze_image(&decoded.image))
    }

    /// Score an already-decoded image.
    pub fn analyze_image(&self, image: &DynamicImage) -> SharpnessResult {
        let (width, height) = image.dimensions();

        if width < self.config.min_width || height < self.config.min_height {
            return SharpnessResult {
                passed: false,
                variance: 0.0,
                mean: 0.0,
                pixels_evaluated: 0,
                width,
                height,
                analyzed_width: 0,
                analyzed_height: 0,
                failure: Some(SharpnessFailure::TooSmall),
            };
        }

        let gray = match downscale_dimensions(width, height, self.config.max_analysis_dimension) {
            Some((w, h)) => {
                tracing::trace!("Downsampling {}x{} -> {}x{} for analysis", width, height, w, h);
                image.resize_exact(w, h, FilterType::CatmullRom).to_luma8()
            }
            None => image.to_luma8(),
        };

        let stats = laplacian_stats(&gray);
        let passed = stats.count > 0 && stats.variance >= self.config.variance_threshold;

        SharpnessResult {
            passed,
            variance: stats.variance,
            mean: stats.mean,
            pixels_evaluated: stats.count,
            width,
            height,
            analyzed_width: gray.width(),
            analyzed_height: gray.height(),
            failure: (!passed).then_some(SharpnessFailure::LowVariance),
        }
    }
}

/// Target size when the longer edge exceeds `max_dim`, preserving aspect ratio.
///
/// Returns `None` when no resize is needed, including an edge exactly at the cap.
pub fn downscale_dimensions(width: u32, height: u32, max_dim: u32) -> Option<(u32, u32)> {
    let longer = width.max(height);
    if longer <= max_dim {
        return None;
    }
    let scale = |dim: u32| ((dim as u64 * max_dim as u64) / longer as u64).max(1) as u32;
    Some((scale(width), scale(height)))
}

/// Absolute 4-neighbour Laplacian statistics over interior pixels.
///
/// The 1-pixel border is skipped, so images narrower or shorter than 3 pixels
/// produce `count == 0`.
pub fn laplacian_stats(gray: &GrayImage) -> LaplacianStats {
    let (width, height) = gray.dimensions();
    if width < 3 || height < 3 {
        return LaplacianStats {
            mean: 0.0,
            variance: 0.0,
            count: 0,
        };
    }

    let w = width as usize;
    let raw = gray.as_raw();

    let mut sum = 0f64;
    let mut sum_sq = 0f64;
    let mut count = 0u64;

    for y in 1..height as usize - 1 {
        let prev = &raw[(y - 1) * w..y * w];
        let cur = &raw[y * w..(y + 1) * w];
        let next = &raw[(y + 1) * w..(y + 2) * w];

        for x in 1..w - 1 {
            let lap = 4 * i32::from(cur[x])
                - i32::from(cur[x - 1])
                - i32::from(cur[x + 1])
                - i32::from(prev[x])
                - i32::from(next[x]);
            let response = f64::from(lap.unsigned_abs());
            sum += response;
            sum_sq += response * response;
            count += 1;
        }
    }

    let n = count as f64;
    let mean = sum / n;
    // E[x²] − E[x]² can dip a hair below zero from rounding
    let variance = (sum_sq / n - mean * mean).max(0.0);

    LaplacianStats {
        mean,
        variance,
        count,
    }
}
