//! Synthetic images for offline tests and benchmarks.
//!
//! Everything is generated in memory, so no fixture files are needed.

use image::{DynamicImage, GrayImage, ImageFormat, ImageResult, Luma};
use std::io::Cursor;

/// A single-colour image. Its Laplacian response is zero everywhere.
pub fn flat_image(width: u32, height: u32, level: u8) -> DynamicImage {
    DynamicImage::ImageLuma8(GrayImage::from_pixel(width, height, Luma([level])))
}

/// A black/white checkerboard with square cells of `cell` pixels.
///
/// Cell edges give a strong, sparse Laplacian response, so the variance is
/// far above any sensible blur threshold for cells of a few pixels or more.
pub fn checkerboard(width: u32, height: u32, cell: u32) -> DynamicImage {
    let cell = cell.max(1);
    DynamicImage::ImageLuma8(GrayImage::from_fn(width, height, |x, y| {
        if ((x / cell) + (y / cell)) % 2 == 0 {
            Luma([0])
        } else {
            Luma([255])
        }
    }))
}

/// Encode an image into the given container format.
pub fn encode(image: &DynamicImage, format: ImageFormat) -> ImageResult<Vec<u8>> {
    let mut buffer = Cursor::new(Vec::new());
    let image = match format {
        // JPEG has no 16-bit or alpha support; normalise to RGB8
        ImageFormat::Jpeg => DynamicImage::ImageRgb8(image.to_rgb8()),
        _ => image.clone(),
    };
    image.write_to(&mut buffer, format)?;
    Ok(buffer.into_inner())
}

/// PNG-encoded checkerboard.
pub fn checkerboard_png(width: u32, height: u32, cell: u32) -> ImageResult<Vec<u8>> {
    encode(&checkerboard(width, height, cell), ImageFormat::Png)
}

/// PNG-encoded flat image.
pub fn flat_png(width: u32, height: u32, level: u8) -> ImageResult<Vec<u8>> {
    encode(&flat_image(width, height, level), ImageFormat::Png)
}
