//! Image decoding from in-memory upload bytes with content-based format detection.

use image::{DynamicImage, GenericImageView, ImageFormat};
use std::io::Cursor;

use crate::error::GateError;

/// Result of decoding an uploaded image.
#[derive(Debug)]
pub struct DecodedImage {
    /// The decoded image data
    pub image: DynamicImage,
    /// Detected image format
    pub format: ImageFormat,
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
    /// Encoded size in bytes
    pub byte_len: u64,
}

/// Decode an upload. The format is sniffed from the content, never the name.
///
/// `name` is only used for error messages.
pub fn decode_bytes(bytes: &[u8], name: &str) -> Result<DecodedImage, GateError> {
    let reader = image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| GateError::Decode {
            name: name.to_string(),
            message: format!("Cannot detect image format: {}", e),
        })?;

    let format = reader.format().ok_or_else(|| GateError::Decode {
        name: name.to_string(),
        message: "Unrecognized image format".to_string(),
    })?;

    let image = reader.decode().map_err(|e| GateError::Decode {
        name: name.to_string(),
        message: e.to_string(),
    })?;

    let (width, height) = image.dimensions();
    Ok(DecodedImage {
        image,
        format,
        width,
        height,
        byte_len: bytes.len() as u64,
    })
}

/// Convert an ImageFormat to a string representation.
pub fn format_to_string(format: ImageFormat) -> String {
    match format {
        ImageFormat::Jpeg => "jpeg".to_string(),
        ImageFormat::Png => "png".to_string(),
        ImageFormat::WebP => "webp".to_string(),
        ImageFormat::Gif => "gif".to_string(),
        ImageFormat::Bmp => "bmp".to_string(),
        _ => "unknown".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{encode, flat_image};

    #[test]
    fn test_format_to_string() {
        assert_eq!(format_to_string(ImageFormat::Jpeg), "jpeg");
        assert_eq!(format_to_string(ImageFormat::Png), "png");
        assert_eq!(format_to_string(ImageFormat::Tiff), "unknown");
    }

    #[test]
    fn test_decode_png_reports_dimensions() {
        let bytes = encode(&flat_image(320, 240, 128), ImageFormat::Png).unwrap();
        let decoded = decode_bytes(&bytes, "flat.png").unwrap();
        assert_eq!(decoded.format, ImageFormat::Png);
        assert_eq!((decoded.width, decoded.height), (320, 240));
        assert_eq!(decoded.byte_len, bytes.len() as u64);
    }

    #[test]
    fn test_format_detected_by_content() {
        // PNG bytes under a .jpg name still decode as PNG
        let bytes = encode(&flat_image(16, 16, 10), ImageFormat::Png).unwrap();
        let decoded = decode_bytes(&bytes, "misnamed.jpg").unwrap();
        assert_eq!(decoded.format, ImageFormat::Png);
    }

    #[test]
    fn test_decode_jpeg() {
        let bytes = encode(&flat_image(64, 48, 200), ImageFormat::Jpeg).unwrap();
        let decoded = decode_bytes(&bytes, "flat.jpg").unwrap();
        assert_eq!(decoded.format, ImageFormat::Jpeg);
        assert_eq!((decoded.width, decoded.height), (64, 48));
    }

    #[test]
    fn test_garbage_bytes_fail_with_decode_error() {
        let err = decode_bytes(b"definitely not an image", "notes.png").unwrap_err();
        match err {
            GateError::Decode { name, .. } => assert_eq!(name, "notes.png"),
            other => panic!("Expected decode error, got {other:?}"),
        }
    }

    #[test]
    fn test_truncated_png_fails_with_decode_error() {
        let bytes = encode(&flat_image(64, 64, 90), ImageFormat::Png).unwrap();
        let truncated = &bytes[..bytes.len() / 2];
        assert!(matches!(
            decode_bytes(truncated, "half.png"),
            Err(GateError::Decode { .. })
        ));
    }
}
