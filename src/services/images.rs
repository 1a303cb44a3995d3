//! Source image compression.
//!
//! Couple portraits and sign renders arrive as arbitrary phone uploads;
//! the provider only needs a bounded JPEG.

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::GenericImageView;
use std::io::Cursor;

/// Longest edge of a compressed upload, in pixels.
const MAX_DIMENSION: u32 = 1920;

/// JPEG quality for compressed uploads.
const JPEG_QUALITY: u8 = 85;

/// Re-encode an uploaded image as a bounded JPEG.
///
/// Downscales so the longest edge is at most [`MAX_DIMENSION`], preserving
/// aspect ratio. Fails on undecodable input.
pub fn compress_image(data: &[u8]) -> Result<Vec<u8>, ImageError> {
    let img = image::load_from_memory(data).map_err(ImageError::Decode)?;

    let (width, height) = img.dimensions();
    let img = if width.max(height) > MAX_DIMENSION {
        img.resize(MAX_DIMENSION, MAX_DIMENSION, FilterType::Lanczos3)
    } else {
        img
    };

    let mut out = Vec::new();
    let encoder = JpegEncoder::new_with_quality(Cursor::new(&mut out), JPEG_QUALITY);
    img.into_rgb8()
        .write_with_encoder(encoder)
        .map_err(ImageError::Encode)?;
    Ok(out)
}

#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    #[error("Failed to decode image: {0}")]
    Decode(#[source] image::ImageError),

    #[error("Failed to encode image: {0}")]
    Encode(#[source] image::ImageError),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = image::RgbImage::from_pixel(width, height, image::Rgb([120, 80, 40]));
        let mut out = Vec::new();
        image::DynamicImage::ImageRgb8(img)
            .write_to(&mut Cursor::new(&mut out), image::ImageFormat::Png)
            .expect("encode test png");
        out
    }

    #[test]
    fn compresses_oversized_image() {
        let compressed = compress_image(&png_bytes(4000, 2000)).expect("compress");
        let img = image::load_from_memory(&compressed).expect("decode compressed");
        let (w, h) = img.dimensions();
        assert!(w.max(h) <= MAX_DIMENSION);
        assert_eq!(image::guess_format(&compressed).unwrap(), image::ImageFormat::Jpeg);
    }

    #[test]
    fn keeps_small_image_dimensions() {
        let compressed = compress_image(&png_bytes(640, 480)).expect("compress");
        let img = image::load_from_memory(&compressed).expect("decode compressed");
        assert_eq!(img.dimensions(), (640, 480));
    }

    #[test]
    fn rejects_garbage() {
        assert!(compress_image(b"not an image").is_err());
    }
}
