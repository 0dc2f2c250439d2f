//! Test utilities for NeuraLens
//!
//! This module provides common test utilities including temporary directory
//! management, image fixture encoding, and assertion helpers.

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use std::io::Cursor;
use std::path::PathBuf;
use tempfile::TempDir;

/// Create a temporary directory for testing
///
/// # Returns
///
/// Returns a TempDir that will be cleaned up when dropped
pub fn temp_dir() -> TempDir {
    TempDir::new().expect("Failed to create temporary directory")
}

/// Encode a flat-colored PNG of the given size
///
/// Flat images compress very well, so even large dimensions stay far below
/// the compression threshold.
pub fn encode_png(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_pixel(width, height, Rgb([220, 30, 30]));
    let mut buffer = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(img)
        .write_to(&mut buffer, ImageFormat::Png)
        .expect("Failed to encode PNG fixture");
    buffer.into_inner()
}

/// Encode a JPEG filled with seeded random noise
///
/// Noise defeats JPEG compression, which makes it easy to build fixtures
/// above a given byte size.
pub fn encode_noise_jpeg(width: u32, height: u32, quality: u8) -> Vec<u8> {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    let mut pixels = vec![0u8; (width * height * 3) as usize];
    rng.fill_bytes(&mut pixels);
    let img = RgbImage::from_raw(width, height, pixels).expect("Pixel buffer size mismatch");

    let mut bytes = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut bytes, quality);
    DynamicImage::ImageRgb8(img)
        .write_with_encoder(encoder)
        .expect("Failed to encode JPEG fixture");
    bytes
}

/// Write a flat PNG fixture into `dir`
///
/// # Returns
///
/// Returns the path to the created file
///
/// # Panics
///
/// Panics if writing fails
pub fn write_png(dir: &TempDir, name: &str, width: u32, height: u32) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, encode_png(width, height)).expect("Failed to write test image");
    path
}

/// Assert that an error contains the expected message
///
/// # Panics
///
/// Panics if the result is Ok or if the error doesn't contain the expected message
pub fn assert_error_contains<T>(result: anyhow::Result<T>, expected: &str) {
    match result {
        Ok(_) => panic!("Expected error containing '{}' but got Ok", expected),
        Err(e) => {
            let error_msg = format!("{:#}", e);
            assert!(
                error_msg.contains(expected),
                "Error message '{}' does not contain '{}'",
                error_msg,
                expected
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NeuralensError;

    #[test]
    fn test_temp_dir_creation() {
        let dir = temp_dir();
        assert!(dir.path().exists());
    }

    #[test]
    fn test_encode_png_is_decodable() {
        let bytes = encode_png(20, 10);
        let img = image::load_from_memory(&bytes).unwrap();
        assert_eq!((img.width(), img.height()), (20, 10));
        assert_eq!(image::guess_format(&bytes).unwrap(), ImageFormat::Png);
    }

    #[test]
    fn test_encode_noise_jpeg_is_deterministic() {
        let a = encode_noise_jpeg(64, 32, 90);
        let b = encode_noise_jpeg(64, 32, 90);
        assert_eq!(a, b);
        assert_eq!(image::guess_format(&a).unwrap(), ImageFormat::Jpeg);
    }

    #[test]
    fn test_write_png() {
        let dir = temp_dir();
        let path = write_png(&dir, "sign.png", 4, 4);
        assert!(path.exists());
    }

    #[test]
    fn test_assert_error_contains_success() {
        let result: anyhow::Result<()> =
            Err(NeuralensError::Config("test error message".to_string()).into());
        assert_error_contains(result, "test error");
    }

    #[test]
    #[should_panic(expected = "Expected error containing")]
    fn test_assert_error_contains_ok() {
        assert_error_contains(Ok(()), "error");
    }

    #[test]
    #[should_panic(expected = "does not contain")]
    fn test_assert_error_contains_wrong_message() {
        let result: anyhow::Result<()> =
            Err(NeuralensError::Config("different error".to_string()).into());
        assert_error_contains(result, "not present");
    }
}
