//! Client-side image downscaling
//!
//! Large uploads are decoded, shrunk to fit a bounding box, and re-encoded
//! as JPEG before they are sent. Anything that goes wrong here leaves the
//! original file in place; compression never fails an upload.

use super::SelectedImage;
use crate::config::UploadConfig;
use crate::error::Result;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::GenericImageView;
use std::io::Cursor;

/// MIME type of every re-encoded image
const JPEG_MIME_TYPE: &str = "image/jpeg";

/// Shrinks oversized images before upload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageCompressor {
    threshold: u64,
    max_dimension: u32,
    quality: u8,
}

impl ImageCompressor {
    /// Create a compressor
    ///
    /// # Arguments
    ///
    /// * `threshold` - Files strictly larger than this many bytes are re-encoded
    /// * `max_dimension` - Longest edge of the output in pixels
    /// * `quality` - JPEG quality (1-100)
    pub fn new(threshold: u64, max_dimension: u32, quality: u8) -> Self {
        Self {
            threshold,
            max_dimension,
            quality,
        }
    }

    /// Create a compressor from upload configuration
    pub fn from_config(config: &UploadConfig) -> Self {
        Self::new(
            config.compression_threshold,
            config.max_dimension,
            config.jpeg_quality,
        )
    }

    /// Whether `image` is large enough to be re-encoded
    pub fn should_compress(&self, image: &SelectedImage) -> bool {
        image.size() > self.threshold
    }

    /// Shrink `image` if it is over the threshold
    ///
    /// Small images come back untouched. Large images come back as JPEG
    /// with the longer edge at most `max_dimension` pixels and the original
    /// file name. Decode or encode failures return the original image.
    pub async fn compress(&self, image: SelectedImage) -> SelectedImage {
        if !self.should_compress(&image) {
            return image;
        }

        let compressor = *self;
        let original = image.clone();
        match tokio::task::spawn_blocking(move || compressor.reencode(&image)).await {
            Ok(Ok(compressed)) => {
                tracing::debug!(
                    file = %compressed.file_name,
                    before = original.size(),
                    after = compressed.size(),
                    "Compressed image"
                );
                compressed
            }
            Ok(Err(e)) => {
                tracing::warn!(
                    file = %original.file_name,
                    "Image compression failed, uploading original: {:#}",
                    e
                );
                original
            }
            Err(e) => {
                tracing::warn!(
                    file = %original.file_name,
                    "Image compression task failed, uploading original: {}",
                    e
                );
                original
            }
        }
    }

    /// Decode, downscale, and re-encode synchronously
    fn reencode(&self, image: &SelectedImage) -> Result<SelectedImage> {
        let mut decoded = image::load_from_memory(&image.bytes)?;

        let (width, height) = decoded.dimensions();
        if width > self.max_dimension || height > self.max_dimension {
            decoded = decoded.resize(self.max_dimension, self.max_dimension, FilterType::Triangle);
        }

        // JPEG has no alpha channel
        let rgb = image::DynamicImage::ImageRgb8(decoded.to_rgb8());

        let mut buffer = Cursor::new(Vec::new());
        let encoder = JpegEncoder::new_with_quality(&mut buffer, self.quality);
        rgb.write_with_encoder(encoder)?;

        Ok(SelectedImage::new(
            image.file_name.clone(),
            JPEG_MIME_TYPE,
            buffer.into_inner(),
        ))
    }
}

impl Default for ImageCompressor {
    fn default() -> Self {
        Self::from_config(&UploadConfig::default())
    }
}
