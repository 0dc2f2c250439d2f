//! Image selection, validation, compression, and preview handling
//!
//! A file picked by the user becomes a [`SelectedImage`]. It is checked by
//! [`ImageValidator`], optionally shrunk by [`ImageCompressor`], and shown
//! through a [`PreviewUrl`] handed out by the [`PreviewRegistry`].

pub mod compressor;
pub mod preview;
pub mod validator;

pub use compressor::ImageCompressor;
pub use preview::{PreviewRegistry, PreviewUrl};
pub use validator::{ImageValidator, ACCEPTED_MIME_TYPES};

use crate::error::Result;
use anyhow::Context;
use base64::Engine;
use bytes::Bytes;
use std::path::Path;

/// Fallback MIME type when neither the extension nor the content identify the file
const UNKNOWN_MIME_TYPE: &str = "application/octet-stream";

/// The image file currently chosen by the user
///
/// Cloning is cheap: the pixel data is reference counted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedImage {
    /// File name shown to the user and sent in the multipart part
    pub file_name: String,
    /// Declared MIME type (`image/jpeg`, `image/png`, ...)
    pub mime_type: String,
    /// Encoded file contents
    pub bytes: Bytes,
}

impl SelectedImage {
    /// Create a selected image from raw parts
    pub fn new(
        file_name: impl Into<String>,
        mime_type: impl Into<String>,
        bytes: impl Into<Bytes>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type: mime_type.into(),
            bytes: bytes.into(),
        }
    }

    /// Read a file from disk and declare its MIME type
    ///
    /// The type comes from the file extension, falling back to sniffing the
    /// content when the extension is unknown.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read
    pub async fn from_path(path: &Path) -> Result<Self> {
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read image {}", path.display()))?;

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "image".to_string());
        let mime_type = declared_mime_type(path, &bytes);

        tracing::debug!(
            file = %file_name,
            mime_type = %mime_type,
            size = bytes.len(),
            "Selected image"
        );

        Ok(Self::new(file_name, mime_type, bytes))
    }

    /// Size of the encoded file in bytes
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// Inline `data:` URL carrying the whole file
    ///
    /// # Examples
    ///
    /// ```
    /// use neuralens::imaging::SelectedImage;
    ///
    /// let image = SelectedImage::new("dot.png", "image/png", vec![1u8, 2, 3]);
    /// assert_eq!(image.data_url(), "data:image/png;base64,AQID");
    /// ```
    pub fn data_url(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.mime_type,
            base64::engine::general_purpose::STANDARD.encode(&self.bytes)
        )
    }
}

/// Work out the MIME type a file picker would report for `path`
pub fn declared_mime_type(path: &Path, bytes: &[u8]) -> String {
    image::ImageFormat::from_path(path)
        .or_else(|_| image::guess_format(bytes))
        .map(|format| format.to_mime_type().to_string())
        .unwrap_or_else(|_| UNKNOWN_MIME_TYPE.to_string())
}
