//! Preview references for selected images
//!
//! A preview reference is a short opaque URL standing in for the image
//! bytes, like a browser object URL. The registry keeps the bytes alive
//! until the reference is revoked, so every reference handed out must be
//! revoked once it is superseded.

use super::SelectedImage;
use std::collections::HashMap;
use std::fmt;
use ulid::Ulid;

const PREVIEW_SCHEME: &str = "preview:";

/// Opaque handle to a registered preview
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PreviewUrl(String);

impl PreviewUrl {
    /// The reference as a string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PreviewUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Holds the images behind live preview references
#[derive(Debug, Default)]
pub struct PreviewRegistry {
    live: HashMap<PreviewUrl, SelectedImage>,
}

impl PreviewRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `image` and return a fresh reference to it
    pub fn create(&mut self, image: &SelectedImage) -> PreviewUrl {
        let url = PreviewUrl(format!("{}{}", PREVIEW_SCHEME, Ulid::new()));
        self.live.insert(url.clone(), image.clone());
        tracing::trace!(preview = %url, "Created preview");
        url
    }

    /// Image behind a live reference
    pub fn resolve(&self, url: &PreviewUrl) -> Option<&SelectedImage> {
        self.live.get(url)
    }

    /// Release a reference
    ///
    /// Returns false if the reference was not live (already revoked or
    /// never issued by this registry).
    pub fn revoke(&mut self, url: &PreviewUrl) -> bool {
        let removed = self.live.remove(url).is_some();
        if removed {
            tracing::trace!(preview = %url, "Revoked preview");
        }
        removed
    }

    /// Number of references not yet revoked
    pub fn live_count(&self) -> usize {
        self.live.len()
    }
}
