//! In-memory host elements.
//!
//! Lets the controller run without a browser: native embedders can drive it
//! and read back the resulting transform, and tests can assert on every
//! change the controller made to its "page".

use std::collections::BTreeSet;

use imgpan_input::Size;

use crate::error::LoadError;
use crate::host::{ContainerElement, ImageElement, ResourceLoader};
use crate::zoom_math::Transform;

/// A container with a fixed size that only measures while visible.
#[derive(Debug, Clone, Default)]
pub struct MemoryContainer {
    size: Size,
    visible: bool,
}

impl MemoryContainer {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            size: Size::new(width, height),
            visible: false,
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.size = Size::new(width, height);
    }
}

impl ContainerElement for MemoryContainer {
    fn size(&self) -> Size {
        if self.visible { self.size } else { Size::default() }
    }

    fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }
}

/// An image element whose laid-out size is set by the test or embedder
/// once "decoding" finishes.
#[derive(Debug, Clone, Default)]
pub struct MemoryImage {
    source: Option<String>,
    size: Size,
    transform: Option<Transform>,
    transform_writes: usize,
}

impl MemoryImage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate layout after decode.
    pub fn set_decoded_size(&mut self, width: f32, height: f32) {
        self.size = Size::new(width, height);
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    /// Last transform applied, if any.
    pub fn transform(&self) -> Option<Transform> {
        self.transform
    }

    /// How many times a transform was applied.
    pub fn transform_writes(&self) -> usize {
        self.transform_writes
    }
}

impl ImageElement for MemoryImage {
    fn set_source(&mut self, url: Option<&str>) {
        self.source = url.map(str::to_owned);
        // A new source has not been laid out yet
        self.size = Size::default();
    }

    fn size(&self) -> Size {
        self.size
    }

    fn apply_transform(&mut self, transform: &Transform) {
        self.transform = Some(*transform);
        self.transform_writes += 1;
    }
}

/// Hands out `mem://N` URLs and tracks which are still live.
#[derive(Debug, Clone, Default)]
pub struct MemoryLoader {
    next_id: u64,
    live: BTreeSet<String>,
    revoked: Vec<String>,
    last_mime: Option<String>,
    fail_next: bool,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// URLs created and not yet revoked.
    pub fn live_urls(&self) -> impl Iterator<Item = &str> {
        self.live.iter().map(String::as_str)
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    /// URLs revoked so far, in order.
    pub fn revoked(&self) -> &[String] {
        &self.revoked
    }

    /// MIME type passed to the most recent successful `create_url`.
    pub fn last_mime(&self) -> Option<&str> {
        self.last_mime.as_deref()
    }

    /// Make the next `create_url` call fail.
    pub fn fail_next(&mut self) {
        self.fail_next = true;
    }
}

impl ResourceLoader for MemoryLoader {
    fn create_url(&mut self, bytes: &[u8], mime: &str) -> Result<String, LoadError> {
        if std::mem::take(&mut self.fail_next) {
            return Err(LoadError::Resource("out of object URLs".to_string()));
        }

        self.next_id += 1;
        let url = format!("mem://{}", self.next_id);
        log::trace!("{} -> {} ({} bytes)", url, mime, bytes.len());
        self.live.insert(url.clone());
        self.last_mime = Some(mime.to_owned());
        Ok(url)
    }

    fn revoke_url(&mut self, url: &str) {
        if self.live.remove(url) {
            self.revoked.push(url.to_owned());
        } else {
            log::warn!("Revoking unknown URL {}", url);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hidden_container_measures_zero() {
        let mut container = MemoryContainer::new(400.0, 300.0);
        assert!(container.size().is_empty());
        container.set_visible(true);
        assert_eq!(container.size(), Size::new(400.0, 300.0));
    }

    #[test]
    fn test_new_source_resets_layout() {
        let mut image = MemoryImage::new();
        image.set_decoded_size(10.0, 10.0);
        image.set_source(Some("mem://1"));
        assert_eq!(image.source(), Some("mem://1"));
        assert!(image.size().is_empty());
    }

    #[test]
    fn test_loader_tracks_live_urls() {
        let mut loader = MemoryLoader::new();
        let a = loader.create_url(b"a", "image/png").expect("created");
        let b = loader.create_url(b"b", "image/png").expect("created");
        assert_ne!(a, b);
        assert_eq!(loader.live_count(), 2);

        loader.revoke_url(&a);
        assert_eq!(loader.live_urls().collect::<Vec<_>>(), vec![b.as_str()]);
        assert_eq!(loader.revoked(), &[a]);
    }

    #[test]
    fn test_loader_fail_next() {
        let mut loader = MemoryLoader::new();
        loader.fail_next();
        assert!(matches!(loader.create_url(b"x", "image/png"), Err(LoadError::Resource(_))));
        assert!(loader.create_url(b"x", "image/png").is_ok());
    }
}
