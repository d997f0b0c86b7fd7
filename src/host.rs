//! Host page contract.
//!
//! The controller never creates or destroys page elements. The embedder
//! supplies a container, an image element and a resource loader through these
//! traits; [`crate::web`] implements them on top of the DOM and
//! [`crate::headless`] in memory.

use std::fmt;

use imgpan_input::Size;

use crate::error::LoadError;
use crate::zoom_math::Transform;

/// The fixed-size box the image is panned and zoomed inside.
pub trait ContainerElement {
    /// Current measured size. Hidden containers measure as zero.
    fn size(&self) -> Size;

    /// Show or hide the container.
    fn set_visible(&mut self, visible: bool);
}

/// The element displaying the image.
pub trait ImageElement {
    /// Assign (or clear, with `None`) the displayed resource URL.
    fn set_source(&mut self, url: Option<&str>);

    /// Laid-out size, excluding the scale transform.
    fn size(&self) -> Size;

    /// Reflect the transform onto the element's style.
    fn apply_transform(&mut self, transform: &Transform);
}

/// Turns raw image bytes into displayable URLs and releases them again.
pub trait ResourceLoader {
    /// Create a URL that displays `bytes` as `mime`.
    fn create_url(&mut self, bytes: &[u8], mime: &str) -> Result<String, LoadError>;

    /// Release a URL previously returned by [`ResourceLoader::create_url`].
    fn revoke_url(&mut self, url: &str);
}

/// Disposable handle over registered event listeners.
///
/// Each remover runs exactly once, either on [`ListenerGuard::dispose`] or on drop.
#[derive(Default)]
pub struct ListenerGuard {
    removers: Vec<Box<dyn FnOnce()>>,
}

impl ListenerGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the action that unregisters one listener.
    pub fn push<F>(&mut self, remover: F)
    where
        F: FnOnce() + 'static,
    {
        self.removers.push(Box::new(remover));
    }

    /// Number of listeners still registered.
    pub fn len(&self) -> usize {
        self.removers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.removers.is_empty()
    }

    /// Remove every registered listener. Returns how many were removed.
    pub fn dispose(&mut self) -> usize {
        let count = self.removers.len();
        for remover in self.removers.drain(..) {
            remover();
        }
        if count > 0 {
            log::debug!("Removed {} viewport listeners", count);
        }
        count
    }
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl fmt::Debug for ListenerGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerGuard")
            .field("listeners", &self.removers.len())
            .finish()
    }
}
