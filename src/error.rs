//! Error types for viewport wiring and image loading.
//!
//! Scale requests never fail: out-of-range values are clamped. Only loading an
//! image and wiring a controller to its host elements can produce errors.

use thiserror::Error;

use crate::config::ConfigError;

/// Errors that can occur while loading an image into the viewport.
#[derive(Error, Debug)]
pub enum LoadError {
    /// The blob contained no bytes
    #[error("Image blob is empty")]
    Empty,

    /// The header of a recognized format is corrupt or truncated
    #[error("Failed to decode image: {0}")]
    Decode(#[from] image::ImageError),

    /// I/O error while reading the blob
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The host could not create a displayable URL for the blob
    #[error("Failed to create resource URL: {0}")]
    Resource(String),

    /// The host reported that decoding failed after the source was assigned
    #[error("Image failed to decode in the host")]
    DecodeFailed,

    /// A completion arrived for a load that has since been replaced
    #[error("Load {ticket} was superseded by load {current}")]
    Stale {
        /// Ticket of the completion that arrived
        ticket: u64,
        /// Ticket of the load currently in flight or displayed
        current: u64,
    },
}

/// Errors raised when a controller is wired to invalid host handles.
///
/// These are programmer errors, reported once at construction.
#[derive(Error, Debug)]
pub enum ConfigurationError {
    /// No container element was supplied
    #[error("Viewport container element is missing")]
    MissingContainer,

    /// No image element was supplied
    #[error("Viewport image element is missing")]
    MissingImage,

    /// No resource loader was supplied
    #[error("Viewport resource loader is missing")]
    MissingLoader,

    /// A host element lookup by id found nothing of the right type
    #[error("Element not found: {0}")]
    ElementNotFound(String),

    /// The zoom configuration is invalid
    #[error("Invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigError),
}
