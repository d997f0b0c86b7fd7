//! imgpan - pan and zoom viewport for a single image
//!
//! Displays one image inside a fixed-size container and lets the user zoom
//! with Ctrl/Meta + wheel or a two-finger pinch and pan by dragging. The
//! core [`ViewportController`] is host-agnostic: it talks to the page through
//! the traits in [`host`], with in-memory implementations in [`headless`] and
//! DOM-backed ones (plus the JavaScript-facing `WebViewport`) on WASM.

pub mod config;
pub mod constants;
pub mod controller;
pub mod error;
pub mod gesture;
pub mod headless;
pub mod host;
pub mod logging;
pub mod probe;
pub mod zoom_math;

#[cfg(test)]
mod test_image;

pub use config::{ConfigError, LogLevel, ViewportConfig};
pub use controller::{LoadTicket, ViewportController, ViewportControllerBuilder, ViewportState};
pub use error::{ConfigurationError, LoadError};
pub use gesture::{Gesture, GestureTracker, PinchStep};
pub use host::{ContainerElement, ImageElement, ListenerGuard, ResourceLoader};
pub use imgpan_input::{
    Handled, Modifiers, MouseButton, Point, PointerInput, Size, TouchInput, TouchPoint, WheelInput,
};
pub use probe::{ImageInfo, probe};
pub use zoom_math::Transform;

// WASM bindings
#[cfg(target_arch = "wasm32")]
mod web;

#[cfg(target_arch = "wasm32")]
pub use web::*;
