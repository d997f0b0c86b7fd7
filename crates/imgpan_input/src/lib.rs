//! imgpan_input - Host-agnostic input model for the image viewport.
//!
//! Browser (or any other) input events are converted into these plain types
//! before they reach the viewport controller, so the gesture logic never
//! touches a DOM type directly.

mod event;
mod units;

pub use event::{Handled, Modifiers, MouseButton, PointerInput, TouchInput, TouchPoint, WheelInput};
pub use units::{Point, Size};
