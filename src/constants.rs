//! Global constants for the imgpan viewport

/// Initial zoom factor (1.0 = 100%)
pub const DEFAULT_SCALE: f32 = 1.0;

/// Smallest zoom factor the viewport allows
pub const DEFAULT_MIN_SCALE: f32 = 0.25;

/// Largest zoom factor the viewport allows
pub const DEFAULT_MAX_SCALE: f32 = 5.0;

/// Increment applied per discrete zoom step
pub const DEFAULT_STEP_SCALE: f32 = 0.1;

/// Number of touch contacts that make up a pinch
pub const PINCH_TOUCH_COUNT: usize = 2;
