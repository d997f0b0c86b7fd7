//! Logger setup for native and WASM builds.
//!
//! Library code only talks to the `log` facade. Embedders call [`init`] once
//! to route it to `env_logger` (native) or the browser console (WASM).

use std::sync::Once;

use crate::config::LogLevel;

static INIT: Once = Once::new();

/// Install the platform logger at `level`. Later calls are no-ops.
pub fn init(level: LogLevel) {
    INIT.call_once(|| install(level));
}

#[cfg(not(target_arch = "wasm32"))]
fn install(level: LogLevel) {
    let result = env_logger::Builder::new()
        .filter_level(level.to_level_filter())
        .format_timestamp_millis()
        .try_init();

    match result {
        Ok(()) => log::debug!("Logging initialized at {}", level.name()),
        // Another logger (e.g. a test harness) got there first
        Err(e) => eprintln!("imgpan: logger not installed: {}", e),
    }
}

#[cfg(target_arch = "wasm32")]
fn install(level: LogLevel) {
    console_error_panic_hook::set_once();

    match console_log::init_with_level(level.to_level()) {
        Ok(()) => log::debug!("Logging initialized at {}", level.name()),
        Err(e) => {
            web_sys::console::warn_1(&format!("imgpan: logger not installed: {}", e).into());
        }
    }
}
