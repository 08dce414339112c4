//! Console logging shared by the WASM modules.
//!
//! In the browser every message goes to `console.*` through `web_sys`. Host
//! builds (unit tests, the preview CLI) cannot call JS imports, so the same
//! macros write to stderr there.

/// Log level of a console message
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Level {
    Debug,
    Info,
    Warn,
    Error,
}

impl Level {
    #[cfg_attr(target_arch = "wasm32", allow(dead_code))]
    fn label(self) -> &'static str {
        match self {
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
        }
    }
}

/// Write one message at the given level
#[cfg(target_arch = "wasm32")]
pub fn write(level: Level, message: &str) {
    use wasm_bindgen::JsValue;
    use web_sys::console;

    let value = JsValue::from_str(message);
    match level {
        Level::Debug => console::debug_1(&value),
        Level::Info => console::log_1(&value),
        Level::Warn => console::warn_1(&value),
        Level::Error => console::error_1(&value),
    }
}

/// Write one message at the given level
#[cfg(not(target_arch = "wasm32"))]
pub fn write(level: Level, message: &str) {
    eprintln!("[{}] {}", level.label(), message);
}

#[macro_export]
macro_rules! console_debug {
    ($($arg:tt)*) => {
        $crate::log::write($crate::log::Level::Debug, &format!($($arg)*))
    };
}

#[macro_export]
macro_rules! console_log {
    ($($arg:tt)*) => {
        $crate::log::write($crate::log::Level::Info, &format!($($arg)*))
    };
}

#[macro_export]
macro_rules! console_warn {
    ($($arg:tt)*) => {
        $crate::log::write($crate::log::Level::Warn, &format!($($arg)*))
    };
}

#[macro_export]
macro_rules! console_error {
    ($($arg:tt)*) => {
        $crate::log::write($crate::log::Level::Error, &format!($($arg)*))
    };
}
