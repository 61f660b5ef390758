//! Lightweight, configurable logging for the storefs workspace.
//!
//! Usage:
//! - Set STOREFS_LOG=off (default) - no logs
//! - Set STOREFS_LOG=info - basic operation logs
//! - Set STOREFS_LOG=debug - detailed diagnostic logs

use std::sync::Once;

// Re-export emit so macros can use it
pub use emit;

static INIT: Once = Once::new();

/// Initialize diagnostics based on the STOREFS_LOG environment variable.
///
/// Safe to call multiple times - subsequent calls are ignored.
pub fn init_diagnostics() {
    INIT.call_once(|| {
        let log_level = std::env::var("STOREFS_LOG").unwrap_or_else(|_| "off".to_string());

        let rt = match log_level.as_str() {
            "off" => return,
            "debug" => emit::setup()
                .emit_to(emit_term::stderr())
                .emit_when(emit::level::min_filter(emit::Level::Debug))
                .init(),
            "info" => emit::setup()
                .emit_to(emit_term::stderr())
                .emit_when(emit::level::min_filter(emit::Level::Info))
                .init(),
            "warn" => emit::setup()
                .emit_to(emit_term::stderr())
                .emit_when(emit::level::min_filter(emit::Level::Warn))
                .init(),
            "error" => emit::setup()
                .emit_to(emit_term::stderr())
                .emit_when(emit::level::min_filter(emit::Level::Error))
                .init(),
            _ => {
                let rt = emit::setup()
                    .emit_to(emit_term::stderr())
                    .emit_when(emit::level::min_filter(emit::Level::Info))
                    .init();
                eprintln!(
                    "Warning: Unknown STOREFS_LOG value '{}', using 'info'",
                    log_level
                );
                rt
            }
        };

        std::mem::forget(rt);
    });
}

/// Log basic operations (reloads, writes, renames, etc.)
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        $crate::emit::info!($($arg)*)
    };
}

/// Log detailed diagnostics (page counts, skipped entries, internal state, etc.)
#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {
        $crate::emit::debug!($($arg)*)
    };
}

/// Log warning conditions (fallbacks, ignored best-effort failures)
#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        $crate::emit::warn!($($arg)*)
    };
}

/// Log critical error conditions (remote failures, inconsistency windows)
#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {
        $crate::emit::error!($($arg)*)
    };
}

/// Re-export the init function for convenience
pub use init_diagnostics as init;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_is_safe_to_call_multiple_times() {
        init_diagnostics();
        init_diagnostics();
        init_diagnostics();
    }

    #[test]
    fn test_macros_compile() {
        log_info!("Test message");
        log_debug!("Debug message with {value}", value: 42);
        log_warn!("Warning message");
        log_error!("Error message");
    }
}
