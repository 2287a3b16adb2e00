//! Type-safe logging macros using Code types with Display support
//!
//! Context values accept any `Display` type: `"key" => value`.

/// Log error with Code type
#[macro_export]
macro_rules! log_error {
    ($code:expr, $message:expr, offset = $offset:expr) => {
        $crate::logging::log_error_with_context($code, $message, Some($offset), vec![])
    };

    ($code:expr, $message:expr, offset = $offset:expr, $($key:expr => $value:expr),+) => {
        $crate::logging::log_error_with_context(
            $code,
            $message,
            Some($offset),
            vec![$(($key, format!("{}", $value))),+],
        )
    };

    ($code:expr, $message:expr) => {
        $crate::logging::log_error_with_context($code, $message, None, vec![])
    };

    ($code:expr, $message:expr, $($key:expr => $value:expr),+) => {
        $crate::logging::log_error_with_context(
            $code,
            $message,
            None,
            vec![$(($key, format!("{}", $value))),+],
        )
    };
}

/// Log success with Code type
#[macro_export]
macro_rules! log_success {
    ($code:expr, $message:expr) => {
        $crate::logging::emit_with_context($crate::logging::LogEvent::success($code, $message), vec![])
    };

    ($code:expr, $message:expr, $($key:expr => $value:expr),+) => {
        $crate::logging::emit_with_context(
            $crate::logging::LogEvent::success($code, $message),
            vec![$(($key, format!("{}", $value))),+],
        )
    };
}

/// Log informational message
#[macro_export]
macro_rules! log_info {
    ($message:expr) => {
        $crate::logging::emit_with_context($crate::logging::LogEvent::info($message), vec![])
    };

    ($message:expr, $($key:expr => $value:expr),+) => {
        $crate::logging::emit_with_context(
            $crate::logging::LogEvent::info($message),
            vec![$(($key, format!("{}", $value))),+],
        )
    };
}

/// Log warning message, optionally with a specific code
#[macro_export]
macro_rules! log_warning {
    (code = $code:expr, $message:expr) => {
        $crate::logging::emit_with_context(
            $crate::logging::LogEvent::warning_with_code($code, $message),
            vec![],
        )
    };

    (code = $code:expr, $message:expr, $($key:expr => $value:expr),+) => {
        $crate::logging::emit_with_context(
            $crate::logging::LogEvent::warning_with_code($code, $message),
            vec![$(($key, format!("{}", $value))),+],
        )
    };

    ($message:expr) => {
        $crate::logging::emit_with_context($crate::logging::LogEvent::warning($message), vec![])
    };

    ($message:expr, $($key:expr => $value:expr),+) => {
        $crate::logging::emit_with_context(
            $crate::logging::LogEvent::warning($message),
            vec![$(($key, format!("{}", $value))),+],
        )
    };
}

/// Log debug message; context is only formatted when debug output is enabled
#[macro_export]
macro_rules! log_debug {
    (code = $code:expr, $message:expr, $($key:expr => $value:expr),+) => {
        if $crate::logging::is_enabled($crate::logging::LogLevel::Debug) {
            $crate::logging::emit_with_context(
                $crate::logging::LogEvent::debug_with_code($code, $message),
                vec![$(($key, format!("{}", $value))),+],
            )
        }
    };

    ($message:expr) => {
        if $crate::logging::is_enabled($crate::logging::LogLevel::Debug) {
            $crate::logging::emit_with_context($crate::logging::LogEvent::debug($message), vec![])
        }
    };

    ($message:expr, $($key:expr => $value:expr),+) => {
        if $crate::logging::is_enabled($crate::logging::LogLevel::Debug) {
            $crate::logging::emit_with_context(
                $crate::logging::LogEvent::debug($message),
                vec![$(($key, format!("{}", $value))),+],
            )
        }
    };
}
