//! Event system for tag filter logging

use super::codes::Code;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// Log severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Error = 0,
    Warning = 1,
    Info = 2,
    Debug = 3,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warning => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
        }
    }
}

/// Core log event structure
#[derive(Debug, Clone)]
pub struct LogEvent {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub code: Code,
    pub message: String,
    /// Byte offset into the filter expression, when the event concerns one
    pub offset: Option<usize>,
    pub context: BTreeMap<String, String>,
}

impl LogEvent {
    fn new(level: LogLevel, code: Code, message: &str) -> Self {
        Self {
            timestamp: Utc::now(),
            level,
            code,
            message: truncate_message(message),
            offset: None,
            context: BTreeMap::new(),
        }
    }

    /// Create a new error event
    pub fn error(error_code: Code, message: &str) -> Self {
        Self::new(LogLevel::Error, error_code, message)
    }

    /// Create a new warning event (warnings may not have codes)
    pub fn warning(message: &str) -> Self {
        Self::new(LogLevel::Warning, Code::new("W000"), message)
    }

    /// Create warning with specific code
    pub fn warning_with_code(warning_code: Code, message: &str) -> Self {
        Self::new(LogLevel::Warning, warning_code, message)
    }

    /// Create a new info event
    pub fn info(message: &str) -> Self {
        Self::new(LogLevel::Info, Code::new("I000"), message)
    }

    /// Create a success event (info with success code)
    pub fn success(success_code: Code, message: &str) -> Self {
        Self::new(LogLevel::Info, success_code, message)
    }

    /// Create a debug event
    pub fn debug(message: &str) -> Self {
        Self::new(LogLevel::Debug, Code::new("D000"), message)
    }

    /// Create debug with specific code
    pub fn debug_with_code(debug_code: Code, message: &str) -> Self {
        Self::new(LogLevel::Debug, debug_code, message)
    }

    /// Add source offset information
    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Add context data
    pub fn with_context(mut self, key: &str, value: &str) -> Self {
        self.context.insert(key.to_string(), value.to_string());
        self
    }

    pub fn is_error(&self) -> bool {
        self.level == LogLevel::Error
    }

    pub fn is_warning(&self) -> bool {
        self.level == LogLevel::Warning
    }

    pub fn is_info(&self) -> bool {
        self.level == LogLevel::Info
    }

    /// Get severity from error code
    pub fn severity(&self) -> &'static str {
        super::codes::get_severity(self.code.as_str()).as_str()
    }

    /// Get error category
    pub fn category(&self) -> &'static str {
        super::codes::get_category(self.code.as_str())
    }

    /// Get error description
    pub fn description(&self) -> &'static str {
        super::codes::get_description(self.code.as_str())
    }

    /// Get recommended action
    pub fn recommended_action(&self) -> &'static str {
        super::codes::get_action(self.code.as_str())
    }

    /// Check if error is recoverable
    pub fn is_recoverable(&self) -> bool {
        super::codes::is_recoverable(self.code.as_str())
    }

    /// Format for display
    pub fn format(&self) -> String {
        let offset_str = self
            .offset
            .map(|offset| format!(" at offset {}", offset))
            .unwrap_or_default();

        let context_str = if self.context.is_empty() {
            String::new()
        } else {
            let pairs: Vec<String> = self
                .context
                .iter()
                .map(|(key, value)| format!("{}={}", key, value))
                .collect();
            format!(" ({})", pairs.join(", "))
        };

        format!(
            "[{}] {} - {}{}{}",
            self.level.as_str(),
            self.code.as_str(),
            self.message,
            offset_str,
            context_str
        )
    }

    /// Format as JSON for structured logging
    pub fn format_json(&self) -> Result<String, serde_json::Error> {
        let mut json = serde_json::json!({
            "timestamp": self.timestamp.to_rfc3339(),
            "level": self.level.as_str(),
            "code": self.code.as_str(),
            "message": self.message,
            "category": self.category(),
            "severity": self.severity(),
        });

        if self.is_error() {
            json["error_metadata"] = serde_json::json!({
                "recoverable": self.is_recoverable(),
                "description": self.description(),
                "recommended_action": self.recommended_action(),
            });
        }

        if let Some(offset) = self.offset {
            json["offset"] = serde_json::json!(offset);
        }

        if !self.context.is_empty() {
            json["context"] = serde_json::to_value(&self.context)?;
        }

        serde_json::to_string(&json)
    }
}

fn truncate_message(message: &str) -> String {
    let max = super::config::get_max_log_message_length();
    if message.len() <= max {
        return message.to_string();
    }

    let mut end = max;
    while !message.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &message[..end])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::codes;

    #[test]
    fn test_error_event_creation() {
        let event = LogEvent::error(codes::syntax::UNBALANCED_PARENS, "Unbalanced parentheses");

        assert!(event.is_error());
        assert_eq!(event.code.as_str(), "E042");
        assert_eq!(event.category(), "Syntax");
        assert!(!event.is_recoverable());
    }

    #[test]
    fn test_success_event_creation() {
        let event = LogEvent::success(codes::success::FILTER_COMPILED, "Filter compiled");

        assert!(event.is_info());
        assert_eq!(event.code.as_str(), "I061");
    }

    #[test]
    fn test_event_formatting() {
        let event = LogEvent::error(codes::lexical::UNEXPECTED_CHARACTER, "Unexpected '$'")
            .with_offset(7)
            .with_context("char", "$");
        let formatted = event.format();

        assert!(formatted.starts_with("[ERROR] E020 - Unexpected '$'"));
        assert!(formatted.contains("at offset 7"));
        assert!(formatted.contains("char=$"));
    }

    #[test]
    fn test_json_formatting() {
        let event = LogEvent::warning_with_code(codes::warnings::UNKNOWN_ENTITY, "Unknown entity")
            .with_context("entity", "host-1");

        let json = event.format_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["level"], "WARN");
        assert_eq!(value["code"], "W011");
        assert_eq!(value["context"]["entity"], "host-1");
        assert!(value.get("error_metadata").is_none());
    }

    #[test]
    fn test_error_json_carries_metadata() {
        let event = LogEvent::error(codes::evaluation::NON_NUMERIC_TAG_VALUE, "bad value")
            .with_offset(3);

        let value: serde_json::Value = serde_json::from_str(&event.format_json().unwrap()).unwrap();
        assert_eq!(value["offset"], 3);
        assert_eq!(value["error_metadata"]["recoverable"], true);
    }

    #[test]
    fn test_long_messages_are_truncated() {
        let long = "x".repeat(crate::config::compile_time::logging::MAX_LOG_MESSAGE_LENGTH + 10);
        let event = LogEvent::info(&long);
        assert!(event.message.ends_with("..."));
        assert!(event.message.len() < long.len());
    }
}
