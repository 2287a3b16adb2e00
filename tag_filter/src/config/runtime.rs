// RUNTIME PREFERENCES (User Experience)

use crate::config::compile_time::{batch, syntax};
use crate::membership::NonNumericPolicy;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

/// Runtime configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read configuration file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

impl ConfigError {
    pub fn error_code(&self) -> crate::logging::Code {
        crate::logging::codes::system::CONFIGURATION_ERROR
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserPreferences {
    /// Maximum nesting of parentheses and `not` operators (clamped to the hard limit)
    pub max_nesting_depth: usize,
}

impl Default for ParserPreferences {
    fn default() -> Self {
        Self {
            max_nesting_depth: env::var(env_vars::MAX_NESTING_DEPTH)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(syntax::DEFAULT_MAX_NESTING_DEPTH)
                .clamp(1, syntax::HARD_MAX_NESTING_DEPTH),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingPreferences {
    /// Whether to use structured JSON logging
    pub use_structured_logging: bool,

    /// Minimum level that reaches the configured logger
    pub min_log_level: LogLevel,
}

impl Default for LoggingPreferences {
    fn default() -> Self {
        Self {
            use_structured_logging: env::var(env_vars::LOG_STRUCTURED)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            min_log_level: env::var(env_vars::LOG_LEVEL)
                .ok()
                .and_then(|v| parse_log_level(&v))
                .unwrap_or(LogLevel::Warning),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchPreferences {
    /// Worker threads used for batch membership evaluation
    pub max_threads: usize,

    /// How a non-numeric tag value in a comparison is treated
    pub non_numeric_policy: NonNumericPolicy,
}

impl Default for BatchPreferences {
    fn default() -> Self {
        let available = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(4);

        Self {
            max_threads: env::var(env_vars::BATCH_THREADS)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(available)
                .clamp(1, batch::MAX_WORKER_THREADS),
            non_numeric_policy: env::var(env_vars::NON_NUMERIC_POLICY)
                .ok()
                .and_then(|v| parse_non_numeric_policy(&v))
                .unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error = 0,
    #[serde(alias = "warn")]
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

    /// Convert to events::LogLevel
    pub fn to_events_log_level(&self) -> crate::logging::events::LogLevel {
        match self {
            LogLevel::Error => crate::logging::events::LogLevel::Error,
            LogLevel::Warning => crate::logging::events::LogLevel::Warning,
            LogLevel::Info => crate::logging::events::LogLevel::Info,
            LogLevel::Debug => crate::logging::events::LogLevel::Debug,
        }
    }
}

/// Parse log level from string (used for environment variables and CLI flags)
pub fn parse_log_level(level: &str) -> Option<LogLevel> {
    match level.to_lowercase().as_str() {
        "error" | "0" => Some(LogLevel::Error),
        "warning" | "warn" | "1" => Some(LogLevel::Warning),
        "info" | "2" => Some(LogLevel::Info),
        "debug" | "3" => Some(LogLevel::Debug),
        _ => None,
    }
}

fn parse_non_numeric_policy(policy: &str) -> Option<NonNumericPolicy> {
    match policy.to_lowercase().as_str() {
        "no_match" | "nomatch" | "false" => Some(NonNumericPolicy::NoMatch),
        "error" | "strict" => Some(NonNumericPolicy::Error),
        _ => None,
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub parser: ParserPreferences,
    pub logging: LoggingPreferences,
    pub batch: BatchPreferences,
}

impl RuntimeConfig {
    /// Load preferences from TOML text; missing sections and keys keep their defaults
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: RuntimeConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load preferences from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Check preferences against the compile-time limits
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.parser.max_nesting_depth == 0
            || self.parser.max_nesting_depth > syntax::HARD_MAX_NESTING_DEPTH
        {
            return Err(ConfigError::InvalidValue {
                key: "parser.max_nesting_depth".to_string(),
                message: format!("must be between 1 and {}", syntax::HARD_MAX_NESTING_DEPTH),
            });
        }

        if self.batch.max_threads == 0 || self.batch.max_threads > batch::MAX_WORKER_THREADS {
            return Err(ConfigError::InvalidValue {
                key: "batch.max_threads".to_string(),
                message: format!("must be between 1 and {}", batch::MAX_WORKER_THREADS),
            });
        }

        Ok(())
    }
}

/// Environment variable names for configuration
pub mod env_vars {
    // Parser
    pub const MAX_NESTING_DEPTH: &str = "TAGF_MAX_NESTING_DEPTH";

    // Logging
    pub const LOG_LEVEL: &str = "TAGF_LOG_LEVEL";
    pub const LOG_STRUCTURED: &str = "TAGF_LOG_STRUCTURED";

    // Batch
    pub const BATCH_THREADS: &str = "TAGF_BATCH_THREADS";
    pub const NON_NUMERIC_POLICY: &str = "TAGF_NON_NUMERIC_POLICY";
}
