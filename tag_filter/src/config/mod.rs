//! Configuration module for the tag filter engine
//! Automatically uses generated constants from TOML configuration

// Include generated constants from build.rs
// This file is generated at compile time from config/<profile>.toml
include!(concat!(env!("OUT_DIR"), "/constants.rs"));

pub mod runtime;

pub use runtime::{
    BatchPreferences, ConfigError, LogLevel, LoggingPreferences, ParserPreferences, RuntimeConfig,
};

/// Build information and configuration metadata
pub mod build_info {
    /// Returns the configuration profile used during build
    pub fn profile() -> &'static str {
        option_env!("TAGF_BUILD_PROFILE").unwrap_or("development")
    }

    /// Returns the configuration directory used during build
    pub fn config_dir() -> &'static str {
        option_env!("TAGF_CONFIG_DIR").unwrap_or("config")
    }

    /// Returns configuration source information
    pub fn source_info() -> String {
        format!("Generated from {}/{}.toml", config_dir(), profile())
    }
}

#[cfg(test)]
mod tests {
    use super::compile_time::*;

    #[test]
    fn test_compile_time_constants_exist() {
        assert!(lexical::MAX_IDENTIFIER_LENGTH > 0);
        assert!(lexical::MAX_TOKEN_COUNT > 0);
        assert!(syntax::DEFAULT_MAX_NESTING_DEPTH > 0);
        assert!(syntax::DEFAULT_MAX_NESTING_DEPTH <= syntax::HARD_MAX_NESTING_DEPTH);
        assert!(batch::MAX_WORKER_THREADS > 0);
        assert!(logging::MAX_LOG_MESSAGE_LENGTH > 0);
    }

    #[test]
    fn test_source_info() {
        assert!(super::build_info::source_info().ends_with(".toml"));
    }
}
