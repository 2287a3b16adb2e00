// build.rs - TOML-driven compile-time limit generation
use std::env;
use std::fs;
use std::path::Path;

#[derive(serde::Deserialize)]
struct CompileTimeConfig {
    lexical: LexicalLimits,
    syntax: SyntaxLimits,
    evaluation: EvaluationLimits,
    batch: BatchLimits,
    logging: LoggingLimits,
}

#[derive(serde::Deserialize)]
struct LexicalLimits {
    max_identifier_length: usize,
    max_token_count: usize,
}

#[derive(serde::Deserialize)]
struct SyntaxLimits {
    default_max_nesting_depth: usize,
    hard_max_nesting_depth: usize,
}

#[derive(serde::Deserialize)]
struct EvaluationLimits {
    recommended_max_expression_length: usize,
}

#[derive(serde::Deserialize)]
struct BatchLimits {
    max_worker_threads: usize,
    max_entities_per_batch: usize,
}

#[derive(serde::Deserialize)]
struct LoggingLimits {
    max_log_message_length: usize,
    log_buffer_size: usize,
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=TAGF_BUILD_PROFILE");
    println!("cargo:rerun-if-env-changed=TAGF_CONFIG_DIR");

    let profile = env::var("TAGF_BUILD_PROFILE").unwrap_or_else(|_| "development".to_string());
    let config_dir = env::var("TAGF_CONFIG_DIR").unwrap_or_else(|_| "config".to_string());

    // Workspace root is the parent of the tag_filter directory
    let manifest_dir = env::var("CARGO_MANIFEST_DIR").unwrap();
    let workspace_root = Path::new(&manifest_dir)
        .parent()
        .expect("Could not find workspace root (parent directory)");

    let config_path = workspace_root
        .join(&config_dir)
        .join(format!("{}.toml", profile));

    println!("cargo:rerun-if-changed={}", config_path.display());

    if !config_path.exists() {
        panic!(
            "Configuration file not found: {}\nWorkspace root: {}\nLooking for: {}/{}/{}.toml",
            config_path.display(),
            workspace_root.display(),
            workspace_root.display(),
            config_dir,
            profile
        );
    }

    let config_content = fs::read_to_string(&config_path)
        .unwrap_or_else(|e| panic!("Failed to read {}: {}", config_path.display(), e));

    let config: CompileTimeConfig = toml::from_str(&config_content)
        .unwrap_or_else(|e| panic!("Invalid TOML in {}: {}", config_path.display(), e));

    validate_limits(&config, &profile);
    generate_constants(&config, &profile);
}

fn validate_limits(config: &CompileTimeConfig, profile: &str) {
    const ABSOLUTE_MAX_NESTING_DEPTH: usize = 4096;
    const ABSOLUTE_MAX_TOKEN_COUNT: usize = 1_000_000;

    if config.lexical.max_identifier_length == 0 {
        panic!("LIMITS: max_identifier_length cannot be zero");
    }

    if config.lexical.max_token_count == 0 {
        panic!("LIMITS: max_token_count cannot be zero");
    }

    if config.lexical.max_token_count > ABSOLUTE_MAX_TOKEN_COUNT {
        panic!("LIMITS: max_token_count exceeds absolute maximum");
    }

    if config.syntax.default_max_nesting_depth == 0 {
        panic!("LIMITS: default_max_nesting_depth cannot be zero");
    }

    if config.syntax.default_max_nesting_depth > config.syntax.hard_max_nesting_depth {
        panic!("LIMITS: default_max_nesting_depth exceeds hard_max_nesting_depth");
    }

    if config.syntax.hard_max_nesting_depth > ABSOLUTE_MAX_NESTING_DEPTH {
        panic!("LIMITS: hard_max_nesting_depth exceeds absolute maximum");
    }

    if config.batch.max_worker_threads == 0 {
        panic!("LIMITS: max_worker_threads cannot be zero");
    }

    if config.batch.max_entities_per_batch == 0 {
        panic!("LIMITS: max_entities_per_batch cannot be zero");
    }

    if config.logging.log_buffer_size == 0 {
        panic!("LIMITS: log_buffer_size cannot be zero");
    }

    if profile == "production" && config.syntax.hard_max_nesting_depth > 256 {
        panic!("PRODUCTION: hard_max_nesting_depth too high for production");
    }
}

fn generate_constants(config: &CompileTimeConfig, profile: &str) {
    let out_dir = env::var("OUT_DIR").unwrap();
    let output_path = Path::new(&out_dir).join("constants.rs");

    let constants_code = format!(
        r#"
// Generated compile-time constants from TOML configuration
// Profile: {}
// DO NOT EDIT - Generated by build.rs

pub mod compile_time {{
    pub mod lexical {{
        pub const MAX_IDENTIFIER_LENGTH: usize = {};
        pub const MAX_TOKEN_COUNT: usize = {};
    }}

    pub mod syntax {{
        pub const DEFAULT_MAX_NESTING_DEPTH: usize = {};
        pub const HARD_MAX_NESTING_DEPTH: usize = {};
    }}

    pub mod evaluation {{
        pub const RECOMMENDED_MAX_EXPRESSION_LENGTH: usize = {};
    }}

    pub mod batch {{
        pub const MAX_WORKER_THREADS: usize = {};
        pub const MAX_ENTITIES_PER_BATCH: usize = {};
    }}

    pub mod logging {{
        pub const MAX_LOG_MESSAGE_LENGTH: usize = {};
        pub const LOG_BUFFER_SIZE: usize = {};
    }}
}}
"#,
        profile,
        config.lexical.max_identifier_length,
        config.lexical.max_token_count,
        config.syntax.default_max_nesting_depth,
        config.syntax.hard_max_nesting_depth,
        config.evaluation.recommended_max_expression_length,
        config.batch.max_worker_threads,
        config.batch.max_entities_per_batch,
        config.logging.max_log_message_length,
        config.logging.log_buffer_size,
    );

    fs::write(output_path, constants_code).unwrap();
}
