//! Consolidated error codes and classification system
//!
//! Single source of truth for all error codes, their metadata, and classification functions.
//! Code ranges: E02x lexical, E04x/E05x syntax, E06x validation, E07x evaluation, E08x batch.

use std::collections::HashMap;
use std::sync::OnceLock;

// ============================================================================
// CODE WRAPPER TYPE
// ============================================================================

/// Universal code wrapper for both error and success codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Code(&'static str);

impl Code {
    pub const fn new(code: &'static str) -> Self {
        Self(code)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl std::fmt::Display for Code {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// ERROR CLASSIFICATION TYPES
// ============================================================================

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Critical = 0,
    High = 1,
    Medium = 2,
    Low = 3,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "Critical",
            Severity::High => "High",
            Severity::Medium => "Medium",
            Severity::Low => "Low",
        }
    }
}

/// Complete metadata for an error code
#[derive(Debug, Clone)]
pub struct ErrorMetadata {
    pub code: &'static str,
    pub category: &'static str,
    pub severity: Severity,
    pub recoverable: bool,
    pub description: &'static str,
    pub recommended_action: &'static str,
}

impl ErrorMetadata {
    pub fn new(
        code: &'static str,
        category: &'static str,
        severity: Severity,
        recoverable: bool,
        description: &'static str,
        recommended_action: &'static str,
    ) -> Self {
        Self {
            code,
            category,
            severity,
            recoverable,
            description,
            recommended_action,
        }
    }
}

// ============================================================================
// ERROR CODE CONSTANTS
// ============================================================================

/// System error codes
pub mod system {
    use super::Code;

    pub const INTERNAL_ERROR: Code = Code::new("ERR001");
    pub const INITIALIZATION_FAILURE: Code = Code::new("ERR002");
    pub const CONFIGURATION_ERROR: Code = Code::new("ERR004");
}

/// Lexical analysis error codes
pub mod lexical {
    use super::Code;

    pub const UNEXPECTED_CHARACTER: Code = Code::new("E020");
    pub const INVALID_NUMBER: Code = Code::new("E022");
    pub const IDENTIFIER_TOO_LONG: Code = Code::new("E023");
    pub const TOO_MANY_TOKENS: Code = Code::new("E027");
}

/// Syntax analysis error codes
pub mod syntax {
    use super::Code;

    pub const EMPTY_EXPRESSION: Code = Code::new("E041");
    pub const UNBALANCED_PARENS: Code = Code::new("E042");
    pub const TRAILING_TOKENS: Code = Code::new("E043");
    pub const INVALID_COMPARISON_OPERAND: Code = Code::new("E044");
    pub const UNEXPECTED_TOKEN: Code = Code::new("E050");
    pub const NESTING_TOO_DEEP: Code = Code::new("E051");
}

/// Static validation error codes
pub mod validation {
    use super::Code;

    pub const EMPTY_TAG_PATH: Code = Code::new("E060");
    pub const NON_FINITE_COMPARISON_OPERAND: Code = Code::new("E061");
    pub const INVALID_TAG_SEGMENT: Code = Code::new("E062");
    pub const NESTING_TOO_DEEP: Code = Code::new("E063");
}

/// Evaluation error codes
pub mod evaluation {
    use super::Code;

    pub const NON_NUMERIC_TAG_VALUE: Code = Code::new("E070");
}

/// Batch membership error codes
pub mod batch {
    use super::Code;

    pub const TOO_MANY_ENTITIES: Code = Code::new("E080");
    pub const WORKER_FAILURE: Code = Code::new("E081");
    pub const ENTITY_EVALUATION_FAILED: Code = Code::new("E082");
}

/// Warning codes
pub mod warnings {
    use super::Code;

    pub const EXPRESSION_TOO_LONG: Code = Code::new("W010");
    pub const UNKNOWN_ENTITY: Code = Code::new("W011");
}

// ============================================================================
// SUCCESS CODE CONSTANTS
// ============================================================================

/// Success codes
pub mod success {
    use super::Code;

    pub const SYSTEM_INITIALIZATION_COMPLETED: Code = Code::new("I004");
    pub const TOKENIZATION_COMPLETE: Code = Code::new("I020");
    pub const PARSE_COMPLETE: Code = Code::new("I040");
    pub const VALIDATION_PASSED: Code = Code::new("I060");
    pub const FILTER_COMPILED: Code = Code::new("I061");
    pub const BATCH_EVALUATION_COMPLETE: Code = Code::new("I080");
}

// ============================================================================
// ERROR METADATA REGISTRY
// ============================================================================

/// Error metadata registry using OnceLock for thread safety
static ERROR_REGISTRY: OnceLock<HashMap<&'static str, ErrorMetadata>> = OnceLock::new();

/// Initialize and get the error registry
fn get_error_registry() -> &'static HashMap<&'static str, ErrorMetadata> {
    ERROR_REGISTRY.get_or_init(|| {
        let entries = [
            // System errors
            ErrorMetadata::new(
                "ERR001",
                "System",
                Severity::Critical,
                false,
                "Critical internal error",
                "File a bug report with the failing expression",
            ),
            ErrorMetadata::new(
                "ERR002",
                "System",
                Severity::Critical,
                false,
                "System initialization failure",
                "Check logging configuration and environment",
            ),
            ErrorMetadata::new(
                "ERR004",
                "System",
                Severity::High,
                true,
                "Runtime configuration could not be loaded",
                "Fix the configuration file or TAGF_* environment variables",
            ),
            // Lexical errors
            ErrorMetadata::new(
                "E020",
                "Lexical",
                Severity::Medium,
                false,
                "Character outside the filter alphabet",
                "Use only letters, digits, '_', '-', '.', parentheses and whitespace",
            ),
            ErrorMetadata::new(
                "E022",
                "Lexical",
                Severity::Low,
                false,
                "Number literal is malformed",
                "Write numbers as digits with an optional single decimal part",
            ),
            ErrorMetadata::new(
                "E023",
                "Lexical",
                Severity::Low,
                false,
                "Identifier exceeds maximum allowed length",
                "Shorten the tag key or value",
            ),
            ErrorMetadata::new(
                "E027",
                "Lexical",
                Severity::High,
                false,
                "Expression contains too many tokens",
                "Split the filter into smaller groups",
            ),
            // Syntax errors
            ErrorMetadata::new(
                "E041",
                "Syntax",
                Severity::Medium,
                false,
                "Expression is empty",
                "Provide at least one tag predicate",
            ),
            ErrorMetadata::new(
                "E042",
                "Syntax",
                Severity::Medium,
                false,
                "Parentheses are not balanced",
                "Add the missing '(' or ')'",
            ),
            ErrorMetadata::new(
                "E043",
                "Syntax",
                Severity::Medium,
                false,
                "Tokens remain after a complete expression",
                "Join the extra terms with 'and' or 'or'",
            ),
            ErrorMetadata::new(
                "E044",
                "Syntax",
                Severity::Medium,
                false,
                "Comparison keyword is not followed by exactly one number",
                "Write comparisons as tag.<key>.gt.<number>",
            ),
            ErrorMetadata::new(
                "E050",
                "Syntax",
                Severity::Medium,
                false,
                "Unexpected token during parsing",
                "Check operator placement and predicate spelling",
            ),
            ErrorMetadata::new(
                "E051",
                "Syntax",
                Severity::High,
                false,
                "Nesting depth limit exceeded",
                "Reduce parentheses and stacked 'not' operators",
            ),
            // Validation errors
            ErrorMetadata::new(
                "E060",
                "Validation",
                Severity::Medium,
                false,
                "Tag path has no segments",
                "Rebuild the expression from source text",
            ),
            ErrorMetadata::new(
                "E061",
                "Validation",
                Severity::Medium,
                false,
                "Comparison operand is not a finite number",
                "Use a finite numeric operand",
            ),
            ErrorMetadata::new(
                "E062",
                "Validation",
                Severity::Medium,
                false,
                "Tag path segment is empty or contains invalid characters",
                "Rebuild the expression from source text",
            ),
            ErrorMetadata::new(
                "E063",
                "Validation",
                Severity::High,
                false,
                "Expression tree is nested too deeply",
                "Reduce nesting of groups and negations",
            ),
            // Evaluation errors
            ErrorMetadata::new(
                "E070",
                "Evaluation",
                Severity::Low,
                true,
                "Tag value used in a comparison is not numeric",
                "Correct the tag data or choose the no-match policy",
            ),
            // Batch errors
            ErrorMetadata::new(
                "E080",
                "Batch",
                Severity::High,
                false,
                "Batch exceeds the maximum number of entities",
                "Split the batch into smaller requests",
            ),
            ErrorMetadata::new(
                "E081",
                "Batch",
                Severity::Critical,
                false,
                "Batch worker thread failed",
                "File a bug report with the batch input",
            ),
            ErrorMetadata::new(
                "E082",
                "Batch",
                Severity::Low,
                true,
                "Membership could not be decided for an entity",
                "Inspect the entity's tag values",
            ),
            // Success codes
            ErrorMetadata::new(
                "I004",
                "System",
                Severity::Low,
                true,
                "System initialization completed successfully",
                "Continue normal operation",
            ),
            ErrorMetadata::new(
                "I061",
                "Pipeline",
                Severity::Low,
                true,
                "Filter compiled successfully",
                "Filter is ready for evaluation",
            ),
            ErrorMetadata::new(
                "I080",
                "Batch",
                Severity::Low,
                true,
                "Batch membership evaluation completed",
                "Continue normal operation",
            ),
        ];

        entries
            .into_iter()
            .map(|metadata| (metadata.code, metadata))
            .collect()
    })
}

// ============================================================================
// CLASSIFICATION FUNCTIONS
// ============================================================================

/// Get error metadata for a specific error code
pub fn get_error_metadata(code: &str) -> Option<&'static ErrorMetadata> {
    get_error_registry().get(code)
}

/// Get error severity from error code
pub fn get_severity(code: &str) -> Severity {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.severity)
        .unwrap_or(Severity::Medium)
}

/// Check if error is recoverable
pub fn is_recoverable(code: &str) -> bool {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.recoverable)
        .unwrap_or(true)
}

/// Get human-readable description for error code
pub fn get_description(code: &str) -> &'static str {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.description)
        .unwrap_or("Unknown error")
}

/// Get recommended action for error code
pub fn get_action(code: &str) -> &'static str {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.recommended_action)
        .unwrap_or("No specific action available")
}

/// Get error category from error code
pub fn get_category(code: &str) -> &'static str {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.category)
        .unwrap_or("Unknown")
}
