//! Compilation pipeline: source -> tokens -> AST -> validated filter

mod cache;
mod compiled;
mod error;

pub use cache::FilterCache;
pub use compiled::CompiledFilter;
pub use error::FilterError;

use crate::config::compile_time::evaluation::RECOMMENDED_MAX_EXPRESSION_LENGTH;
use crate::config::runtime::ParserPreferences;
use crate::logging::codes;
use crate::{log_success, log_warning};
use std::time::Instant;

/// Compile with runtime parser preferences taken from the environment
pub fn compile(source: &str) -> Result<CompiledFilter, FilterError> {
    compile_with_options(source, &ParserPreferences::default())
}

pub fn compile_with_options(
    source: &str,
    preferences: &ParserPreferences,
) -> Result<CompiledFilter, FilterError> {
    let start_time = Instant::now();

    if source.chars().count() > RECOMMENDED_MAX_EXPRESSION_LENGTH {
        log_warning!(code = codes::warnings::EXPRESSION_TOO_LONG,
            "Filter expression exceeds recommended length",
            "length" => source.chars().count(),
            "recommended_max" => RECOMMENDED_MAX_EXPRESSION_LENGTH
        );
    }

    let (tokens, lexical_metrics) = crate::lexical::tokenize_with_metrics(source)?;
    let expression = crate::syntax::parse_with_options(&tokens, preferences)?;
    crate::validation::validate_with_limit(&expression, preferences.max_nesting_depth)?;

    let filter = CompiledFilter::new(source.to_string(), expression);

    log_success!(codes::success::FILTER_COMPILED, "Filter compiled",
        "tokens" => lexical_metrics.total_tokens,
        "nodes" => filter.metrics().node_count,
        "duration_ms" => start_time.elapsed().as_secs_f64() * 1000.0
    );

    Ok(filter)
}
