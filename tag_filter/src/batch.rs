//! Batch membership evaluation
//!
//! Evaluates one dynamic group against many entities. Entities are split
//! into contiguous chunks, one per scoped worker thread; every worker reads
//! the same compiled filter by reference, so nothing is locked. Results are
//! merged back in input order.

use crate::config::compile_time::batch::{MAX_ENTITIES_PER_BATCH, MAX_WORKER_THREADS};
use crate::config::runtime::BatchPreferences;
use crate::evaluation::EvalError;
use crate::logging::codes;
use crate::membership::{DynamicGroup, MembershipDecision, NonNumericPolicy, TagContextProvider};
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

// ============================================================================
// BATCH TYPES
// ============================================================================

#[derive(Debug, Clone)]
pub struct BatchConfig {
    pub max_threads: usize,
    /// Stop at the first entity whose evaluation fails
    pub fail_fast: bool,
    pub max_entities: usize,
    pub policy: NonNumericPolicy,
}

impl BatchConfig {
    pub fn from_preferences(preferences: &BatchPreferences) -> Self {
        Self {
            max_threads: preferences.max_threads.clamp(1, MAX_WORKER_THREADS),
            fail_fast: false,
            max_entities: MAX_ENTITIES_PER_BATCH,
            policy: preferences.non_numeric_policy,
        }
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self::from_preferences(&BatchPreferences::default())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EntityError {
    pub entity: String,
    pub error: EvalError,
}

#[derive(Debug, Clone)]
pub struct BatchResults {
    pub group: String,
    pub members: Vec<String>,
    pub non_members: Vec<String>,
    pub errors: Vec<EntityError>,
    /// Entities the provider had no tags for (evaluated with an empty context)
    pub unknown_entities: Vec<String>,
    pub entities_submitted: usize,
    pub evaluated_at: DateTime<Utc>,
    pub duration: Duration,
    /// Set when fail-fast stopped the batch before every entity was reported
    pub stopped_early: bool,
}

impl BatchResults {
    fn new(group: &str, entities_submitted: usize) -> Self {
        Self {
            group: group.to_string(),
            members: Vec::new(),
            non_members: Vec::new(),
            errors: Vec::new(),
            unknown_entities: Vec::new(),
            entities_submitted,
            evaluated_at: Utc::now(),
            duration: Duration::ZERO,
            stopped_early: false,
        }
    }

    pub fn entities_evaluated(&self) -> usize {
        self.members.len() + self.non_members.len() + self.errors.len()
    }

    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    pub fn is_member(&self, entity: &str) -> bool {
        self.members.iter().any(|m| m == entity)
    }

    fn record(&mut self, outcome: Outcome) {
        if !outcome.known {
            self.unknown_entities.push(outcome.entity.clone());
        }
        match outcome.decision {
            MembershipDecision::Member => self.members.push(outcome.entity),
            MembershipDecision::NotMember => self.non_members.push(outcome.entity),
            MembershipDecision::Error(error) => self.errors.push(EntityError {
                entity: outcome.entity,
                error,
            }),
        }
    }

    pub fn summary(&self) -> String {
        format!(
            "Group '{}': {} evaluated, {} members, {} non-members, {} errors, {:.2}ms",
            self.group,
            self.entities_evaluated(),
            self.members.len(),
            self.non_members.len(),
            self.errors.len(),
            self.duration.as_secs_f64() * 1000.0
        )
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error("Too many entities in batch: {count} (max: {max})")]
    TooManyEntities { count: usize, max: usize },

    #[error("Worker thread failed: {message}")]
    WorkerFailure { message: String },
}

impl BatchError {
    pub fn error_code(&self) -> crate::logging::Code {
        match self {
            Self::TooManyEntities { .. } => codes::batch::TOO_MANY_ENTITIES,
            Self::WorkerFailure { .. } => codes::batch::WORKER_FAILURE,
        }
    }
}

/// Decision for one entity, tagged with whether the provider knew it
#[derive(Debug)]
struct Outcome {
    entity: String,
    known: bool,
    decision: MembershipDecision,
}

// ============================================================================
// BATCH EVALUATION
// ============================================================================

/// Evaluate `group` for each entity in `entities`, preserving input order
pub fn evaluate_members<P, S>(
    group: &DynamicGroup,
    provider: &P,
    entities: &[S],
    config: &BatchConfig,
) -> Result<BatchResults, BatchError>
where
    P: TagContextProvider + ?Sized,
    S: AsRef<str> + Sync,
{
    let start_time = Instant::now();
    let max_entities = config.max_entities.min(MAX_ENTITIES_PER_BATCH);

    if entities.len() > max_entities {
        let error = BatchError::TooManyEntities {
            count: entities.len(),
            max: max_entities,
        };
        crate::log_error!(error.error_code(), &error.to_string());
        return Err(error);
    }

    let threads = config.max_threads.clamp(1, MAX_WORKER_THREADS);
    crate::log_info!("Starting batch membership evaluation",
        "group" => group.name(),
        "entities" => entities.len(),
        "threads" => threads
    );

    let mut results = BatchResults::new(group.name(), entities.len());
    let chunks = if entities.is_empty() {
        Vec::new()
    } else if threads == 1 {
        vec![evaluate_chunk(group, provider, entities, config, &AtomicBool::new(false))]
    } else {
        evaluate_parallel(group, provider, entities, config, threads)?
    };

    'merge: for chunk in chunks {
        for outcome in chunk {
            let failed = outcome.decision.is_error();
            results.record(outcome);
            if failed && config.fail_fast {
                results.stopped_early = results.entities_evaluated() < entities.len();
                break 'merge;
            }
        }
    }

    results.duration = start_time.elapsed();

    crate::log_success!(codes::success::BATCH_EVALUATION_COMPLETE,
        "Batch membership evaluation completed",
        "group" => group.name(),
        "members" => results.members.len(),
        "non_members" => results.non_members.len(),
        "errors" => results.errors.len(),
        "duration_ms" => format!("{:.2}", results.duration.as_secs_f64() * 1000.0)
    );

    Ok(results)
}

/// Evaluate every entity the provider can enumerate
pub fn evaluate_known_entities<P>(
    group: &DynamicGroup,
    provider: &P,
    config: &BatchConfig,
) -> Result<BatchResults, BatchError>
where
    P: TagContextProvider + ?Sized,
{
    let entities = provider.entities();
    evaluate_members(group, provider, &entities, config)
}

fn evaluate_parallel<P, S>(
    group: &DynamicGroup,
    provider: &P,
    entities: &[S],
    config: &BatchConfig,
    threads: usize,
) -> Result<Vec<Vec<Outcome>>, BatchError>
where
    P: TagContextProvider + ?Sized,
    S: AsRef<str> + Sync,
{
    let chunk_size = calculate_chunk_size(entities.len(), threads);
    let stop = AtomicBool::new(false);

    crate::log_debug!("Parallel batch configuration",
        "entities" => entities.len(),
        "chunk_size" => chunk_size,
        "threads" => threads
    );

    thread::scope(|scope| {
        let handles: Vec<_> = entities
            .chunks(chunk_size)
            .map(|chunk| {
                let stop = &stop;
                scope.spawn(move || evaluate_chunk(group, provider, chunk, config, stop))
            })
            .collect();

        // Joined in spawn order, which is input order
        handles
            .into_iter()
            .map(|handle| {
                handle.join().map_err(|_| {
                    let error = BatchError::WorkerFailure {
                        message: "worker thread panicked during evaluation".to_string(),
                    };
                    crate::log_error!(error.error_code(), &error.to_string());
                    error
                })
            })
            .collect()
    })
}

fn evaluate_chunk<P, S>(
    group: &DynamicGroup,
    provider: &P,
    entities: &[S],
    config: &BatchConfig,
    stop: &AtomicBool,
) -> Vec<Outcome>
where
    P: TagContextProvider + ?Sized,
    S: AsRef<str>,
{
    let mut outcomes = Vec::with_capacity(entities.len());

    for entity in entities {
        if config.fail_fast && stop.load(Ordering::Relaxed) {
            break;
        }

        let entity = entity.as_ref();
        let ctx = provider.tag_context(entity);
        let known = ctx.is_some();
        if !known {
            crate::log_warning!(code = codes::warnings::UNKNOWN_ENTITY,
                "Entity has no tag context, evaluating with no tags",
                "entity" => entity
            );
        }

        let decision = group.decide(&ctx.unwrap_or_default(), config.policy);
        let failed = decision.is_error();
        if let MembershipDecision::Error(error) = &decision {
            crate::log_warning!(code = codes::batch::ENTITY_EVALUATION_FAILED,
                "Entity evaluation failed",
                "entity" => entity,
                "group" => group.name(),
                "error" => error
            );
        }

        outcomes.push(Outcome {
            entity: entity.to_string(),
            known,
            decision,
        });

        if failed && config.fail_fast {
            stop.store(true, Ordering::Relaxed);
            break;
        }
    }

    outcomes
}

fn calculate_chunk_size(entity_count: usize, threads: usize) -> usize {
    entity_count.div_ceil(threads.max(1)).max(1)
}
