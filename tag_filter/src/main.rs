use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tag_filter::config::runtime::{ConfigError, RuntimeConfig};
use tag_filter::membership::InMemoryTagProvider;
use tag_filter::pipeline::{compile_with_options, CompiledFilter, FilterError};
use tag_filter::{batch, logging, DynamicGroup, NonNumericPolicy, TagContext};

const EXIT_TRUE: u8 = 0;
const EXIT_FALSE: u8 = 1;
const EXIT_ERROR: u8 = 2;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("{0}")]
    Usage(String),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to read '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON in '{path}': {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("{rendered}")]
    Filter { rendered: String },

    #[error(transparent)]
    Batch(#[from] batch::BatchError),
}

#[derive(Debug, Clone, PartialEq)]
enum Command {
    Help,
    Check {
        expr: String,
    },
    Eval {
        expr: String,
        tags: Vec<(String, String)>,
        tags_file: Option<PathBuf>,
        strict: bool,
    },
    Explain {
        expr: String,
    },
    Members {
        expr: String,
        entities_file: PathBuf,
        threads: Option<usize>,
        fail_fast: bool,
        strict: bool,
    },
}

#[derive(Debug, Default, Clone, PartialEq)]
struct GlobalOptions {
    config: Option<PathBuf>,
    json_logs: bool,
}

fn main() -> ExitCode {
    let args: Vec<String> = env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("tag_filter");

    let (options, command) = match parse_args(&args[1.min(args.len())..]) {
        Ok(parsed) => parsed,
        Err(error) => {
            eprintln!("Error: {}", error);
            eprintln!("Run '{} --help' for usage", program);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    if command == Command::Help {
        print_help(program);
        return ExitCode::SUCCESS;
    }

    let result = load_config(&options).and_then(|config| {
        init_logging(&config);
        execute(&command, &config)
    });

    match result {
        Ok(code) => ExitCode::from(code),
        Err(error) => {
            if let CliError::Config(ref config_error) = error {
                logging::safe_log_error(config_error.error_code(), &config_error.to_string());
            }
            eprintln!("{}", error);
            ExitCode::from(EXIT_ERROR)
        }
    }
}

fn print_help(program_name: &str) {
    println!("Tag Filter v{}", env!("CARGO_PKG_VERSION"));
    println!("Compile and evaluate tag-based dynamic group filters");
    println!();
    println!("USAGE:");
    println!("    {} [options] check <expr>", program_name);
    println!("    {} [options] eval <expr> [key=value ...] [--tags file.json] [--strict]", program_name);
    println!("    {} [options] explain <expr>", program_name);
    println!(
        "    {} [options] members <expr> --entities file.json [--threads N] [--fail-fast] [--strict]",
        program_name
    );
    println!();
    println!("OPTIONS:");
    println!("    --help              Show this help message");
    println!("    --config <file>     Load runtime configuration from a TOML file");
    println!("    --json-logs         Emit log events as JSON lines on stderr");
    println!("    --strict            Treat non-numeric tag values in comparisons as errors");
    println!();
    println!("EXIT CODES:");
    println!("    0    valid expression / filter matched / batch completed");
    println!("    1    filter did not match");
    println!("    2    invalid expression, evaluation error or bad arguments");
    println!();
    println!("EXAMPLES:");
    println!(
        "    {} eval 'tag.user_type.contractor and tag.risk_score.gt.80' user_type=contractor risk_score=95",
        program_name
    );
    println!("    {} members 'not tag.vip' --entities users.json --threads 4", program_name);
}

fn parse_args(args: &[String]) -> Result<(GlobalOptions, Command), CliError> {
    let mut options = GlobalOptions::default();
    let mut positional = Vec::new();
    let mut tags_file = None;
    let mut entities_file = None;
    let mut threads = None;
    let mut strict = false;
    let mut fail_fast = false;

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => return Ok((options, Command::Help)),
            "--json-logs" => options.json_logs = true,
            "--strict" => strict = true,
            "--fail-fast" => fail_fast = true,
            "--config" => {
                options.config = Some(PathBuf::from(option_value(args, &mut i)?));
            }
            "--tags" => {
                tags_file = Some(PathBuf::from(option_value(args, &mut i)?));
            }
            "--entities" => {
                entities_file = Some(PathBuf::from(option_value(args, &mut i)?));
            }
            "--threads" => {
                let value = option_value(args, &mut i)?;
                let count = value.parse::<usize>().map_err(|_| {
                    CliError::Usage(format!("Invalid thread count '{}'", value))
                })?;
                threads = Some(count.max(1));
            }
            flag if flag.starts_with("--") => {
                return Err(CliError::Usage(format!("Unknown option '{}'", flag)));
            }
            _ => positional.push(args[i].clone()),
        }
        i += 1;
    }

    let mut positional = positional.into_iter();
    let Some(name) = positional.next() else {
        return Err(CliError::Usage("Missing command".to_string()));
    };
    let expr = positional
        .next()
        .ok_or_else(|| CliError::Usage(format!("'{}' requires an expression", name)))?;
    let rest: Vec<String> = positional.collect();

    let command = match name.as_str() {
        "check" | "explain" if !rest.is_empty() => {
            return Err(CliError::Usage(format!(
                "Unexpected argument '{}'; quote the expression",
                rest[0]
            )));
        }
        "check" => Command::Check { expr },
        "explain" => Command::Explain { expr },
        "eval" => Command::Eval {
            expr,
            tags: rest
                .iter()
                .map(|pair| parse_tag_pair(pair))
                .collect::<Result<_, _>>()?,
            tags_file,
            strict,
        },
        "members" => Command::Members {
            expr,
            entities_file: entities_file
                .ok_or_else(|| CliError::Usage("'members' requires --entities <file>".to_string()))?,
            threads,
            fail_fast,
            strict,
        },
        other => return Err(CliError::Usage(format!("Unknown command '{}'", other))),
    };

    Ok((options, command))
}

fn option_value<'a>(args: &'a [String], i: &mut usize) -> Result<&'a str, CliError> {
    let flag = &args[*i];
    *i += 1;
    args.get(*i)
        .map(String::as_str)
        .ok_or_else(|| CliError::Usage(format!("{} requires a value", flag)))
}

fn parse_tag_pair(pair: &str) -> Result<(String, String), CliError> {
    match pair.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(CliError::Usage(format!(
            "Invalid tag '{}': expected key=value",
            pair
        ))),
    }
}

fn load_config(options: &GlobalOptions) -> Result<RuntimeConfig, CliError> {
    let mut config = match &options.config {
        Some(path) => RuntimeConfig::from_file(path)?,
        None => RuntimeConfig::default(),
    };
    config.validate()?;

    if options.json_logs {
        config.logging.use_structured_logging = true;
    }
    Ok(config)
}

fn init_logging(config: &RuntimeConfig) {
    let initialized = logging::config::init_runtime_preferences(config.logging.clone())
        .and_then(|_| logging::init_global_logging());
    if let Err(message) = initialized {
        logging::safe_log_error(
            logging::codes::system::INITIALIZATION_FAILURE,
            &format!("Logging unavailable: {}", message),
        );
    }
}

fn execute(command: &Command, config: &RuntimeConfig) -> Result<u8, CliError> {
    match command {
        Command::Help => Ok(EXIT_TRUE),
        Command::Check { expr } => {
            let filter = compile_filter(expr, config)?;
            print_check_report(&filter);
            Ok(EXIT_TRUE)
        }
        Command::Explain { expr } => {
            let filter = compile_filter(expr, config)?;
            let json = serde_json::to_string_pretty(filter.expression()).map_err(|source| {
                CliError::Json {
                    path: "<expression>".to_string(),
                    source,
                }
            })?;
            println!("{}", json);
            Ok(EXIT_TRUE)
        }
        Command::Eval {
            expr,
            tags,
            tags_file,
            strict,
        } => {
            let filter = compile_filter(expr, config)?;
            let mut ctx = match tags_file {
                Some(path) => read_json::<TagContext>(path)?,
                None => TagContext::new(),
            };
            ctx.extend(tags.iter().cloned());

            match filter.matches(&ctx, policy(config, *strict)) {
                Ok(matched) => {
                    println!("{}", matched);
                    Ok(if matched { EXIT_TRUE } else { EXIT_FALSE })
                }
                Err(error) => {
                    eprintln!("Error: [{}] {}", error.error_code(), error);
                    Ok(EXIT_ERROR)
                }
            }
        }
        Command::Members {
            expr,
            entities_file,
            threads,
            fail_fast,
            strict,
        } => {
            let group = DynamicGroup::from_compiled(expr.clone(), compile_filter(expr, config)?.into());
            let provider: InMemoryTagProvider = read_json(entities_file)?;

            let mut batch_config = batch::BatchConfig::from_preferences(&config.batch);
            batch_config.fail_fast = *fail_fast;
            batch_config.policy = policy(config, *strict);
            if let Some(threads) = threads {
                batch_config.max_threads = *threads;
            }

            let results = batch::evaluate_known_entities(&group, &provider, &batch_config)?;
            for member in &results.members {
                println!("{}", member);
            }
            for failure in &results.errors {
                eprintln!("Error: {}: {}", failure.entity, failure.error);
            }
            eprintln!("{}", results.summary());

            Ok(if results.errors.is_empty() {
                EXIT_TRUE
            } else {
                EXIT_ERROR
            })
        }
    }
}

fn policy(config: &RuntimeConfig, strict: bool) -> NonNumericPolicy {
    if strict {
        NonNumericPolicy::Error
    } else {
        config.batch.non_numeric_policy
    }
}

fn compile_filter(expr: &str, config: &RuntimeConfig) -> Result<CompiledFilter, CliError> {
    compile_with_options(expr, &config.parser).map_err(|error: FilterError| CliError::Filter {
        rendered: error.render(expr),
    })
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, CliError> {
    let content = fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.display().to_string(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| CliError::Json {
        path: path.display().to_string(),
        source,
    })
}

fn print_check_report(filter: &CompiledFilter) {
    let metrics = filter.metrics();
    println!("OK: {}", filter.canonical());
    println!("  Predicates: {}", metrics.predicate_count);
    println!("  Comparisons: {}", metrics.comparison_count);
    println!("  Combinators: {}", metrics.combinator_count());
    println!("  Nesting depth: {}", metrics.nesting_depth);
    println!("  Nodes: {}", metrics.node_count);
    println!("  Tag keys: {}", metrics.referenced_keys.join(", "));
}
