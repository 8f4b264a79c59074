use crate::document::{load_schema_document, SchemaRegistry};
use crate::filter::AttributeFilter;
use crate::generator::filter_attributes;
use crate::key_cache;
use crate::logging::{LogConfig, LogFormat};
use crate::serializer::{serialize, SerializeOptions};
use crate::validator::{validate, ValidateOptions};
use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde_json::{json, Value as JsonValue};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Command-line interface for brrtbind
///
/// Every command loads a schema document, picks one model from it and prints JSON to
/// stdout.
#[derive(Parser, Debug)]
#[command(name = "brrtbind", version)]
#[command(about = "Schema-driven validation, serialization and attribute filtering", long_about = None)]
pub struct Cli {
    /// Log level: trace, debug, info, warn, error
    #[arg(long, global = true, env = "BRRTBIND_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Log output format
    #[arg(long, global = true, value_enum, env = "BRRTBIND_LOG_FORMAT")]
    pub log_format: Option<LogFormatArg>,

    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormatArg {
    Json,
    Pretty,
}

/// Schema document and model selection shared by all commands
#[derive(Args, Debug, Clone)]
pub struct ModelArgs {
    /// Schema document (YAML, JSON or TOML)
    #[arg(short, long)]
    pub schema: PathBuf,

    /// Model name within the document
    #[arg(short, long)]
    pub model: String,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate JSON input and print the serialized instance
    Validate {
        #[command(flatten)]
        target: ModelArgs,

        /// Input JSON file (default: stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Attribute filter in wire form (JSON file)
        #[arg(short, long)]
        filter: Option<PathBuf>,

        /// Input uses minified keys
        #[arg(long, default_value_t = false)]
        minified_input: bool,

        /// Emit minified keys
        #[arg(long, default_value_t = false)]
        minified_output: bool,

        /// Emit every key, including unset and hidden attributes
        #[arg(long, default_value_t = false)]
        complete: bool,
    },
    /// Print the model's blueprint
    Blueprint {
        #[command(flatten)]
        target: ModelArgs,
    },
    /// Print the model's minified key table
    Keys {
        #[command(flatten)]
        target: ModelArgs,
    },
    /// Print code generation metadata for the model's attributes
    Attributes {
        #[command(flatten)]
        target: ModelArgs,
    },
    /// Print a default attribute filter in wire form
    Filter {
        #[command(flatten)]
        target: ModelArgs,

        /// Start from an all-hidden filter instead of all-visible
        #[arg(long, default_value_t = false)]
        default_hidden: bool,

        /// Emit every key
        #[arg(long, default_value_t = false)]
        complete: bool,
    },
}

impl Cli {
    /// Environment logging settings overridden by command-line flags.
    pub fn log_config(&self) -> LogConfig {
        let mut config = LogConfig::from_env();
        if let Some(level) = &self.log_level {
            config.log_level = level.clone();
        }
        if let Some(format) = self.log_format {
            config.format = match format {
                LogFormatArg::Json => LogFormat::Json,
                LogFormatArg::Pretty => LogFormat::Pretty,
            };
        }
        config
    }
}

/// Run a parsed command, writing its JSON output to `out`.
pub fn run_cli(cli: &Cli, out: &mut dyn Write) -> anyhow::Result<()> {
    let output = match &cli.command {
        Commands::Validate {
            target,
            input,
            filter,
            minified_input,
            minified_output,
            complete,
        } => {
            let registry = load(target)?;
            let schema = registry.require(&target.model)?;
            let raw = read_input(input.as_deref())?;
            let filter = filter
                .as_deref()
                .map(|path| -> anyhow::Result<AttributeFilter> {
                    let wire = read_json(path)?;
                    AttributeFilter::from_value(schema, &wire)
                        .with_context(|| format!("invalid attribute filter {}", path.display()))
                })
                .transpose()?;

            let validate_options = ValidateOptions {
                attribute_filter: filter.as_ref(),
                minified: *minified_input,
                required: None,
            };
            let instance = validate(schema, Some(&raw), &validate_options)
                .with_context(|| format!("input does not validate against '{}'", target.model))?;
            match instance {
                Some(instance) => {
                    let serialize_options = SerializeOptions {
                        attribute_filter: filter.as_ref(),
                        minified: *minified_output,
                        complete: *complete,
                    };
                    serialize(&instance, &serialize_options)?
                }
                None => JsonValue::Null,
            }
        }
        Commands::Blueprint { target } => {
            let registry = load(target)?;
            registry.require(&target.model)?.blueprint()
        }
        Commands::Keys { target } => {
            let registry = load(target)?;
            let schema = registry.require(&target.model)?;
            let table = schema.key_table();
            json!({
                "model": schema.name(),
                "schema_id": schema.id().as_str(),
                "schema_token": table.schema_token(),
                "tokens": table.token_map(),
                "rewrite_map": table.rewrite_map(),
            })
        }
        Commands::Attributes { target } => {
            let registry = load(target)?;
            let schema = registry.require(&target.model)?;
            serde_json::to_value(filter_attributes(schema))?
        }
        Commands::Filter {
            target,
            default_hidden,
            complete,
        } => {
            let registry = load(target)?;
            registry
                .require(&target.model)?
                .attribute_filter(!*default_hidden)
                .to_value(*complete)
        }
    };

    serde_json::to_writer_pretty(&mut *out, &output)?;
    writeln!(out)?;
    Ok(())
}

fn load(target: &ModelArgs) -> anyhow::Result<SchemaRegistry> {
    debug!(schema = %target.schema.display(), model = %target.model, "Loading schema document");
    let registry = load_schema_document(&target.schema)?;
    let built = key_cache::global().prebuild(registry.iter());
    info!(models = registry.len(), key_tables = built, "Schema document ready");
    Ok(registry)
}

fn read_input(path: Option<&Path>) -> anyhow::Result<JsonValue> {
    match path {
        Some(path) => read_json(path),
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("failed to read input from stdin")?;
            serde_json::from_str(&buffer).context("input on stdin is not valid JSON")
        }
    }
}

fn read_json(path: &Path) -> anyhow::Result<JsonValue> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("{} is not valid JSON", path.display()))
}
