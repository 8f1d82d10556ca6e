//! pipecfg CLI entry point.
//!
//! This binary is the composition root. Responsibilities:
//!
//! 1. **Parse arguments**: subcommand plus the mutator settings flags.
//! 2. **Wire observability**: configure `tracing-subscriber` (human or JSON
//!    format, filtered by `RUST_LOG`) writing to stderr, so stdout carries
//!    only the resulting configuration.
//! 3. **Construct collaborators**: the built-in catalogue from `components`
//!    serves as both type registry and default-config factory for the
//!    [`pipeline_config::Mutator`].
//! 4. **Run the command**: `add`, `create` or `list`.

mod commands;

use clap::{Args, Parser, Subcommand};
use pipeline_config::settings::{DEFAULT_DEFERRED_TYPE, DEFAULT_KEY_CANDIDATES, DEFAULT_KEY_PREFIX};
use pipeline_config::{ComponentCategory, MutatorSettings};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "pipecfg", version, about = "Add components to pipeline configurations")]
struct Cli {
    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    log_json: bool,

    #[command(flatten)]
    settings: SettingsArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Args)]
struct SettingsArgs {
    /// Input/output type accepted without registry validation.
    #[arg(long, global = true, default_value = DEFAULT_DEFERRED_TYPE)]
    deferred_type: String,

    /// Validate every input/output type, including the deferred one.
    #[arg(long, global = true)]
    no_deferred_type: bool,

    /// Prefix of generated cache and rate limit keys.
    #[arg(long, global = true, default_value = DEFAULT_KEY_PREFIX)]
    key_prefix: String,

    /// Number of generated keys to try before giving up.
    #[arg(long, global = true, default_value_t = DEFAULT_KEY_CANDIDATES)]
    key_candidates: usize,
}

impl SettingsArgs {
    fn to_settings(&self) -> MutatorSettings {
        MutatorSettings {
            deferred_type: (!self.no_deferred_type).then(|| self.deferred_type.clone()),
            key_prefix: self.key_prefix.clone(),
            key_candidates: self.key_candidates,
        }
    }
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Add components to an existing configuration (JSON).
    Add(commands::AddArgs),

    /// Create a configuration from an `inputs/processors/outputs` expression,
    /// e.g. `stdin,kafka/jmespath/stdout`.
    Create(commands::CreateArgs),

    /// List the registered component types.
    List {
        /// Only list this category (input, output, processor, condition,
        /// cache, rate_limit).
        category: Option<ComponentCategory>,
    },
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    let settings = cli.settings.to_settings();
    match cli.command {
        Command::Add(args) => commands::add(&args, settings),
        Command::Create(args) => commands::create(&args, settings),
        Command::List { category } => {
            commands::list(category);
            Ok(())
        }
    }
}
