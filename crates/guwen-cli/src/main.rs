#![forbid(unsafe_code)]

mod cmd;
mod output;

use anyhow::Context;
use clap::{Parser, Subcommand};
use guwen_core::config::{self, ServerConfig};
use output::OutputMode;
use std::env;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "guwen: read sharded classical-text corpora",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format.
    #[arg(long, global = true, value_enum)]
    format: Option<OutputMode>,

    /// Emit JSON output (alias for `--format json`).
    #[arg(long, global = true, hide = true)]
    json: bool,

    /// Config file (default: ./guwen.toml, then the user config dir).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Resources directory (overrides config and `GUWEN_RESOURCES_DIR`).
    #[arg(long, global = true)]
    resources: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    fn output_mode(&self) -> OutputMode {
        output::resolve_output_mode(self.format, self.json)
    }

    fn load_config(&self) -> anyhow::Result<ServerConfig> {
        let cwd = env::current_dir().context("failed to read current directory")?;
        self.resolve_config(&cwd, |key| env::var(key).ok())
    }

    /// Config file, then `GUWEN_*` variables, then flags.
    fn resolve_config(
        &self,
        cwd: &Path,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> anyhow::Result<ServerConfig> {
        let mut config = config::discover_config(self.config.as_deref(), cwd)?;
        config.apply_env_overrides(lookup)?;
        if let Some(resources) = &self.resources {
            config.resources_dir.clone_from(resources);
        }
        Ok(config)
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        next_help_heading = "Server",
        about = "Serve the HTTP API",
        after_help = "EXAMPLES:\n    # Serve on the configured address\n    guwen serve\n\n    # Serve on all interfaces\n    guwen serve --bind 0.0.0.0:3000"
    )]
    Serve(cmd::serve::ServeArgs),

    #[command(
        next_help_heading = "Read",
        about = "Estimate the number of records in a corpus",
        after_help = "EXAMPLES:\n    guwen count guwen zhou\n    guwen count guwen zhou --json"
    )]
    Count(cmd::CorpusArgs),

    #[command(
        next_help_heading = "Read",
        about = "Print every record of the shard holding an id",
        after_help = "EXAMPLES:\n    guwen page guwen zhou 15\n\n    # Include English translations\n    guwen page guwen zhou 15 --en"
    )]
    Page(cmd::read::RecordArgs),

    #[command(
        next_help_heading = "Read",
        about = "Print one record by id",
        after_help = "EXAMPLES:\n    guwen get guwen zhou 6 --en --jp"
    )]
    Get(cmd::read::RecordArgs),

    #[command(next_help_heading = "Browse", about = "List collections")]
    Collections,

    #[command(next_help_heading = "Browse", about = "List subcollections of a collection")]
    Subcollections(cmd::browse::CollectionArgs),

    #[command(next_help_heading = "Browse", about = "List the shard files of a corpus")]
    Shards(cmd::CorpusArgs),

    #[command(
        next_help_heading = "Diagnose",
        about = "Check that every shard holds as many records as the first",
        long_about = "Count every shard of a corpus and report the ones whose size differs from the \
                      first. Id lookups and `guwen count` assume equal-sized shards; a non-uniform \
                      corpus makes both unreliable."
    )]
    Audit(cmd::CorpusArgs),
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("GUWEN_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose || env::var("DEBUG").is_ok() {
            "guwen=debug,info"
        } else {
            "guwen=info,warn"
        })
    });

    let format = env::var("GUWEN_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if cli.verbose {
        info!("Verbose mode enabled");
    }

    let output = cli.output_mode();
    let config = cli.load_config()?;
    debug!(resources = %config.resources_dir.display(), "effective config");

    match cli.command {
        Commands::Serve(ref args) => cmd::serve::run_serve(args, &config),
        Commands::Count(ref args) => cmd::count::run_count(args, &config, output),
        Commands::Page(ref args) => cmd::read::run_page(args, &config, output),
        Commands::Get(ref args) => cmd::read::run_get(args, &config, output),
        Commands::Collections => cmd::browse::run_collections(&config, output),
        Commands::Subcollections(ref args) => {
            cmd::browse::run_subcollections(args, &config, output)
        }
        Commands::Shards(ref args) => cmd::browse::run_shards(args, &config, output),
        Commands::Audit(ref args) => cmd::audit::run_audit(args, &config, output),
    }
}
