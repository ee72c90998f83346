//! shaderpipe - shader compilation pipelines from the command line.
//!
//! Main entry point for the shaderpipe CLI.

use anyhow::Result;
use clap::{Parser, Subcommand};
use shaderpipe_config::LoggingSection;
use tracing::warn;
use tracing_appender::non_blocking::WorkerGuard;

mod commands;

use commands::{config, pipelines, run, tools};

// ─────────────────────────────────────────────────────────────────────────────
// CLI Structure
// ─────────────────────────────────────────────────────────────────────────────

/// shaderpipe - run shader sources through chains of compilers and analyzers
#[derive(Parser)]
#[command(name = "shaderpipe")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output as JSON (for scripting)
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compile a shader through a sequence of tools
    Run(run::RunArgs),

    /// List available tools and their parameters
    Tools(tools::ToolsArgs),

    /// List pipelines in the pipeline library
    Pipelines(pipelines::PipelinesArgs),

    /// Configuration management
    Config(config::ConfigArgs),
}

// ─────────────────────────────────────────────────────────────────────────────
// Logging
// ─────────────────────────────────────────────────────────────────────────────

const VERBOSE_FILTER: &str =
    "shaderpipe=debug,shaderpipe_core=debug,shaderpipe_tools=debug,shaderpipe_config=debug,info";

const FILE_FILTER: &str =
    "shaderpipe=trace,shaderpipe_core=trace,shaderpipe_tools=trace,shaderpipe_config=trace,info";

/// Console logging to stderr plus an optional rotating JSON file.
///
/// The returned guard must live until exit so buffered file lines get flushed.
fn init_tracing(verbose: bool, logging: &LoggingSection) -> Option<WorkerGuard> {
    use tracing_subscriber::EnvFilter;
    use tracing_subscriber::prelude::*;

    let console_filter = if verbose {
        EnvFilter::new(VERBOSE_FILTER)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level))
    };

    let (file_layer, guard) = match logging.file_dir {
        Some(ref dir) => {
            let appender = tracing_appender::rolling::daily(dir, "shaderpipe.log");
            let (non_blocking, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .json()
                .with_writer(non_blocking)
                .with_filter(EnvFilter::new(FILE_FILTER));
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr)
                .with_filter(console_filter),
        )
        .with(file_layer)
        .init();

    guard
}

// ─────────────────────────────────────────────────────────────────────────────
// Main
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let loaded = shaderpipe_config::load_config(None)?;
    let _guard = init_tracing(cli.verbose, &loaded.config.logging());

    for warning in &loaded.warnings {
        warn!("{}", warning);
    }

    let ctx = commands::Context {
        loaded,
        json_output: cli.json,
        verbose: cli.verbose,
    };

    match cli.command {
        Commands::Run(args) => run::run(args, &ctx).await,
        Commands::Tools(args) => tools::run(args, &ctx).await,
        Commands::Pipelines(args) => pipelines::run(args, &ctx).await,
        Commands::Config(args) => config::run(args, &ctx).await,
    }
}
