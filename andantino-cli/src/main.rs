//! Andantino CLI - developer shell for the engine
//!
//! Commands:
//! - analyze: Search a position and report the best move
//! - selfplay: Play a full game engine against engine
//! - bench: Time fixed-depth searches

mod analyze;
mod bench;
mod position;
mod selfplay;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "andantino")]
#[command(about = "Andantino engine developer shell")]
struct Cli {
    /// Engine config JSON file; flags override its fields
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search a position and report the best move
    Analyze(analyze::AnalyzeArgs),
    /// Play a game engine against engine
    Selfplay(selfplay::SelfplayArgs),
    /// Time fixed-depth searches
    Bench(bench::BenchArgs),
}

fn main() -> anyhow::Result<()> {
    // Logs go to stderr so --json output stays clean
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = position::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Analyze(args) => analyze::run(args, config),
        Commands::Selfplay(args) => selfplay::run(args, config),
        Commands::Bench(args) => bench::run(args),
    }
}
