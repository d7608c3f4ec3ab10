//! Bench command - fixed-depth search timing
//!
//! ## Architecture
//!
//! - Level 1: run() - orchestration
//! - Level 2: bench_depth(), report_results()

use std::time::{Duration, Instant};

use anyhow::{ensure, Result};
use clap::Args;
use serde::Serialize;

use andantino_core::{search_fixed_depth, GameState};

use crate::position;

// ============================================================================
// COMMAND ARGUMENTS
// ============================================================================

#[derive(Args)]
pub struct BenchArgs {
    /// Deepest search to time
    #[arg(long, default_value = "5")]
    pub depth: u32,

    /// Position to search, as moves from the empty board
    #[arg(long, default_value = "10,10 11,10 10,9 10,11 9,9")]
    pub moves: String,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

/// Timing of one fixed-depth search
#[derive(Clone, Debug, Serialize)]
struct BenchmarkResult {
    depth: u32,
    value: i32,
    best_move: Option<String>,
    nodes: u64,
    time_ms: f64,
    nodes_per_second: f64,
}

impl BenchmarkResult {
    fn to_table_row(&self) -> String {
        format!(
            "| {} | {} | {} | {} | {:.2}ms | {:.0} |",
            self.depth,
            self.value,
            self.best_move.as_deref().unwrap_or("-"),
            self.nodes,
            self.time_ms,
            self.nodes_per_second
        )
    }
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

pub fn run(args: BenchArgs) -> Result<()> {
    ensure!(args.depth > 0, "--depth must be at least 1");
    let mut state = position::replay(&args.moves)?;
    ensure!(!state.is_end_game(), "Position is already decided");

    tracing::info!("Benchmarking depths 1..={} at ply {}", args.depth, state.ply());
    let results: Vec<BenchmarkResult> = (1..=args.depth)
        .map(|depth| bench_depth(&mut state, depth))
        .collect();

    report_results(&results, args.json)
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

fn bench_depth(state: &mut GameState, depth: u32) -> BenchmarkResult {
    let start = Instant::now();
    let result = search_fixed_depth(state, depth);
    let elapsed = start.elapsed().max(Duration::from_micros(1));

    tracing::debug!("depth {} searched {} nodes", depth, result.nodes);
    BenchmarkResult {
        depth,
        value: result.value,
        best_move: result.best_move.map(|cell| cell.to_string()),
        nodes: result.nodes,
        time_ms: elapsed.as_secs_f64() * 1000.0,
        nodes_per_second: result.nodes as f64 / elapsed.as_secs_f64(),
    }
}

fn report_results(results: &[BenchmarkResult], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(results)?);
        return Ok(());
    }

    println!("| Depth | Value | Move | Nodes | Time | Nodes/s |");
    println!("|-------|-------|------|-------|------|---------|");
    for result in results {
        println!("{}", result.to_table_row());
    }
    Ok(())
}
