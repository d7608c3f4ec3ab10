//! Analyze command - search one position in the background
//!
//! ## Architecture
//!
//! - Level 1: run() - orchestration
//! - Level 2: resolve_config(), watch_search(), report_results()

use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use andantino_core::{
    EngineConfig, GameResult, GameState, Player, SearchConfig, SearchControl, SearchReport,
};

use crate::position;

// ============================================================================
// COMMAND ARGUMENTS
// ============================================================================

#[derive(Args)]
pub struct AnalyzeArgs {
    /// Moves from the empty board, e.g. "10,10 11,10 10,9"
    #[arg(long, default_value = "")]
    pub moves: String,

    /// Maximum search depth
    #[arg(long)]
    pub depth: Option<u32>,

    /// Time limit in milliseconds (0 = none)
    #[arg(long)]
    pub time_ms: Option<u64>,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct Analysis {
    plies: u16,
    to_move: Player,
    result: GameResult,
    search: Option<SearchReport>,
}

const POLL_INTERVAL: Duration = Duration::from_millis(10);

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

pub fn run(args: AnalyzeArgs, config: EngineConfig) -> Result<()> {
    let state = position::replay(&args.moves)?;
    let search_config = resolve_config(&args, config)?;

    let search = if state.is_end_game() {
        tracing::info!("Game already decided: {:?}", state.result());
        None
    } else {
        tracing::info!(
            "Analyzing ply {} (max depth {}, {} ms)",
            state.ply(),
            search_config.max_depth,
            search_config.time_limit_ms
        );
        let control = SearchControl::start(state.clone(), search_config);
        watch_search(&control);
        Some(control.wait().1)
    };

    let analysis = Analysis {
        plies: state.ply(),
        to_move: state.current_player(),
        result: state.result(),
        search,
    };
    report_results(&analysis, &state, args.json)
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

/// Config file values overridden by flags
fn resolve_config(args: &AnalyzeArgs, config: EngineConfig) -> Result<SearchConfig> {
    let mut search = config.search;
    if let Some(depth) = args.depth {
        search = search.with_max_depth(depth);
    }
    if let Some(time_ms) = args.time_ms {
        search = search.with_time_limit_ms(time_ms);
    }
    search.validate().context("Invalid search settings")?;
    Ok(search)
}

/// Log each newly completed depth until the worker finishes
fn watch_search(control: &SearchControl) {
    let mut last_depth = 0;
    while !control.is_finished() {
        let result = control.tick();
        if result.depth > last_depth {
            last_depth = result.depth;
            tracing::info!(
                "depth {} value {} nodes {} move {}",
                result.depth,
                result.value,
                result.nodes,
                result.best_move.map_or_else(|| "-".to_string(), |c| c.to_string())
            );
        }
        thread::sleep(POLL_INTERVAL);
    }
}

fn report_results(analysis: &Analysis, state: &GameState, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(analysis)?);
        return Ok(());
    }

    print!("{}", position::render(state));
    println!();
    match &analysis.search {
        None => println!("Game over: {:?}", analysis.result),
        Some(report) => {
            let best = report
                .best_move
                .map_or_else(|| "none".to_string(), |c| c.to_string());
            println!("{:?} to move, best move {}", analysis.to_move, best);
            println!(
                "value {}  depth {}  nodes {}  {} ms  ({:?})",
                report.value, report.depth_reached, report.nodes, report.elapsed_ms, report.stop_reason
            );
        }
    }
    Ok(())
}
