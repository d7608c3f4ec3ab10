//! Selfplay command - one engine plays both sides
//!
//! ## Architecture
//!
//! - Level 1: run() - orchestration
//! - Level 2: play_game(), report_results()
//! - Level 3: choose_move()

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use serde::Serialize;

use andantino_core::{
    Cell, EngineConfig, EngineKind, GameResult, GameState, MonteCarlo, Move, SearchConfig,
    SearchControl,
};

use crate::position;

// ============================================================================
// COMMAND ARGUMENTS
// ============================================================================

#[derive(Clone, Copy, ValueEnum)]
pub enum EngineArg {
    AlphaBeta,
    MonteCarlo,
}

impl From<EngineArg> for EngineKind {
    fn from(engine: EngineArg) -> Self {
        match engine {
            EngineArg::AlphaBeta => EngineKind::AlphaBeta,
            EngineArg::MonteCarlo => EngineKind::MonteCarlo,
        }
    }
}

#[derive(Args)]
pub struct SelfplayArgs {
    /// Move picker (defaults to the config file's engine)
    #[arg(long, value_enum)]
    pub engine: Option<EngineArg>,

    /// Maximum search depth per move
    #[arg(long)]
    pub depth: Option<u32>,

    /// Time limit per move in milliseconds (0 = none)
    #[arg(long)]
    pub time_ms: Option<u64>,

    /// Stop after this many moves
    #[arg(long, default_value = "271")]
    pub max_moves: u16,

    /// Random seed for Monte Carlo playouts
    #[arg(long)]
    pub seed: Option<u64>,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

/// A finished or truncated game
#[derive(Serialize)]
struct GameRecord {
    engine: EngineKind,
    result: GameResult,
    plies: u16,
    moves: Vec<Move>,
}

/// Resolved move picker
enum Engine {
    AlphaBeta(SearchConfig),
    MonteCarlo(MonteCarlo),
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

pub fn run(args: SelfplayArgs, config: EngineConfig) -> Result<()> {
    let kind = args.engine.map_or(config.engine, EngineKind::from);
    let mut engine = build_engine(&args, kind, config)?;

    tracing::info!("Starting selfplay with {:?} (max {} moves)", kind, args.max_moves);
    let state = play_game(&mut engine, args.max_moves)?;

    let record = GameRecord {
        engine: kind,
        result: state.result(),
        plies: state.ply(),
        moves: state.moves().to_vec(),
    };
    report_results(&record, &state, args.json)
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

fn build_engine(args: &SelfplayArgs, kind: EngineKind, config: EngineConfig) -> Result<Engine> {
    match kind {
        EngineKind::AlphaBeta => {
            let mut search = config.search;
            if let Some(depth) = args.depth {
                search = search.with_max_depth(depth);
            }
            if let Some(time_ms) = args.time_ms {
                search = search.with_time_limit_ms(time_ms);
            }
            search.validate().context("Invalid search settings")?;
            Ok(Engine::AlphaBeta(search))
        }
        EngineKind::MonteCarlo => {
            let mut playouts = config.monte_carlo;
            if let Some(seed) = args.seed {
                playouts = playouts.with_seed(seed);
            }
            playouts.validate().context("Invalid playout settings")?;
            Ok(Engine::MonteCarlo(MonteCarlo::from_config(playouts)))
        }
    }
}

fn play_game(engine: &mut Engine, max_moves: u16) -> Result<GameState> {
    let mut state = GameState::new();

    while !state.is_end_game() && state.ply() < max_moves {
        let (returned, cell) = choose_move(engine, state);
        state = returned;
        let Some(cell) = cell else {
            tracing::warn!("No move available at ply {}", state.ply());
            break;
        };
        tracing::debug!("ply {}: {:?} plays {}", state.ply(), state.current_player(), cell);
        state
            .try_make_move(cell)
            .with_context(|| format!("Engine chose an illegal move at ply {}", state.ply()))?;
    }

    tracing::info!("Game finished after {} plies: {:?}", state.ply(), state.result());
    Ok(state)
}

fn report_results(record: &GameRecord, state: &GameState, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(record)?);
        return Ok(());
    }

    print!("{}", position::render(state));
    println!();
    let moves: Vec<String> = record.moves.iter().map(|m| m.cell.to_string()).collect();
    println!("moves: {}", moves.join(" "));
    println!("{:?} after {} plies", record.result, record.plies);
    Ok(())
}

// ============================================================================
// LEVEL 3 - STEPS
// ============================================================================

/// The alpha-beta worker takes the position by value and hands it back
fn choose_move(engine: &mut Engine, mut state: GameState) -> (GameState, Option<Cell>) {
    match engine {
        Engine::AlphaBeta(config) => {
            let (state, report) = SearchControl::start(state, *config).wait();
            tracing::debug!(
                "depth {} value {} nodes {} in {} ms",
                report.depth_reached,
                report.value,
                report.nodes,
                report.elapsed_ms
            );
            (state, report.best_move)
        }
        Engine::MonteCarlo(picker) => {
            let best = picker.best_move(&mut state).map(|stats| stats.cell);
            (state, best)
        }
    }
}
