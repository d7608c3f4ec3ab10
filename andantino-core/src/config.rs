//! Configuration types for search and playouts

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Engine used to pick moves
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EngineKind {
    /// Iterative-deepening alpha-beta
    #[default]
    AlphaBeta,
    /// Random playouts per candidate move
    MonteCarlo,
}

/// Iterative-deepening search limits
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Deepest iteration to run
    pub max_depth: u32,
    /// Wall-clock budget in milliseconds; 0 means no deadline
    pub time_limit_ms: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_depth: 8,
            time_limit_ms: 1000,
        }
    }
}

impl SearchConfig {
    /// Depth-limited search without a deadline
    pub fn fixed_depth(max_depth: u32) -> Self {
        Self {
            max_depth,
            time_limit_ms: 0,
        }
    }

    pub fn with_max_depth(mut self, max_depth: u32) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_time_limit_ms(mut self, time_limit_ms: u64) -> Self {
        self.time_limit_ms = time_limit_ms;
        self
    }

    pub fn time_limit(&self) -> Option<Duration> {
        (self.time_limit_ms > 0).then(|| Duration::from_millis(self.time_limit_ms))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_depth == 0 {
            return Err(ConfigError::ZeroDepth);
        }
        Ok(())
    }
}

/// Random playout settings
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonteCarloConfig {
    /// Playouts after each candidate move
    pub playouts_per_move: u32,
    /// Moves after which a playout is scored as a draw
    pub max_playout_moves: u32,
    /// Random seed for reproducibility (None = from entropy)
    pub seed: Option<u64>,
}

impl Default for MonteCarloConfig {
    fn default() -> Self {
        Self {
            playouts_per_move: 64,
            max_playout_moves: 200,
            seed: None,
        }
    }
}

impl MonteCarloConfig {
    pub fn with_playouts(mut self, playouts_per_move: u32) -> Self {
        self.playouts_per_move = playouts_per_move;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.playouts_per_move == 0 {
            return Err(ConfigError::ZeroPlayouts);
        }
        Ok(())
    }
}

/// Everything a config file may set
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub engine: EngineKind,
    pub search: SearchConfig,
    pub monte_carlo: MonteCarloConfig,
}

impl EngineConfig {
    /// Read a JSON config; missing fields take their defaults
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.search.validate()?;
        self.monte_carlo.validate()
    }
}
