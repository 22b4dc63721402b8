use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use super::action::Direction;
use super::state::Position;

/// Largest accepted board side, in cells
pub const MAX_BOARD_CELLS: usize = 256;

/// Errors raised while loading or validating a [`GameConfig`]
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Where new food is allowed to appear
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FoodPlacement {
    /// Uniform over every free cell; the snake never has food under it
    #[default]
    AvoidSnake,
    /// Uniform over the whole board, occupied cells included
    Anywhere,
}

/// Order of tail removal relative to the self-collision check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TailRule {
    /// The tail leaves its cell before the head is checked, so the head may
    /// follow straight into it
    #[default]
    VacateFirst,
    /// The head is checked against the body as it was before the move
    CheckFirst,
}

/// Configuration for the game
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Cells per axis of the square board
    pub board_cells: usize,
    /// Milliseconds between ticks
    pub tick_period_ms: u64,
    /// Where the single-segment snake appears on start
    pub initial_head: Position,
    /// Heading on start
    pub initial_direction: Direction,
    pub food_placement: FoodPlacement,
    pub tail_rule: TailRule,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            board_cells: 15,
            tick_period_ms: 200,
            initial_head: Position::new(5, 5),
            initial_direction: Direction::Right,
            food_placement: FoodPlacement::default(),
            tail_rule: TailRule::default(),
        }
    }
}

impl GameConfig {
    /// Create a new configuration with a custom board size
    pub fn new(board_cells: usize) -> Self {
        Self {
            board_cells,
            ..Default::default()
        }
    }

    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.tick_period_ms)
    }

    /// Parse a TOML document. Missing keys keep their default values.
    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Load and validate a TOML config file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let config = Self::from_toml_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.board_cells == 0 {
            return Err(ConfigError::Invalid(
                "board_cells must be at least 1".to_string(),
            ));
        }

        if self.board_cells > MAX_BOARD_CELLS {
            return Err(ConfigError::Invalid(format!(
                "board_cells {} exceeds the maximum of {}",
                self.board_cells, MAX_BOARD_CELLS
            )));
        }

        if self.tick_period_ms == 0 {
            return Err(ConfigError::Invalid(
                "tick_period_ms must be greater than zero".to_string(),
            ));
        }

        let head = self.initial_head;
        let limit = self.board_cells as i32;
        if head.x < 0 || head.y < 0 || head.x >= limit || head.y >= limit {
            return Err(ConfigError::Invalid(format!(
                "initial_head ({}, {}) is outside a {}x{} board",
                head.x, head.y, self.board_cells, self.board_cells
            )));
        }

        Ok(())
    }
}
