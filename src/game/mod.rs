//! Core game logic module for Snake
//!
//! This module contains all the game logic without any I/O or rendering dependencies.
//! [`GameEngine`] is the state machine; [`GameSession`] pairs it with the
//! [`TickScheduler`] that drives it while a game is running.

pub mod action;
pub mod config;
pub mod engine;
pub mod scheduler;
pub mod session;
pub mod state;

// Re-export commonly used types
pub use action::{Command, Direction};
pub use config::{ConfigError, FoodPlacement, GameConfig, MAX_BOARD_CELLS, TailRule};
pub use engine::{GameEngine, GameEvent, TickOutcome};
pub use scheduler::TickScheduler;
pub use session::GameSession;
pub use state::{CollisionType, GameState, GameStatus, Position, Snake};
