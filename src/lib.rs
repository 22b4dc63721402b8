//! Grid Snake - single-player Snake on a fixed square board
//!
//! This library provides:
//! - Core game logic: the tick/collision/direction state machine (game module)
//! - A cancellable tick scheduler bound to the game lifecycle (game::scheduler)
//! - TUI rendering and keyboard input (render and input modules)
//! - The interactive terminal mode (modes module)

pub mod game;
pub mod input;
pub mod metrics;
pub mod modes;
pub mod render;
