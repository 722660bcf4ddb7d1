//! A small snake game that stands between a visitor and whatever comes next.
//!
//! [`TickEngine`] owns the round and advances it on a fixed clock; arrow keys
//! reach it through [`InputController`], food comes from [`FoodSpawner`], and
//! [`render`] turns snapshots into terminal frames.

pub mod config;
pub mod engine;
pub mod error;
pub mod food;
pub mod game;
pub mod input;
pub mod movement;
pub mod render;

pub use config::GameConfig;
pub use engine::TickEngine;
pub use error::GameError;
pub use food::{FoodPlacement, FoodSpawner};
pub use game::{Direction, GameState, Lifecycle, Position, Snake, Snapshot};
pub use input::{InputController, KeyOutcome};
pub use movement::StepOutcome;
