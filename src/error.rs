use thiserror::Error;

use crate::game::Lifecycle;

/// Errors surfaced by the game core.
///
/// Collisions are not errors: they end the round through [`Lifecycle::GameOver`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("invalid game configuration: {0}")]
    InvalidConfig(String),
    #[error("reset is only allowed after a loss (game is {0})")]
    ResetNotAllowed(Lifecycle),
    #[error("invalid snake: {0}")]
    InvalidSnake(&'static str),
}
