use log::{info, trace};

use crate::config::GameConfig;
use crate::food::FoodSpawner;
use crate::game::{GameState, Lifecycle, Position};

/// Result of advancing the snake by one cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Moved,
    Ate { remaining: u32, next_food: Position },
    Completed,
    HitWall(Position),
    HitSelf(Position),
    /// The round was not in play; nothing happened.
    Stalled,
}

/// Advances `state` by one cell in its committed direction.
///
/// Collisions are checked before food so a fatal move never counts as a
/// meal. A failed move leaves the snake exactly as it was.
pub fn advance(
    state: &mut GameState,
    config: &GameConfig,
    spawner: &mut FoodSpawner,
) -> StepOutcome {
    if state.lifecycle() != Lifecycle::Playing {
        return StepOutcome::Stalled;
    }

    let n = i32::from(config.grid_size);
    let head = state.snake().head().step(state.direction());

    if head.x < 0 || head.x >= n || head.y < 0 || head.y >= n {
        info!("snake hit the wall at {}", head);
        state.set_lifecycle(Lifecycle::GameOver);
        return StepOutcome::HitWall(head);
    }

    // The tail still counts: it has not moved out of the way yet.
    if state.snake().contains(head) {
        info!("snake bit itself at {}", head);
        state.set_lifecycle(Lifecycle::GameOver);
        return StepOutcome::HitSelf(head);
    }

    state.snake_mut().push_head(head);

    if state.food() == Some(head) {
        let remaining = state.eat();
        if remaining == 0 {
            info!("last pellet eaten, snake length {}", state.snake().len());
            state.set_food(None);
            state.set_lifecycle(Lifecycle::Complete);
            return StepOutcome::Completed;
        }
        let next_food = spawner.spawn(config.grid_size, config.food_placement, state.snake());
        state.set_food(Some(next_food));
        trace!("ate at {}, {} left", head, remaining);
        return StepOutcome::Ate {
            remaining,
            next_food,
        };
    }

    state.snake_mut().pop_tail();
    trace!("moved to {}", head);
    StepOutcome::Moved
}
