use std::time::Duration;

use crate::error::GameError;
use crate::food::FoodPlacement;
use crate::game::{Direction, Position};

pub const GRID_SIZE: u16 = 15;
/// Upper bound on `grid_size`; free-cell placement scans the whole grid.
pub const MAX_GRID_SIZE: u16 = 256;
pub const TICK_INTERVAL_MS: u64 = 150;
pub const INITIAL_FOOD_COUNT: u32 = 5;
pub const INITIAL_SNAKE_POSITION: Position = Position { x: 7, y: 7 };
pub const INITIAL_DIRECTION: Direction = Direction::Right;
pub const INITIAL_FOOD_POSITION: Position = Position { x: 10, y: 10 };
pub const COMPLETION_DELAY_MS: u64 = 1000;
/// Terminal columns drawn per grid cell, so cells come out roughly square.
pub const CELL_WIDTH: u16 = 2;

/// Construction-time constants of one game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameConfig {
    pub grid_size: u16,
    pub tick_interval: Duration,
    pub initial_food_count: u32,
    pub initial_snake_position: Position,
    pub initial_direction: Direction,
    /// Food for the very first round. `None` places it at random.
    pub initial_food: Option<Position>,
    pub food_placement: FoodPlacement,
    pub completion_delay: Duration,
    pub cell_width: u16,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            grid_size: GRID_SIZE,
            tick_interval: Duration::from_millis(TICK_INTERVAL_MS),
            initial_food_count: INITIAL_FOOD_COUNT,
            initial_snake_position: INITIAL_SNAKE_POSITION,
            initial_direction: INITIAL_DIRECTION,
            initial_food: Some(INITIAL_FOOD_POSITION),
            food_placement: FoodPlacement::AvoidSnake,
            completion_delay: Duration::from_millis(COMPLETION_DELAY_MS),
            cell_width: CELL_WIDTH,
        }
    }
}

impl GameConfig {
    pub fn validate(&self) -> Result<(), GameError> {
        if self.grid_size == 0 || self.grid_size > MAX_GRID_SIZE {
            return Err(GameError::InvalidConfig(format!(
                "grid size must be between 1 and {}, got {}",
                MAX_GRID_SIZE, self.grid_size
            )));
        }
        if self.tick_interval.is_zero() {
            return Err(GameError::InvalidConfig("tick interval must be positive".into()));
        }
        if self.cell_width == 0 {
            return Err(GameError::InvalidConfig("cell width must be positive".into()));
        }
        if !self.contains(self.initial_snake_position) {
            return Err(GameError::InvalidConfig(format!(
                "initial snake position {} is outside the {}x{} grid",
                self.initial_snake_position, self.grid_size, self.grid_size
            )));
        }
        if let Some(food) = self.initial_food {
            if !self.contains(food) {
                return Err(GameError::InvalidConfig(format!(
                    "initial food {} is outside the {}x{} grid",
                    food, self.grid_size, self.grid_size
                )));
            }
            if food == self.initial_snake_position {
                return Err(GameError::InvalidConfig(
                    "initial food overlaps the snake".into(),
                ));
            }
        }

        // The snake is at most `initial_food_count` long when the last pellet
        // spawns, and it needs a free cell to land on.
        let cells = u64::from(self.grid_size) * u64::from(self.grid_size);
        if self.initial_food_count == 0 || u64::from(self.initial_food_count) >= cells {
            return Err(GameError::InvalidConfig(format!(
                "initial food count must be between 1 and {}",
                cells - 1
            )));
        }
        Ok(())
    }

    /// Whether `pos` lies on the grid.
    pub fn contains(&self, pos: Position) -> bool {
        let n = i32::from(self.grid_size);
        (0..n).contains(&pos.x) && (0..n).contains(&pos.y)
    }
}
