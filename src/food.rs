use log::{debug, warn};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::game::{Position, Snake};

/// Where a new pellet may land.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FoodPlacement {
    /// Any cell, even one under the snake.
    Uniform,
    /// Any cell the snake does not occupy.
    #[default]
    AvoidSnake,
}

/// Random source for pellets. The placement policy comes from the game's
/// config on every call.
pub struct FoodSpawner {
    rng: StdRng,
}

impl Default for FoodSpawner {
    fn default() -> Self {
        Self::new()
    }
}

impl FoodSpawner {
    pub fn new() -> Self {
        FoodSpawner {
            rng: StdRng::from_entropy(),
        }
    }

    /// Reproducible pellets for tests and replays.
    pub fn seeded(seed: u64) -> Self {
        FoodSpawner {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn spawn(&mut self, grid_size: u16, placement: FoodPlacement, snake: &Snake) -> Position {
        let food = match placement {
            FoodPlacement::Uniform => self.uniform(grid_size),
            FoodPlacement::AvoidSnake => {
                let n = i32::from(grid_size);
                let free: Vec<Position> = (0..n)
                    .flat_map(|y| (0..n).map(move |x| Position::new(x, y)))
                    .filter(|&pos| !snake.contains(pos))
                    .collect();
                match free.choose(&mut self.rng) {
                    Some(&pos) => pos,
                    None => {
                        warn!("no free cell for food, placing it anywhere");
                        self.uniform(grid_size)
                    }
                }
            }
        };
        debug!("food spawned at {}", food);
        food
    }

    fn uniform(&mut self, grid_size: u16) -> Position {
        let n = i32::from(grid_size);
        Position {
            x: self.rng.gen_range(0..n),
            y: self.rng.gen_range(0..n),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn food_stays_on_grid() {
        let snake = Snake::new(Position::new(7, 7));
        for placement in [FoodPlacement::Uniform, FoodPlacement::AvoidSnake] {
            let mut spawner = FoodSpawner::seeded(9);
            for _ in 0..500 {
                let food = spawner.spawn(15, placement, &snake);
                assert!((0..15).contains(&food.x) && (0..15).contains(&food.y));
            }
        }
    }

    #[test]
    fn avoid_snake_never_lands_on_the_body() {
        // Fill all but one cell of a 3x3 grid.
        let snake = Snake::from_segments(vec![
            Position::new(0, 0),
            Position::new(1, 0),
            Position::new(2, 0),
            Position::new(2, 1),
            Position::new(1, 1),
            Position::new(0, 1),
            Position::new(0, 2),
            Position::new(1, 2),
        ])
        .unwrap();
        let mut spawner = FoodSpawner::seeded(3);
        for _ in 0..50 {
            assert_eq!(
                spawner.spawn(3, FoodPlacement::AvoidSnake, &snake),
                Position::new(2, 2)
            );
        }
    }

    #[test]
    fn uniform_can_land_on_the_body() {
        let snake = Snake::new(Position::new(0, 0));
        let mut spawner = FoodSpawner::seeded(1);
        let hits = (0..200)
            .filter(|_| spawner.spawn(2, FoodPlacement::Uniform, &snake) == Position::new(0, 0))
            .count();
        assert!(hits > 0);
    }

    #[test]
    fn same_seed_same_pellets() {
        let snake = Snake::new(Position::new(7, 7));
        let mut a = FoodSpawner::seeded(42);
        let mut b = FoodSpawner::seeded(42);
        for _ in 0..20 {
            let placement = FoodPlacement::AvoidSnake;
            assert_eq!(a.spawn(15, placement, &snake), b.spawn(15, placement, &snake));
        }
    }
}
