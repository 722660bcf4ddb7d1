use std::collections::VecDeque;
use std::fmt;

use crate::config::GameConfig;
use crate::error::GameError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Position { x, y }
    }

    /// The neighbouring cell one step towards `direction`. May be off-grid.
    pub fn step(self, direction: Direction) -> Position {
        match direction {
            Direction::Up => Position { x: self.x, y: self.y - 1 },
            Direction::Down => Position { x: self.x, y: self.y + 1 },
            Direction::Left => Position { x: self.x - 1, y: self.y },
            Direction::Right => Position { x: self.x + 1, y: self.y },
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub fn opposite(self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Idle,
    Playing,
    GameOver,
    Complete,
}

impl Lifecycle {
    pub fn is_terminal(self) -> bool {
        matches!(self, Lifecycle::GameOver | Lifecycle::Complete)
    }
}

impl fmt::Display for Lifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Lifecycle::Idle => "idle",
            Lifecycle::Playing => "playing",
            Lifecycle::GameOver => "game over",
            Lifecycle::Complete => "complete",
        };
        f.write_str(name)
    }
}

/// Body segments, head first. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snake {
    body: VecDeque<Position>,
}

impl Snake {
    pub fn new(head: Position) -> Self {
        let mut body = VecDeque::new();
        body.push_back(head);
        Snake { body }
    }

    /// Builds a snake from head-first segments.
    pub fn from_segments(segments: Vec<Position>) -> Result<Self, GameError> {
        if segments.is_empty() {
            return Err(GameError::InvalidSnake("a snake needs at least one segment"));
        }
        for (i, seg) in segments.iter().enumerate() {
            if segments[..i].contains(seg) {
                return Err(GameError::InvalidSnake("segments overlap"));
            }
        }
        for pair in segments.windows(2) {
            let (dx, dy) = (pair[0].x - pair[1].x, pair[0].y - pair[1].y);
            if dx.abs() + dy.abs() != 1 {
                return Err(GameError::InvalidSnake("segments are not contiguous"));
            }
        }
        Ok(Snake {
            body: segments.into(),
        })
    }

    pub fn head(&self) -> Position {
        self.body[0]
    }

    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn contains(&self, pos: Position) -> bool {
        self.body.contains(&pos)
    }

    pub fn segments(&self) -> impl Iterator<Item = Position> + '_ {
        self.body.iter().copied()
    }

    pub(crate) fn push_head(&mut self, head: Position) {
        self.body.push_front(head);
    }

    pub(crate) fn pop_tail(&mut self) {
        if self.body.len() > 1 {
            self.body.pop_back();
        }
    }
}

/// Everything one round of the game knows about itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameState {
    snake: Snake,
    food: Option<Position>,
    direction: Direction,
    remaining_food: u32,
    lifecycle: Lifecycle,
}

impl GameState {
    /// A fresh, not yet started round.
    pub fn new(config: &GameConfig, food: Position) -> Self {
        GameState {
            snake: Snake::new(config.initial_snake_position),
            food: Some(food),
            direction: config.initial_direction,
            remaining_food: config.initial_food_count,
            lifecycle: Lifecycle::Idle,
        }
    }

    /// A round already in progress, for resuming a known position.
    pub fn from_parts(
        snake: Snake,
        food: Position,
        direction: Direction,
        remaining_food: u32,
    ) -> Result<Self, GameError> {
        if remaining_food == 0 {
            return Err(GameError::InvalidConfig(
                "a round in progress needs food left".into(),
            ));
        }
        Ok(GameState {
            snake,
            food: Some(food),
            direction,
            remaining_food,
            lifecycle: Lifecycle::Playing,
        })
    }

    pub fn snake(&self) -> &Snake {
        &self.snake
    }

    /// `None` once the last pellet is eaten.
    pub fn food(&self) -> Option<Position> {
        self.food
    }

    /// The committed direction, applied on the most recent tick.
    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn remaining_food(&self) -> u32 {
        self.remaining_food
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub(crate) fn snake_mut(&mut self) -> &mut Snake {
        &mut self.snake
    }

    pub(crate) fn set_food(&mut self, food: Option<Position>) {
        self.food = food;
    }

    pub(crate) fn commit_direction(&mut self, direction: Direction) {
        self.direction = direction;
    }

    pub(crate) fn eat(&mut self) -> u32 {
        self.remaining_food = self.remaining_food.saturating_sub(1);
        self.remaining_food
    }

    pub(crate) fn set_lifecycle(&mut self, lifecycle: Lifecycle) {
        self.lifecycle = lifecycle;
    }

    pub fn snapshot(&self, pending: Option<Direction>) -> Snapshot {
        Snapshot {
            snake: self.snake.segments().collect(),
            food: self.food,
            direction: self.direction,
            pending,
            remaining_food: self.remaining_food,
            lifecycle: self.lifecycle,
        }
    }
}

/// Render-ready copy of a [`GameState`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub snake: Vec<Position>,
    pub food: Option<Position>,
    pub direction: Direction,
    pub pending: Option<Direction>,
    pub remaining_food: u32,
    pub lifecycle: Lifecycle,
}
