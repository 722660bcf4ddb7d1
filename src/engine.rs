use std::fmt;
use std::time::{Duration, Instant};

use crossterm::event::KeyCode;
use log::{debug, info};

use crate::config::GameConfig;
use crate::error::GameError;
use crate::food::{FoodPlacement, FoodSpawner};
use crate::game::{GameState, Lifecycle, Snake, Snapshot};
use crate::input::{InputController, KeyOutcome};
use crate::movement::{self, StepOutcome};

type Observer = Box<dyn FnMut(&Snapshot)>;

/// Fixed-interval clock that owns the round and drives it forward.
///
/// Time is passed in by the caller, so the engine works with any host loop
/// and with synthetic instants in tests.
pub struct TickEngine {
    config: GameConfig,
    state: GameState,
    input: InputController,
    spawner: FoodSpawner,
    next_tick: Option<Instant>,
    completion_due: Option<Instant>,
    on_complete: Option<Box<dyn FnOnce()>>,
    observers: Vec<Observer>,
}

impl fmt::Debug for TickEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TickEngine")
            .field("state", &self.state)
            .field("pending", &self.input.pending())
            .field("next_tick", &self.next_tick)
            .field("completion_due", &self.completion_due)
            .finish_non_exhaustive()
    }
}

impl TickEngine {
    /// Mounts a fresh idle round. `on_complete` runs at most once, a short
    /// while after the last pellet is eaten.
    pub fn new(
        config: GameConfig,
        mut spawner: FoodSpawner,
        on_complete: impl FnOnce() + 'static,
    ) -> Result<Self, GameError> {
        config.validate()?;
        let food = match config.initial_food {
            Some(food) => food,
            None => spawner.spawn(
                config.grid_size,
                config.food_placement,
                &Snake::new(config.initial_snake_position),
            ),
        };
        let state = GameState::new(&config, food);
        Ok(Self::with_state(config, state, spawner, on_complete))
    }

    /// Picks up a round that is already in play.
    pub fn resume(
        config: GameConfig,
        state: GameState,
        spawner: FoodSpawner,
        on_complete: impl FnOnce() + 'static,
    ) -> Result<Self, GameError> {
        config.validate()?;
        if !state.snake().segments().all(|pos| config.contains(pos)) {
            return Err(GameError::InvalidSnake("segments lie outside the grid"));
        }
        if let Some(food) = state.food() {
            if !config.contains(food) {
                return Err(GameError::InvalidConfig(format!(
                    "food {} is outside the {}x{} grid",
                    food, config.grid_size, config.grid_size
                )));
            }
            if config.food_placement == FoodPlacement::AvoidSnake && state.snake().contains(food) {
                return Err(GameError::InvalidConfig(format!(
                    "food {} lies under the snake",
                    food
                )));
            }
        }
        Ok(Self::with_state(config, state, spawner, on_complete))
    }

    fn with_state(
        config: GameConfig,
        state: GameState,
        spawner: FoodSpawner,
        on_complete: impl FnOnce() + 'static,
    ) -> Self {
        TickEngine {
            config,
            state,
            input: InputController::new(),
            spawner,
            next_tick: None,
            completion_due: None,
            on_complete: Some(Box::new(on_complete)),
            observers: Vec::new(),
        }
    }

    /// Registers a callback that receives a snapshot after every tick.
    pub fn subscribe(&mut self, observer: impl FnMut(&Snapshot) + 'static) {
        self.observers.push(Box::new(observer));
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn snapshot(&self) -> Snapshot {
        self.state.snapshot(self.input.pending())
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.state.lifecycle()
    }

    /// When the next step is due, if the clock is running.
    pub fn next_tick(&self) -> Option<Instant> {
        self.next_tick
    }

    pub fn handle_key(&mut self, code: KeyCode, now: Instant) -> KeyOutcome {
        let outcome = self
            .input
            .handle_key(code, self.state.direction(), self.state.lifecycle());
        if outcome.starts_game() {
            self.start(now);
        }
        outcome
    }

    /// Leaves `idle` and starts the clock. Returns `false` if the round was
    /// not idle.
    pub fn start(&mut self, now: Instant) -> bool {
        if self.state.lifecycle() != Lifecycle::Idle {
            return false;
        }
        info!("game started");
        self.state.set_lifecycle(Lifecycle::Playing);
        self.next_tick = Some(now + self.config.tick_interval);
        true
    }

    /// Runs whatever is due at `now`: at most one step, then the completion
    /// callback once its delay has passed.
    pub fn poll(&mut self, now: Instant) -> Option<StepOutcome> {
        let mut outcome = None;
        if self.state.lifecycle() == Lifecycle::Playing {
            match self.next_tick {
                None => self.next_tick = Some(now + self.config.tick_interval),
                Some(due) if now >= due => {
                    self.next_tick = Some(self.following_tick(due, now));
                    outcome = Some(self.step(now));
                }
                Some(_) => {}
            }
        }

        if self.completion_due.is_some_and(|due| now >= due) {
            self.completion_due = None;
            if let Some(on_complete) = self.on_complete.take() {
                info!("notifying completion");
                on_complete();
            }
        }
        outcome
    }

    /// Missed ticks are dropped, keeping the original phase.
    fn following_tick(&self, due: Instant, now: Instant) -> Instant {
        let interval = self.config.tick_interval;
        let behind = now.duration_since(due);
        let missed = u32::try_from(behind.as_nanos() / interval.as_nanos()).unwrap_or(u32::MAX);
        if missed > 0 {
            debug!("skipped {} tick(s)", missed);
        }
        due + interval.saturating_mul(missed.saturating_add(1))
    }

    fn step(&mut self, now: Instant) -> StepOutcome {
        if let Some(direction) = self.input.take_pending() {
            self.state.commit_direction(direction);
        }

        let outcome = movement::advance(&mut self.state, &self.config, &mut self.spawner);
        match outcome {
            StepOutcome::Completed => {
                self.next_tick = None;
                self.completion_due = Some(now + self.config.completion_delay);
            }
            StepOutcome::HitWall(_) | StepOutcome::HitSelf(_) => {
                self.next_tick = None;
            }
            _ => {}
        }

        let snapshot = self.snapshot();
        for observer in &mut self.observers {
            observer(&snapshot);
        }
        outcome
    }

    /// Throws the lost round away and mounts a fresh idle one.
    pub fn reset(&mut self) -> Result<(), GameError> {
        let lifecycle = self.state.lifecycle();
        if lifecycle != Lifecycle::GameOver {
            return Err(GameError::ResetNotAllowed(lifecycle));
        }
        let food = self.spawner.spawn(
            self.config.grid_size,
            self.config.food_placement,
            &Snake::new(self.config.initial_snake_position),
        );
        self.state = GameState::new(&self.config, food);
        self.input = InputController::new();
        self.next_tick = None;
        info!("game reset");
        Ok(())
    }
}

/// Time left until the engine next needs polling, capped at `max`.
pub fn poll_timeout(engine: &TickEngine, now: Instant, max: Duration) -> Duration {
    let due = [engine.next_tick, engine.completion_due]
        .into_iter()
        .flatten()
        .min();
    match due {
        Some(due) => due.saturating_duration_since(now).min(max),
        None => max,
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    use super::*;
    use crate::game::{Direction, Position};

    const STEP: Duration = Duration::from_millis(150);

    fn engine() -> TickEngine {
        TickEngine::new(GameConfig::default(), FoodSpawner::seeded(11), || {}).unwrap()
    }

    #[test]
    fn idle_engine_never_ticks() {
        let mut engine = engine();
        let t0 = Instant::now();
        assert_eq!(engine.poll(t0 + STEP * 10), None);
        assert_eq!(engine.lifecycle(), Lifecycle::Idle);
    }

    #[test]
    fn arrow_key_starts_and_ticks_once_per_interval() {
        let mut engine = engine();
        let t0 = Instant::now();
        engine.handle_key(KeyCode::Down, t0);
        assert_eq!(engine.lifecycle(), Lifecycle::Playing);

        assert_eq!(engine.poll(t0 + STEP / 2), None);
        assert_eq!(engine.poll(t0 + STEP), Some(StepOutcome::Moved));
        assert_eq!(engine.poll(t0 + STEP), None);
        assert_eq!(engine.state().snake().head(), Position::new(7, 8));
        assert_eq!(engine.state().direction(), Direction::Down);
    }

    #[test]
    fn late_poll_skips_missed_ticks() {
        let mut engine = engine();
        let t0 = Instant::now();
        engine.start(t0);

        assert!(engine.poll(t0 + STEP * 4).is_some());
        assert_eq!(engine.state().snake().head(), Position::new(8, 7));
        assert_eq!(engine.next_tick(), Some(t0 + STEP * 5));
        assert_eq!(engine.poll(t0 + STEP * 4), None);
    }

    #[test]
    fn observers_see_every_tick() {
        let mut engine = engine();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        engine.subscribe(move |snap| sink.borrow_mut().push(snap.snake[0]));

        let t0 = Instant::now();
        engine.start(t0);
        engine.poll(t0 + STEP);
        engine.poll(t0 + STEP * 2);

        assert_eq!(*seen.borrow(), vec![Position::new(8, 7), Position::new(9, 7)]);
    }

    #[test]
    fn completion_fires_once_after_delay() {
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        let config = GameConfig::default();
        let state = GameState::from_parts(
            Snake::new(Position::new(7, 7)),
            Position::new(8, 7),
            Direction::Right,
            1,
        )
        .unwrap();
        let mut engine = TickEngine::resume(
            config,
            state,
            FoodSpawner::seeded(1),
            move || counter.set(counter.get() + 1),
        )
        .unwrap();

        let t0 = Instant::now();
        engine.poll(t0);
        assert_eq!(engine.poll(t0 + STEP), Some(StepOutcome::Completed));
        assert_eq!(engine.next_tick(), None);
        assert_eq!(calls.get(), 0);

        engine.poll(t0 + STEP + Duration::from_millis(999));
        assert_eq!(calls.get(), 0);
        engine.poll(t0 + STEP + Duration::from_secs(1));
        assert_eq!(calls.get(), 1);
        engine.poll(t0 + STEP * 100);
        assert_eq!(calls.get(), 1);
    }

    fn resume_with_food(food: Position, placement: FoodPlacement) -> Result<TickEngine, GameError> {
        let config = GameConfig {
            food_placement: placement,
            ..GameConfig::default()
        };
        let snake = Snake::from_segments(vec![Position::new(7, 7), Position::new(6, 7)])?;
        let state = GameState::from_parts(snake, food, Direction::Right, 1)?;
        TickEngine::resume(config, state, FoodSpawner::seeded(3), || {})
    }

    #[test]
    fn resume_rejects_unreachable_food() {
        for food in [Position::new(99, 99), Position::new(-1, 4), Position::new(3, 15)] {
            let err = resume_with_food(food, FoodPlacement::Uniform).unwrap_err();
            assert!(matches!(err, GameError::InvalidConfig(_)));
        }
    }

    #[test]
    fn resume_rejects_food_under_the_snake_when_avoiding_it() {
        let err = resume_with_food(Position::new(6, 7), FoodPlacement::AvoidSnake).unwrap_err();
        assert!(matches!(err, GameError::InvalidConfig(_)));

        // The uniform policy allows it, as pellets may land there anyway.
        assert!(resume_with_food(Position::new(6, 7), FoodPlacement::Uniform).is_ok());
        assert!(resume_with_food(Position::new(8, 7), FoodPlacement::AvoidSnake).is_ok());
    }

    #[test]
    fn reset_is_refused_unless_lost() {
        let mut engine = engine();
        assert_eq!(engine.reset(), Err(GameError::ResetNotAllowed(Lifecycle::Idle)));
        engine.start(Instant::now());
        assert_eq!(engine.reset(), Err(GameError::ResetNotAllowed(Lifecycle::Playing)));
    }

    #[test]
    fn poll_timeout_tracks_next_tick() {
        let mut engine = engine();
        let t0 = Instant::now();
        let max = Duration::from_millis(50);
        assert_eq!(poll_timeout(&engine, t0, max), max);

        engine.start(t0);
        let now = t0 + STEP - Duration::from_millis(20);
        assert_eq!(poll_timeout(&engine, now, max), Duration::from_millis(20));
    }
}
