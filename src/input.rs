use crossterm::event::KeyCode;
use log::trace;

use crate::game::{Direction, Lifecycle};

/// What a key press did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    /// Not an arrow key, or the round is over.
    Ignored,
    /// Would reverse the snake into itself; discarded.
    Rejected { requested: Direction, starts_game: bool },
    /// Stored as the pending direction for the next tick.
    Queued { direction: Direction, starts_game: bool },
}

impl KeyOutcome {
    pub fn starts_game(self) -> bool {
        match self {
            KeyOutcome::Ignored => false,
            KeyOutcome::Rejected { starts_game, .. } | KeyOutcome::Queued { starts_game, .. } => {
                starts_game
            }
        }
    }
}

pub fn direction_for(code: KeyCode) -> Option<Direction> {
    match code {
        KeyCode::Up => Some(Direction::Up),
        KeyCode::Down => Some(Direction::Down),
        KeyCode::Left => Some(Direction::Left),
        KeyCode::Right => Some(Direction::Right),
        _ => None,
    }
}

/// Turns arrow keys into a pending direction.
///
/// Holds a single slot: newer input overwrites older input until the next
/// tick takes it.
#[derive(Debug, Default, Clone)]
pub struct InputController {
    pending: Option<Direction>,
}

impl InputController {
    pub fn new() -> Self {
        Self::default()
    }

    /// `committed` is the direction applied on the last tick; reversal is
    /// judged against it, not against whatever is pending.
    pub fn handle_key(
        &mut self,
        code: KeyCode,
        committed: Direction,
        lifecycle: Lifecycle,
    ) -> KeyOutcome {
        let Some(direction) = direction_for(code) else {
            return KeyOutcome::Ignored;
        };
        if lifecycle.is_terminal() {
            return KeyOutcome::Ignored;
        }

        let starts_game = lifecycle == Lifecycle::Idle;
        if direction == committed.opposite() {
            trace!("rejected reversal {:?} while heading {:?}", direction, committed);
            return KeyOutcome::Rejected {
                requested: direction,
                starts_game,
            };
        }

        self.pending = Some(direction);
        KeyOutcome::Queued {
            direction,
            starts_game,
        }
    }

    pub fn pending(&self) -> Option<Direction> {
        self.pending
    }

    /// Empties the slot; called once per tick.
    pub fn take_pending(&mut self) -> Option<Direction> {
        self.pending.take()
    }
}
