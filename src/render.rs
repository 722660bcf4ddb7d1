use std::io::{self, Write};

use crossterm::{
    cursor::MoveTo,
    queue,
    style::Print,
    terminal::{Clear, ClearType},
};

use crate::config::GameConfig;
use crate::game::{Lifecycle, Position, Snapshot};

const WALL: char = '#';
const HEAD: char = 'O';
const BODY: char = 'o';
const FOOD: char = '*';
const PIP_LEFT: char = '■';
const PIP_EATEN: char = '□';

/// Lays out one frame as plain lines, top to bottom.
pub fn frame_lines(snapshot: &Snapshot, config: &GameConfig) -> Vec<String> {
    let n = i32::from(config.grid_size);
    let cell = usize::from(config.cell_width.max(1));
    let width = usize::from(config.grid_size) * cell + 2;
    let border: String = std::iter::repeat(WALL).take(width).collect();

    let mut lines = Vec::with_capacity(usize::from(config.grid_size) + 6);
    lines.push(border.clone());
    for y in 0..n {
        let mut row = String::with_capacity(width);
        row.push(WALL);
        for x in 0..n {
            let glyph = glyph_at(snapshot, Position::new(x, y));
            row.push(glyph);
            row.extend(std::iter::repeat(' ').take(cell - 1));
        }
        row.push(WALL);
        lines.push(row);
    }
    lines.push(border);

    lines.push(status_line(snapshot.lifecycle).to_string());
    lines.push(format!(
        "{} // food left",
        food_pips(snapshot.remaining_food, config.initial_food_count)
    ));
    lines.push("// use keyboard // arrows to play".to_string());
    lines.push(hint_line(snapshot.lifecycle).to_string());
    lines
}

fn glyph_at(snapshot: &Snapshot, pos: Position) -> char {
    if snapshot.snake.first() == Some(&pos) {
        HEAD
    } else if snapshot.snake.contains(&pos) {
        BODY
    } else if snapshot.food == Some(pos) {
        FOOD
    } else {
        ' '
    }
}

pub fn status_line(lifecycle: Lifecycle) -> &'static str {
    match lifecycle {
        Lifecycle::Idle => "Press arrow keys to start",
        Lifecycle::Playing => "",
        Lifecycle::GameOver => "Game Over! Press r to retry",
        Lifecycle::Complete => "Game Complete! ✓",
    }
}

fn hint_line(lifecycle: Lifecycle) -> &'static str {
    match lifecycle {
        Lifecycle::Idle => "space: start-game  q: quit",
        Lifecycle::GameOver => "r: retry  q: quit",
        Lifecycle::Playing | Lifecycle::Complete => "q: quit",
    }
}

pub fn food_pips(remaining: u32, total: u32) -> String {
    (0..total)
        .map(|i| if i < remaining { PIP_LEFT } else { PIP_EATEN })
        .collect()
}

/// Writes a frame to `out`, replacing whatever was on screen.
pub fn draw<W: Write>(out: &mut W, lines: &[String]) -> io::Result<()> {
    queue!(out, Clear(ClearType::All))?;
    for (row, line) in lines.iter().enumerate() {
        let row = u16::try_from(row).unwrap_or(u16::MAX);
        queue!(out, MoveTo(0, row), Print(line))?;
    }
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::Direction;

    fn snapshot(snake: Vec<Position>, food: Option<Position>, lifecycle: Lifecycle) -> Snapshot {
        Snapshot {
            snake,
            food,
            direction: Direction::Right,
            pending: None,
            remaining_food: 3,
            lifecycle,
        }
    }

    fn small_config() -> GameConfig {
        GameConfig {
            grid_size: 3,
            cell_width: 1,
            initial_snake_position: Position::new(1, 1),
            initial_food: None,
            initial_food_count: 5,
            ..GameConfig::default()
        }
    }

    #[test]
    fn grid_shows_head_body_and_food() {
        let snap = snapshot(
            vec![Position::new(1, 1), Position::new(0, 1)],
            Some(Position::new(2, 0)),
            Lifecycle::Playing,
        );
        let lines = frame_lines(&snap, &small_config());
        assert_eq!(&lines[..5], ["#####", "#  *#", "#oO #", "#   #", "#####"]);
    }

    #[test]
    fn snake_is_drawn_over_food() {
        let snap = snapshot(
            vec![Position::new(0, 0)],
            Some(Position::new(0, 0)),
            Lifecycle::Playing,
        );
        let lines = frame_lines(&snap, &small_config());
        assert_eq!(lines[1], "#O  #");
    }

    #[test]
    fn wide_cells_pad_each_glyph() {
        let config = GameConfig {
            cell_width: 2,
            ..small_config()
        };
        let snap = snapshot(vec![Position::new(0, 0)], None, Lifecycle::Playing);
        let lines = frame_lines(&snap, &config);
        assert_eq!(lines[0].chars().count(), 8);
        assert_eq!(lines[1], "#O     #");
    }

    #[test]
    fn status_follows_lifecycle() {
        let snap = snapshot(vec![Position::new(0, 0)], None, Lifecycle::GameOver);
        let lines = frame_lines(&snap, &small_config());
        assert_eq!(lines[5], "Game Over! Press r to retry");
        assert_eq!(lines[6], "■■■□□ // food left");
    }

    #[test]
    fn draw_writes_every_line() {
        let lines = vec!["abc".to_string(), "def".to_string()];
        let mut out = Vec::new();
        draw(&mut out, &lines).unwrap();
        let text = String::from_utf8_lossy(&out);
        assert!(text.contains("abc") && text.contains("def"));
    }
}
