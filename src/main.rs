use std::cell::Cell;
use std::fs::File;
use std::io::{stdout, Stdout};
use std::path::PathBuf;
use std::rc::Rc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use crossterm::{
    cursor::{Hide, Show},
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};
use log::{error, info, LevelFilter};
use simplelog::{Config, WriteLogger};

use snekgate::engine::poll_timeout;
use snekgate::render::{draw, frame_lines};
use snekgate::{FoodPlacement, FoodSpawner, GameConfig, Lifecycle, TickEngine};

const INPUT_POLL: Duration = Duration::from_millis(50);

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Placement {
    /// Food may land under the snake
    Uniform,
    /// Food only lands on free cells
    AvoidSnake,
}

impl From<Placement> for FoodPlacement {
    fn from(p: Placement) -> Self {
        match p {
            Placement::Uniform => FoodPlacement::Uniform,
            Placement::AvoidSnake => FoodPlacement::AvoidSnake,
        }
    }
}

/// Eat five pellets to get in.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Seed for food placement, for reproducible runs
    #[arg(long)]
    seed: Option<u64>,
    #[arg(long, value_enum, default_value_t = Placement::AvoidSnake)]
    food_placement: Placement,
    /// Where to write the log; the terminal is busy drawing the game
    #[arg(long, default_value = "snekgate.log")]
    log_file: PathBuf,
    #[arg(long, default_value_t = LevelFilter::Info)]
    log_level: LevelFilter,
}

/// Puts the terminal back the way it was, even on early return.
struct TerminalGuard {
    out: Stdout,
}

impl TerminalGuard {
    fn enter() -> Result<Self> {
        terminal::enable_raw_mode().context("failed to enable raw mode")?;
        let mut out = stdout();
        execute!(out, EnterAlternateScreen, Hide).context("failed to enter alternate screen")?;
        Ok(TerminalGuard { out })
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        if let Err(err) = execute!(self.out, Show, LeaveAlternateScreen) {
            error!("failed to leave alternate screen: {}", err);
        }
        if let Err(err) = terminal::disable_raw_mode() {
            error!("failed to disable raw mode: {}", err);
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let log_file = File::create(&args.log_file)
        .with_context(|| format!("failed to create log file {}", args.log_file.display()))?;
    WriteLogger::init(args.log_level, Config::default(), log_file)
        .context("failed to initialize logger")?;
    info!("starting snekgate");

    let placement = FoodPlacement::from(args.food_placement);
    let spawner = match args.seed {
        Some(seed) => FoodSpawner::seeded(seed),
        None => FoodSpawner::new(),
    };
    let config = GameConfig {
        food_placement: placement,
        ..GameConfig::default()
    };

    let unlocked = Rc::new(Cell::new(false));
    let flag = Rc::clone(&unlocked);
    let mut engine = TickEngine::new(config, spawner, move || flag.set(true))?;

    {
        let mut term = TerminalGuard::enter()?;
        run(&mut engine, &mut term.out, &unlocked)?;
    }

    if unlocked.get() {
        println!("// access granted");
        println!("// welcome in");
    } else {
        println!(
            "\n// {} with {} food left, complete the game to continue",
            engine.lifecycle(),
            engine.state().remaining_food()
        );
    }
    info!("exiting");
    Ok(())
}

fn run(engine: &mut TickEngine, out: &mut Stdout, unlocked: &Cell<bool>) -> Result<()> {
    let mut dirty = true;
    loop {
        if dirty {
            draw(out, &frame_lines(&engine.snapshot(), engine.config()))
                .context("failed to draw frame")?;
            dirty = false;
        }

        let timeout = poll_timeout(engine, Instant::now(), INPUT_POLL);
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                let now = Instant::now();
                match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                    KeyCode::Char(' ') | KeyCode::Enter => dirty |= engine.start(now),
                    KeyCode::Char('r') if engine.lifecycle() == Lifecycle::GameOver => {
                        engine.reset()?;
                        dirty = true;
                    }
                    code => {
                        engine.handle_key(code, now);
                        dirty = true;
                    }
                }
            }
        }

        if engine.poll(Instant::now()).is_some() {
            dirty = true;
        }
        if unlocked.get() {
            return Ok(());
        }
    }
}
