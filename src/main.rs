mod clock;
mod collision;
mod config;
mod entity;
mod error;
mod render;
mod score;
mod session;
mod sound;
mod spawner;

use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEventKind},
    execute, terminal,
};
use log::{info, trace};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::fs::File;
use std::io::{self, Stdout, stdout};
use std::path::Path;
use std::time::{Duration, Instant};

use crate::clock::{Action, Scheduler};
use crate::config::{CONFIG_FILE, GameConfig};
use crate::error::{AppError, ConfigError};
use crate::render::Renderer;
use crate::score::FileStore;
use crate::session::Session;
use crate::sound::Sound;

const FRAME: Duration = Duration::from_millis(33); // ~30 fps
/// Longest gap fed to the tickers at once, e.g. after the process was suspended.
const MAX_FRAME_DELTA: Duration = Duration::from_millis(250);

fn init_logging(config: &GameConfig) -> Result<(), ConfigError> {
    let level = config.log_filter()?;
    // The terminal belongs to the game, so logs only go to a file.
    match File::create(&config.log_path) {
        Ok(file) => {
            env_logger::Builder::new()
                .filter_level(level)
                .format_timestamp_millis()
                .target(env_logger::Target::Pipe(Box::new(file)))
                .init();
        }
        Err(err) => eprintln!(
            "logging disabled, cannot open {}: {err}",
            config.log_path.display()
        ),
    }
    Ok(())
}

fn main() -> Result<(), AppError> {
    let config = GameConfig::load(Path::new(CONFIG_FILE))?;
    init_logging(&config)?;

    let seed = config.seed.unwrap_or_else(rand::random);
    info!("starting with {config:?}, seed {seed}");
    let mut rng = StdRng::seed_from_u64(seed);

    let store = FileStore::new(&config.high_score_path);
    let mut session = Session::new(config.clone(), store);
    let mut scheduler = Scheduler::new(&config);
    let sound = Sound::open();

    terminal::enable_raw_mode()?;
    let mut out = stdout();
    execute!(
        out,
        terminal::EnterAlternateScreen,
        cursor::Hide,
        terminal::DisableLineWrap,
    )?;

    let result = run(&mut out, &mut session, &mut scheduler, &sound, &mut rng);
    cleanup(&mut out)?;
    info!("quit");
    result.map_err(AppError::from)
}

fn cleanup(out: &mut Stdout) -> io::Result<()> {
    execute!(
        out,
        terminal::LeaveAlternateScreen,
        cursor::Show,
        terminal::EnableLineWrap,
    )?;
    terminal::disable_raw_mode()
}

fn run(
    out: &mut Stdout,
    session: &mut Session<FileStore>,
    scheduler: &mut Scheduler,
    sound: &Sound,
    rng: &mut StdRng,
) -> io::Result<()> {
    let (cols, rows) = terminal::size()?;
    let mut renderer = Renderer::new(cols as usize, rows as usize * 2);
    let mut frame: u64 = 0;
    let mut last = Instant::now();

    loop {
        let frame_start = Instant::now();

        // Input
        while event::poll(Duration::ZERO)? {
            match event::read()? {
                Event::Key(key) if key.kind != KeyEventKind::Release => match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                    KeyCode::Char(' ') | KeyCode::Up | KeyCode::Enter => {
                        scheduler.push(Action::Jump);
                    }
                    _ => {}
                },
                Event::Resize(c, r) => renderer.resize(c as usize, r as usize * 2),
                _ => {}
            }
        }

        // Update
        let now = Instant::now();
        let elapsed = now.duration_since(last).min(MAX_FRAME_DELTA);
        last = now;
        let events = scheduler.run(session, elapsed, rng);
        trace!(
            "frame {frame}: {} ticks, {} spawns",
            events.ticks, events.spawns
        );
        if events.crashed {
            sound.crash();
            if events.new_high_score {
                sound.high_score();
            }
        } else if events.flapped || events.restarted {
            sound.flap();
        }

        // Render
        renderer.draw(&session.snapshot(), frame, out)?;
        frame += 1;

        // Frame pacing
        let spent = frame_start.elapsed();
        if spent < FRAME {
            std::thread::sleep(FRAME - spent);
        }
    }
}
