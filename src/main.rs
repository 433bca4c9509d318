// ============================================================================
// TERMNOTES - plain-text notes in a terminal
// ============================================================================
//
// MODULE STRUCTURE:
// 1. config      - Data directory, file locations and fixed tuning values
// 2. error       - NoteError taxonomy
// 3. store       - Notes as <id>.txt files in one directory
// 4. favorites   - Persisted favorite ids
// 5. order       - Favorites-first, day-grouped visual order
// 6. cursor      - Selection by identity over the visual order
// 7. autosave    - Debounced writes of the open note
// 8. session     - Application state: mode, overlays, every user operation
// 9. ui          - Key routing and drawing
//
// This file owns process setup: logging, the terminal, and the event loop.
// ============================================================================

mod autosave;
mod config;
mod cursor;
mod error;
mod favorites;
mod order;
mod session;
mod store;
mod ui;

use std::io;
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use crate::config::{Config, LOG_ENV};
use crate::session::Session;
use crate::ui::App;

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {err:?}");
    }
}

fn run() -> Result<()> {
    let config = Config::resolve()?;
    config.ensure_dirs()?;
    let _log_guard = init_logging(&config);
    let session = Session::open(&config)?;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, App::new(session));

    disable_raw_mode().ok();
    execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
    terminal.show_cursor().ok();

    res
}

/// Logs go to a file: stdout belongs to the alternate screen.
fn init_logging(config: &Config) -> Option<WorkerGuard> {
    let dir = config.log_file.parent().unwrap_or(&config.base_dir);
    let file_name = config
        .log_file
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "termnotes.log".into());
    let file_appender = tracing_appender::rolling::never(dir, file_name);
    let (writer, guard) = tracing_appender::non_blocking(file_appender);
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    match tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .try_init()
    {
        Ok(()) => Some(guard),
        Err(_) => None,
    }
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, mut app: App) -> Result<()> {
    let res = event_loop(terminal, &mut app);
    // Flush the editor and favorites even when the loop bailed out with an error.
    app.session.shutdown();
    res
}

fn event_loop(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();

    loop {
        terminal.draw(|frame| ui::draw(frame, app))?;

        let mut timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::from_secs(0));
        // Wake up in time for a pending autosave.
        if let Some(deadline) = app.session.next_deadline() {
            timeout = timeout.min(deadline.saturating_duration_since(Instant::now()));
        }

        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    if ui::handle_key(app, key, Instant::now()) {
                        return Ok(());
                    }
                }
                Event::Resize(_, _) => {}
                _ => {}
            }
        }

        app.session.tick(Instant::now());

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }
    }
}
