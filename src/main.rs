//! TTODO - Terminal To-Do List
//!
//! A terminal to-do list: add, edit, complete, filter and remove items.
//! The list is written to the data directory after every change and read
//! back on the next start.

use anyhow::Context;
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::{Backend, CrosstermBackend},
};
use std::io;
use std::time::Duration;
use tracing::info;

use ttodo::application::App;
use ttodo::config::{Cli, Config};
use ttodo::infrastructure::{FileStore, ITEMS_KEY, StorageHandle};
use ttodo::logging;
use ttodo::presentation::{InputHandler, render_ui};

/// Entry point for the TTODO terminal to-do list.
///
/// Resolves configuration, starts logging and the storage worker, then runs
/// the event loop until the user quits. Outstanding writes are flushed
/// before the process exits.
///
/// # Errors
///
/// Returns an error if configuration is invalid, the storage worker cannot
/// be started, or the terminal cannot be set up.
fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::resolve(&cli).context("failed to load configuration")?;
    let data_dir = config.data_dir()?;
    let _log_guard = logging::init(&config.logging.level, &config.log_file()?);
    info!(data_dir = %data_dir.display(), "starting ttodo");

    let storage = StorageHandle::spawn(FileStore::new(&data_dir), ITEMS_KEY)
        .context("failed to start storage worker")?;
    let mut app = App::new(storage);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let tick_rate = Duration::from_millis(config.ui.tick_rate_ms);
    let res = run_app(&mut terminal, &mut app, tick_rate);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    app.shutdown();
    if let Some(error) = &app.write_error {
        eprintln!("warning: {error}");
    }

    res.context("terminal error")?;
    Ok(())
}

/// Main application event loop.
///
/// Applies storage results, redraws, and waits up to `tick_rate` for a key.
/// Returns once the application has been asked to quit.
fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App, tick_rate: Duration) -> io::Result<()> {
    loop {
        app.tick();
        terminal.draw(|f| render_ui(f, app))?;

        if event::poll(tick_rate)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    InputHandler::handle_key_event(app, key.code, key.modifiers);
                }
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}
