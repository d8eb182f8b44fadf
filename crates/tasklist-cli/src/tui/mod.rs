//! Terminal user interface (TUI) for the to-do list.
//!
//! ## Entry points
//!
//! - [`run_ui`]: full-screen list with the new-task input and in-place editing.

pub mod app;
pub mod input;
pub mod list;
pub mod row;

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io::{self, Stdout};
use std::time::{Duration, Instant};
use tasklist_core::config::Config;

use app::App;

/// Launch the interactive TUI and block until the user quits.
///
/// # Errors
///
/// Returns an error if the terminal cannot be put into raw mode or drawing
/// fails. The terminal is restored on every exit path.
pub fn run_ui(config: &Config) -> Result<()> {
    enable_raw_mode().context("failed to enable raw mode")?;
    let mut stdout = io::stdout();
    if let Err(err) = execute!(stdout, EnterAlternateScreen) {
        disable_raw_mode().ok();
        return Err(err).context("failed to enter alternate screen");
    }

    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    let result = Terminal::new(CrosstermBackend::new(stdout))
        .context("failed to create terminal")
        .and_then(|mut terminal| {
            let loop_result = run_event_loop(&mut terminal, config);
            disable_raw_mode().ok();
            execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
            terminal.show_cursor().ok();
            loop_result
        });

    disable_raw_mode().ok();
    result
}

fn run_event_loop(terminal: &mut Terminal<CrosstermBackend<Stdout>>, config: &Config) -> Result<()> {
    let mut app = App::new(config);
    let tick_rate = Duration::from_millis(config.ui.tick_ms.max(10));
    let mut last_tick = Instant::now();
    tracing::info!(tick_ms = config.ui.tick_ms, "tui started");

    loop {
        terminal
            .draw(|frame| app.render(frame))
            .context("failed to draw frame")?;
        if app.should_quit() {
            break;
        }

        let timeout = tick_rate.checked_sub(last_tick.elapsed()).unwrap_or_default();
        if event::poll(timeout).context("failed to poll terminal events")? {
            if let Event::Key(key) = event::read().context("failed to read terminal event")? {
                if key.kind == KeyEventKind::Press {
                    app.handle_key(key);
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
            app.tick();
            last_tick = Instant::now();
        }
    }

    tracing::info!(tasks = app.task_count(), "tui stopped");
    Ok(())
}
