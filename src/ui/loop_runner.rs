//! Main event loop for the TUI.
//!
//! Multiplexes terminal input and shutdown signals, feeds each event to the
//! [`App`] and redraws only when something changed.

use crate::app::{App, AppEvent, Flow, WHEEL_SCROLL_LINES};
use anyhow::{Context as _, Result};
use crossterm::{
    event::{
        DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind, MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::StreamExt;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, Stdout};

#[cfg(unix)]
use tokio::signal::unix::{signal, SignalKind};

use super::render::render;

/// Runs the reading session until the user quits.
///
/// Uses `tokio::select!` over SIGTERM, SIGINT and crossterm's async event
/// stream. A synthetic resize from the current terminal size starts the
/// session so the first frame has content.
///
/// Installs a panic hook that restores terminal state before unwinding. The
/// terminal is also restored before a render error is returned.
pub async fn run(app: &mut App) -> Result<()> {
    // Install panic hook BEFORE setting up terminal
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
        original_hook(panic_info);
    }));

    let mut terminal = setup_terminal()?;
    let result = event_loop(&mut terminal, app).await;
    restore_terminal(terminal)?;
    result
}

async fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    app: &mut App,
) -> Result<()> {
    let mut event_stream = crossterm::event::EventStream::new();

    // Signal handlers for graceful shutdown (Unix only)
    #[cfg(unix)]
    let mut sigterm = signal(SignalKind::terminate())?;
    #[cfg(unix)]
    let mut sigint = signal(SignalKind::interrupt())?;

    let size = terminal.size()?;
    app.handle_event(AppEvent::Resize {
        width: size.width,
        height: size.height,
    })
    .context("Failed to render entry")?;
    let mut needs_redraw = true;

    loop {
        if needs_redraw {
            terminal.draw(|f| render(f, app))?;
            needs_redraw = false;
        }

        #[cfg(unix)]
        let sigterm_fut = sigterm.recv();
        #[cfg(not(unix))]
        let sigterm_fut = std::future::pending::<Option<()>>();

        #[cfg(unix)]
        let sigint_fut = sigint.recv();
        #[cfg(not(unix))]
        let sigint_fut = std::future::pending::<Option<()>>();

        tokio::select! {
            biased;

            _ = sigterm_fut => {
                tracing::info!("Received SIGTERM, shutting down gracefully");
                break;
            }

            _ = sigint_fut => {
                tracing::info!("Received SIGINT, shutting down gracefully");
                break;
            }

            maybe_event = event_stream.next() => {
                let event = match maybe_event {
                    Some(Ok(event)) => event,
                    Some(Err(e)) => {
                        tracing::warn!(error = %e, "Terminal event error");
                        continue;
                    }
                    // input closed
                    None => break,
                };
                let Some(app_event) = translate_event(app, &event) else {
                    continue;
                };
                needs_redraw = true;
                match app.handle_event(app_event).context("Failed to render entry")? {
                    Flow::Quit => break,
                    Flow::Continue => {}
                }
            }
        }
    }

    Ok(())
}

/// Map a terminal event to a session event, if it means anything here.
pub(crate) fn translate_event(app: &App, event: &Event) -> Option<AppEvent> {
    match event {
        Event::Key(key) if key.kind != KeyEventKind::Release => app
            .keybindings
            .action_for_key(key.code, key.modifiers, app.key_context())
            .map(AppEvent::Key),
        Event::Resize(width, height) => Some(AppEvent::Resize {
            width: *width,
            height: *height,
        }),
        Event::Mouse(mouse) => match mouse.kind {
            MouseEventKind::ScrollUp => Some(AppEvent::Scroll(-WHEEL_SCROLL_LINES)),
            MouseEventKind::ScrollDown => Some(AppEvent::Scroll(WHEEL_SCROLL_LINES)),
            _ => None,
        },
        _ => None,
    }
}

/// Set up the terminal for TUI rendering.
fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

/// Restore terminal to normal state.
fn restore_terminal(mut terminal: Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;
    Ok(())
}
