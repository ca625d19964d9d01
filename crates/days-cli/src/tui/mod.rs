//! Terminal user interface for days.
//!
//! ## Entry points
//!
//! - [`run_tui`]: full-screen table of special days with an add dialog.

pub mod add_dialog;
pub mod list;

use anyhow::Context;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use days_core::{SpecialDayStore, StoreError};
use list::{ListAction, ListView};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io::{self, Read, Seek, Stdout, Write};
use std::time::Duration;
use tracing::{debug, info};

type Term = Terminal<CrosstermBackend<Stdout>>;

/// Restores the terminal when dropped, including on early return.
struct TerminalGuard;

impl TerminalGuard {
    fn enter() -> anyhow::Result<Self> {
        enable_raw_mode().context("Failed to enable raw mode")?;
        execute!(io::stdout(), EnterAlternateScreen).context("Failed to enter alternate screen")?;
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

/// Run the interactive view until the user quits.
///
/// The table is redrawn every `tick` so day counts stay current across
/// midnight. Entries added in the dialog stay in memory until `s` saves them.
pub fn run_tui<B: Read + Write + Seek>(
    store: &mut SpecialDayStore<B>,
    tick: Duration,
) -> anyhow::Result<()> {
    let guard = TerminalGuard::enter()?;
    let mut terminal = Terminal::new(CrosstermBackend::new(io::stdout()))
        .context("Failed to initialize terminal")?;

    let result = event_loop(&mut terminal, store, tick);

    drop(guard);
    terminal.show_cursor().ok();
    result
}

fn event_loop<B: Read + Write + Seek>(
    terminal: &mut Term,
    store: &mut SpecialDayStore<B>,
    tick: Duration,
) -> anyhow::Result<()> {
    let mut view = ListView::new();

    loop {
        view.refresh(store.list());
        terminal.draw(|frame| {
            let area = frame.area();
            view.render(frame, area);
        })?;

        if !event::poll(tick)? {
            continue;
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        let Some(action) = view.handle_key(key) else {
            continue;
        };
        match action {
            ListAction::Quit => {
                info!("leaving interactive view");
                return Ok(());
            }
            ListAction::Add(day) => {
                let name = day.name().to_string();
                match store.add(day) {
                    Ok(index) => {
                        debug!(index, "entry added from dialog");
                        view.mark_dirty();
                        view.set_status(format!("Added #{}: {name}", index + 1));
                    }
                    Err(err) => view.set_status(error_status(&err)),
                }
            }
            ListAction::Persist => match store.persist_all() {
                Ok(()) => {
                    view.mark_saved();
                    view.set_status(format!("Saved {} entries", store.len()));
                }
                Err(err) => view.set_status(error_status(&err)),
            },
        }
        // Log lines on stderr share the screen; repaint from scratch.
        terminal.clear()?;
    }
}

/// Status bar text for a failed store operation.
fn error_status(err: &StoreError) -> String {
    let code = err.code();
    format!("{} [{code}]: {err}", code.message())
}

#[cfg(test)]
mod tests {
    use super::*;
    use days_core::CAPACITY;

    #[test]
    fn error_status_names_code_and_summary() {
        let status = error_status(&StoreError::CapacityExceeded { capacity: CAPACITY });
        assert_eq!(
            status,
            "Special day capacity exceeded [E2001]: cannot add more than 32 special days"
        );
    }
}
