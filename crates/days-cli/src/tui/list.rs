//! The main TUI view: a colorized table of special days.
//!
//! The view never touches the store directly. The event loop feeds it a
//! fresh [`Listing`] snapshot every tick and applies the [`ListAction`]s it
//! returns.

use super::add_dialog::{AddDialog, DialogAction};
use crate::output::format_days;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use days_core::{CAPACITY, Kind, Listing, SpecialDay};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
};
use std::time::{Duration, Instant};

const STATUS_TTL: Duration = Duration::from_secs(4);

/// What the event loop should do after a key press.
#[derive(Debug, PartialEq, Eq)]
pub enum ListAction {
    Quit,
    Add(SpecialDay),
    Persist,
}

/// Row style for each kind.
pub const fn kind_style(kind: Kind) -> Style {
    let color = match kind {
        Kind::Birth => Color::Green,
        Kind::Memo => Color::Red,
        Kind::Countdown => Color::Yellow,
    };
    Style::new().fg(color)
}

pub struct ListView {
    rows: Vec<Listing>,
    table_state: TableState,
    dialog: Option<AddDialog>,
    status_msg: Option<(String, Instant)>,
    /// Entries were added since the last successful save.
    dirty: bool,
    /// A quit was requested with unsaved entries; the next one goes through.
    quit_armed: bool,
}

impl Default for ListView {
    fn default() -> Self {
        Self::new()
    }
}

impl ListView {
    pub fn new() -> Self {
        Self {
            rows: Vec::new(),
            table_state: TableState::default(),
            dialog: None,
            status_msg: None,
            dirty: false,
            quit_armed: false,
        }
    }

    /// Replace the snapshot shown by the table, keeping the selection in range.
    pub fn refresh(&mut self, rows: Vec<Listing>) {
        self.rows = rows;
        let selected = match (self.table_state.selected(), self.rows.len()) {
            (_, 0) => None,
            (None, _) => Some(0),
            (Some(i), len) => Some(i.min(len - 1)),
        };
        self.table_state.select(selected);
    }

    pub fn set_status(&mut self, msg: String) {
        self.status_msg = Some((msg, Instant::now()));
    }

    /// Record that an entry was added to the store.
    pub const fn mark_dirty(&mut self) {
        self.dirty = true;
        self.quit_armed = false;
    }

    /// Record a successful save.
    pub const fn mark_saved(&mut self) {
        self.dirty = false;
        self.quit_armed = false;
    }

    pub fn selected(&self) -> Option<usize> {
        self.table_state.selected()
    }

    // -----------------------------------------------------------------------
    // Input handling
    // -----------------------------------------------------------------------

    pub fn handle_key(&mut self, key: KeyEvent) -> Option<ListAction> {
        if let Some(dialog) = self.dialog.as_mut() {
            return match dialog.handle_key(key)? {
                DialogAction::Submit(day) => {
                    self.dialog = None;
                    Some(ListAction::Add(day))
                }
                DialogAction::Cancel => {
                    self.dialog = None;
                    None
                }
            };
        }

        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('c') if ctrl => Some(ListAction::Quit),
            KeyCode::Char('q') | KeyCode::Esc => self.request_quit(),
            KeyCode::Char('a') => {
                self.dialog = Some(AddDialog::new());
                None
            }
            KeyCode::Char('s') => Some(ListAction::Persist),
            KeyCode::Char('j') | KeyCode::Down => {
                self.select_next();
                None
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.select_prev();
                None
            }
            KeyCode::Char('g') | KeyCode::Home => {
                self.select_edge(false);
                None
            }
            KeyCode::Char('G') | KeyCode::End => {
                self.select_edge(true);
                None
            }
            _ => None,
        }
    }

    fn request_quit(&mut self) -> Option<ListAction> {
        if self.dirty && !self.quit_armed {
            self.quit_armed = true;
            self.set_status("Unsaved entries: press s to save, q again to quit".to_string());
            return None;
        }
        Some(ListAction::Quit)
    }

    fn select_next(&mut self) {
        let len = self.rows.len();
        if len == 0 {
            return;
        }
        let i = self
            .table_state
            .selected()
            .map_or(0, |i| if i + 1 >= len { 0 } else { i + 1 });
        self.table_state.select(Some(i));
    }

    fn select_prev(&mut self) {
        let len = self.rows.len();
        if len == 0 {
            return;
        }
        let i = self
            .table_state
            .selected()
            .map_or(0, |i| if i == 0 { len - 1 } else { i - 1 });
        self.table_state.select(Some(i));
    }

    fn select_edge(&mut self, last: bool) {
        if self.rows.is_empty() {
            return;
        }
        let i = if last { self.rows.len() - 1 } else { 0 };
        self.table_state.select(Some(i));
    }

    // -----------------------------------------------------------------------
    // Rendering
    // -----------------------------------------------------------------------

    pub fn render(&mut self, frame: &mut Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(3), Constraint::Length(3)])
            .split(area);

        self.render_table(frame, chunks[0]);
        self.render_status(frame, chunks[1]);

        if let Some(dialog) = &self.dialog {
            dialog.render(frame, area);
        }
    }

    fn render_table(&mut self, frame: &mut Frame<'_>, area: Rect) {
        let header = Row::new(["No", "Days", "Date", "Name", "Kind"]).style(
            Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::BOLD),
        );

        let rows: Vec<Row<'_>> = self
            .rows
            .iter()
            .map(|row| {
                Row::new([
                    Cell::from((row.index + 1).to_string()),
                    Cell::from(format_days(row.days)),
                    Cell::from(row.day.date().to_string()),
                    Cell::from(row.day.name().to_string()),
                    Cell::from(row.day.kind().label()),
                ])
                .style(kind_style(row.day.kind()))
            })
            .collect();

        let title = format!(" Special Days ({}/{CAPACITY}) ", self.rows.len());
        let table = Table::new(
            rows,
            [
                Constraint::Length(6),
                Constraint::Length(10),
                Constraint::Length(21),
                Constraint::Min(20),
                Constraint::Length(12),
            ],
        )
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .border_style(Style::default().fg(Color::Cyan)),
        )
        .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("► ");

        frame.render_stateful_widget(table, area, &mut self.table_state);
    }

    fn render_status(&self, frame: &mut Frame<'_>, area: Rect) {
        let mut spans = vec![
            Span::styled("a", Style::default().fg(Color::Yellow)),
            Span::raw(" add  "),
            Span::styled("s", Style::default().fg(Color::Yellow)),
            Span::raw(" save  "),
            Span::styled("j/k", Style::default().fg(Color::Yellow)),
            Span::raw(" move  "),
            Span::styled("q", Style::default().fg(Color::Yellow)),
            Span::raw(" quit"),
        ];
        if self.dirty {
            spans.push(Span::styled("  [unsaved]", Style::default().fg(Color::Red)));
        }

        if let Some((msg, time)) = &self.status_msg {
            if time.elapsed() < STATUS_TTL {
                spans.push(Span::raw("  |  "));
                spans.push(Span::styled(msg.clone(), Style::default().fg(Color::Cyan)));
            }
        }

        let p = Paragraph::new(Line::from(spans)).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        );
        frame.render_widget(p, area);
    }

    #[cfg(test)]
    fn status(&self) -> Option<&str> {
        self.status_msg.as_ref().map(|(msg, _)| msg.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use days_core::SpecialDayStore;
    use ratatui::{Terminal, backend::TestBackend};
    use std::io::Cursor;

    fn rows(count: usize) -> Vec<Listing> {
        let mut store = SpecialDayStore::new(Cursor::new(Vec::<u8>::new()));
        for i in 0..count {
            let kind = Kind::ALL[i % 3];
            store
                .add(SpecialDay::new("2020-01-01", format!("day {i}"), kind).unwrap())
                .unwrap();
        }
        store.list_at(&Utc.with_ymd_and_hms(2020, 1, 11, 0, 0, 0).unwrap())
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::from(code)
    }

    #[test]
    fn navigation_wraps() {
        let mut view = ListView::new();
        view.refresh(rows(3));
        assert_eq!(view.selected(), Some(0));

        view.handle_key(key(KeyCode::Char('k')));
        assert_eq!(view.selected(), Some(2));
        view.handle_key(key(KeyCode::Char('j')));
        assert_eq!(view.selected(), Some(0));
        view.handle_key(key(KeyCode::End));
        assert_eq!(view.selected(), Some(2));
    }

    #[test]
    fn refresh_clamps_selection() {
        let mut view = ListView::new();
        view.refresh(rows(3));
        view.handle_key(key(KeyCode::Char('G')));
        view.refresh(rows(1));
        assert_eq!(view.selected(), Some(0));
        view.refresh(Vec::new());
        assert_eq!(view.selected(), None);
    }

    #[test]
    fn save_and_quit_keys() {
        let mut view = ListView::new();
        assert_eq!(view.handle_key(key(KeyCode::Char('s'))), Some(ListAction::Persist));
        assert_eq!(view.handle_key(key(KeyCode::Char('q'))), Some(ListAction::Quit));
        assert_eq!(
            view.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Some(ListAction::Quit)
        );
    }

    #[test]
    fn quitting_with_unsaved_entries_needs_confirmation() {
        let mut view = ListView::new();
        view.mark_dirty();
        assert_eq!(view.handle_key(key(KeyCode::Char('q'))), None);
        assert!(view.status().unwrap().contains("Unsaved"));
        assert_eq!(view.handle_key(key(KeyCode::Char('q'))), Some(ListAction::Quit));

        view.mark_saved();
        assert_eq!(view.handle_key(key(KeyCode::Char('q'))), Some(ListAction::Quit));
    }

    #[test]
    fn add_dialog_produces_add_action() {
        let mut view = ListView::new();
        assert_eq!(view.handle_key(key(KeyCode::Char('a'))), None);
        // keys go to the dialog now, so 'q' is text
        for c in "2020-02-02".chars() {
            assert_eq!(view.handle_key(key(KeyCode::Char(c))), None);
        }
        view.handle_key(key(KeyCode::Tab));
        for c in "quiz".chars() {
            assert_eq!(view.handle_key(key(KeyCode::Char(c))), None);
        }

        let action = view.handle_key(key(KeyCode::Enter));
        let expected = SpecialDay::new("2020-02-02", "quiz", Kind::Memo).unwrap();
        assert_eq!(action, Some(ListAction::Add(expected)));
        assert!(view.dialog.is_none());
    }

    #[test]
    fn renders_rows_with_counts() {
        let mut view = ListView::new();
        let mut listing = rows(2);
        listing.push(Listing {
            index: 2,
            day: SpecialDay::new("abc", "broken", Kind::Memo).unwrap(),
            days: days_core::date::UNPARSEABLE_DAYS,
        });
        view.refresh(listing);

        let mut terminal = Terminal::new(TestBackend::new(90, 12)).unwrap();
        terminal.draw(|frame| {
            let area = frame.area();
            view.render(frame, area);
        }).unwrap();

        let screen: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect();
        assert!(screen.contains("Special Days (3/32)"));
        assert!(screen.contains("day 1"));
        assert!(screen.contains("anniversary"));
        assert!(screen.contains("broken"));
    }

    #[test]
    fn kind_styles_are_distinct() {
        let styles: Vec<_> = Kind::ALL.into_iter().map(kind_style).collect();
        assert_ne!(styles[0], styles[1]);
        assert_ne!(styles[1], styles[2]);
        assert_ne!(styles[0], styles[2]);
    }
}
