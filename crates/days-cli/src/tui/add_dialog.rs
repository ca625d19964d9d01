//! TUI dialog for adding a special day.
//!
//! Pressing `a` in the list view opens this overlay:
//!
//! - **Tab** / **Shift-Tab** move between the date, name and kind fields
//! - **Left** / **Right** cycle the kind while the kind field is focused
//! - **Enter** validates and submits
//! - **Esc** cancels

use crossterm::event::{KeyCode, KeyEvent};
use days_core::date;
use days_core::{Kind, SpecialDay};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};

/// The action the dialog wants the caller to take.
#[derive(Debug, PartialEq, Eq)]
pub enum DialogAction {
    /// Add this day to the store.
    Submit(SpecialDay),
    /// The user cancelled; close the dialog.
    Cancel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
    Date,
    Name,
    Kind,
}

impl Focus {
    const fn next(self) -> Self {
        match self {
            Self::Date => Self::Name,
            Self::Name => Self::Kind,
            Self::Kind => Self::Date,
        }
    }

    const fn prev(self) -> Self {
        match self {
            Self::Date => Self::Kind,
            Self::Name => Self::Date,
            Self::Kind => Self::Name,
        }
    }
}

/// Overlay dialog collecting the three fields of a new day.
pub struct AddDialog {
    date: String,
    name: String,
    kind: Kind,
    focus: Focus,
    error: Option<String>,
}

impl Default for AddDialog {
    fn default() -> Self {
        Self::new()
    }
}

impl AddDialog {
    pub const fn new() -> Self {
        Self {
            date: String::new(),
            name: String::new(),
            kind: Kind::Memo,
            focus: Focus::Date,
            error: None,
        }
    }

    // -----------------------------------------------------------------------
    // Input handling
    // -----------------------------------------------------------------------

    /// Feed a key event to the dialog.
    ///
    /// Returns `Some(DialogAction)` when the dialog is complete (caller should
    /// close the overlay), or `None` while the user is still editing.
    pub fn handle_key(&mut self, key: KeyEvent) -> Option<DialogAction> {
        match key.code {
            KeyCode::Esc => Some(DialogAction::Cancel),
            KeyCode::Enter => self.submit(),
            KeyCode::Tab | KeyCode::Down => {
                self.focus = self.focus.next();
                None
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.focus = self.focus.prev();
                None
            }
            KeyCode::Left if self.focus == Focus::Kind => {
                self.kind = self.kind.prev();
                None
            }
            KeyCode::Right | KeyCode::Char(' ') if self.focus == Focus::Kind => {
                self.kind = self.kind.next();
                None
            }
            KeyCode::Backspace => {
                if let Some(text) = self.focused_text() {
                    text.pop();
                }
                self.error = None;
                None
            }
            KeyCode::Char(c) => {
                if let Some(text) = self.focused_text() {
                    text.push(c);
                }
                self.error = None;
                None
            }
            _ => None,
        }
    }

    fn focused_text(&mut self) -> Option<&mut String> {
        match self.focus {
            Focus::Date => Some(&mut self.date),
            Focus::Name => Some(&mut self.name),
            Focus::Kind => None,
        }
    }

    fn submit(&mut self) -> Option<DialogAction> {
        let name = self.name.trim();
        if name.is_empty() {
            self.error = Some("name is required".to_string());
            self.focus = Focus::Name;
            return None;
        }
        let date_text = self.date.trim();
        if let Err(err) = date::parse(date_text) {
            self.error = Some(err.to_string());
            self.focus = Focus::Date;
            return None;
        }
        match SpecialDay::new(date_text, name, self.kind) {
            Ok(day) => Some(DialogAction::Submit(day)),
            Err(err) => {
                self.error = Some(err.to_string());
                None
            }
        }
    }

    // -----------------------------------------------------------------------
    // Rendering
    // -----------------------------------------------------------------------

    /// Render the dialog as a centered overlay on top of `area`.
    pub fn render(&self, frame: &mut Frame<'_>, area: Rect) {
        let dialog_w: u16 = 60.min(area.width.saturating_sub(4));
        let dialog_h: u16 = 13.min(area.height.saturating_sub(2));
        let dialog_area = Rect {
            x: area.x + area.width.saturating_sub(dialog_w) / 2,
            y: area.y + area.height.saturating_sub(dialog_h) / 2,
            width: dialog_w,
            height: dialog_h,
        };

        frame.render_widget(Clear, dialog_area);

        let block = Block::default()
            .borders(Borders::ALL)
            .title(" Add Special Day ")
            .title_style(
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            )
            .style(Style::default().bg(Color::Black));
        let inner = block.inner(dialog_area);
        frame.render_widget(block, dialog_area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Min(1),
            ])
            .split(inner);

        let field = |title: &'static str, value: String, focused: bool| {
            let border = if focused { Color::Yellow } else { Color::DarkGray };
            Paragraph::new(value)
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .title(title)
                        .border_style(Style::default().fg(border)),
                )
                .style(Style::default().fg(Color::White))
        };
        let cursor = |text: &str, focused: bool| {
            if focused {
                format!("{text}_")
            } else {
                text.to_string()
            }
        };

        frame.render_widget(
            field(
                " Date (YYYY-MM-DD [HH[:MM[:SS]]]) ",
                cursor(&self.date, self.focus == Focus::Date),
                self.focus == Focus::Date,
            ),
            chunks[0],
        );
        frame.render_widget(
            field(" Name ", cursor(&self.name, self.focus == Focus::Name), self.focus == Focus::Name),
            chunks[1],
        );
        frame.render_widget(
            field(
                " Kind (←/→) ",
                format!("◄ {} ►", self.kind.label()),
                self.focus == Focus::Kind,
            ),
            chunks[2],
        );

        let footer = self.error.as_ref().map_or_else(
            || {
                Line::from(vec![
                    Span::styled("Enter", Style::default().fg(Color::Yellow)),
                    Span::raw(" add  "),
                    Span::styled("Tab", Style::default().fg(Color::Yellow)),
                    Span::raw(" next field  "),
                    Span::styled("Esc", Style::default().fg(Color::Yellow)),
                    Span::raw(" cancel"),
                ])
            },
            |err| Line::from(Span::styled(err.clone(), Style::default().fg(Color::Red))),
        );
        frame.render_widget(Paragraph::new(footer), chunks[3]);
    }

    /// The current validation message, if any.
    #[cfg(test)]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}
