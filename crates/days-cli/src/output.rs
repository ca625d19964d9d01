//! Shared output layer for the non-interactive commands.
//!
//! # Output mode resolution
//!
//! Precedence (highest wins):
//! 1. `--format` / `--json` flag
//! 2. `output` in the user config → `"pretty"` | `"text"` | `"json"`
//! 3. Default: [`OutputMode::Pretty`] if stdout is a TTY; [`OutputMode::Text`] if piped.

use clap::ValueEnum;
use days_core::date;
use days_core::{Kind, Listing};
use serde::Serialize;
use std::io::{self, IsTerminal, Write};

/// Shared width for human pretty separators.
pub const PRETTY_RULE_WIDTH: usize = 80;

/// Write a horizontal separator used by pretty human output.
pub fn pretty_rule(w: &mut dyn Write) -> io::Result<()> {
    writeln!(w, "+{:-<width$}+", "", width = PRETTY_RULE_WIDTH - 2)
}

/// The three output modes supported by the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputMode {
    /// Human-optimized table.
    Pretty,
    /// Tab-separated rows for pipes.
    Text,
    /// Machine-readable JSON array.
    Json,
}

impl OutputMode {
    fn from_name(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "json" => Some(Self::Json),
            "text" => Some(Self::Text),
            "pretty" => Some(Self::Pretty),
            _ => None,
        }
    }
}

/// Core resolution logic, separated from I/O for testability.
fn resolve_output_mode_inner(
    format_flag: Option<OutputMode>,
    json_flag: bool,
    config_output: Option<&str>,
    is_tty: bool,
) -> OutputMode {
    if let Some(mode) = format_flag {
        return mode;
    }

    if json_flag {
        return OutputMode::Json;
    }

    if let Some(mode) = config_output.and_then(OutputMode::from_name) {
        return mode;
    }

    if is_tty {
        OutputMode::Pretty
    } else {
        OutputMode::Text
    }
}

/// Resolve the output mode from CLI flags, user config, and TTY defaults.
pub fn resolve_output_mode(
    format_flag: Option<OutputMode>,
    json_flag: bool,
    config_output: Option<&str>,
) -> OutputMode {
    let is_tty = io::stdout().is_terminal();
    resolve_output_mode_inner(format_flag, json_flag, config_output, is_tty)
}

/// Day count as shown to humans; unparseable dates show `?`.
pub fn format_days(days: i32) -> String {
    if date::is_unparseable(days) {
        "?".to_string()
    } else {
        days.to_string()
    }
}

#[derive(Serialize)]
struct JsonRow<'a> {
    no: usize,
    date: &'a str,
    name: &'a str,
    kind: Kind,
    label: &'static str,
    days: Option<i32>,
}

impl<'a> From<&'a Listing> for JsonRow<'a> {
    fn from(row: &'a Listing) -> Self {
        Self {
            no: row.index + 1,
            date: row.day.date(),
            name: row.day.name(),
            kind: row.day.kind(),
            label: row.day.kind().label(),
            days: (!date::is_unparseable(row.days)).then_some(row.days),
        }
    }
}

/// Render a listing snapshot in the requested mode.
pub fn render_listing(w: &mut dyn Write, rows: &[Listing], mode: OutputMode) -> io::Result<()> {
    match mode {
        OutputMode::Json => {
            let json: Vec<JsonRow<'_>> = rows.iter().map(JsonRow::from).collect();
            serde_json::to_writer_pretty(&mut *w, &json)?;
            writeln!(w)
        }
        OutputMode::Text => {
            for row in rows {
                writeln!(
                    w,
                    "{}\t{}\t{}\t{}\t{}",
                    row.index + 1,
                    format_days(row.days),
                    row.day.date(),
                    row.day.name(),
                    row.day.kind().label()
                )?;
            }
            Ok(())
        }
        OutputMode::Pretty => {
            pretty_rule(w)?;
            writeln!(w, "{:<6}{:>10}  {:<20}  {:<24}  {:>12}", "No", "Days", "Date", "Name", "Kind")?;
            pretty_rule(w)?;
            if rows.is_empty() {
                writeln!(w, "No special days yet. Add one with `days add`.")?;
            }
            for row in rows {
                writeln!(
                    w,
                    "{:<6}{:>10}  {:<20}  {:<24}  {:>12}",
                    row.index + 1,
                    format_days(row.days),
                    row.day.date(),
                    row.day.name(),
                    row.day.kind().label()
                )?;
            }
            pretty_rule(w)
        }
    }
}
