//! `days list` — print the table once and exit.

use crate::output::{OutputMode, render_listing, resolve_output_mode};
use clap::Args;
use days_core::SpecialDayStore;
use std::io::{self, Write};

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Output format.
    #[arg(long, value_enum)]
    pub format: Option<OutputMode>,

    /// Shorthand for `--format json`.
    #[arg(long)]
    pub json: bool,
}

pub fn run_list<B>(
    args: &ListArgs,
    store: &SpecialDayStore<B>,
    config_output: Option<&str>,
) -> anyhow::Result<()> {
    let mode = resolve_output_mode(args.format, args.json, config_output);
    let rows = store.list();

    let stdout = io::stdout();
    let mut out = stdout.lock();
    render_listing(&mut out, &rows, mode)?;
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_args_defaults() {
        use clap::Parser;

        #[derive(Parser)]
        struct Wrapper {
            #[command(flatten)]
            args: ListArgs,
        }
        let w = Wrapper::parse_from(["test"]);
        assert!(w.args.format.is_none());
        assert!(!w.args.json);

        let w = Wrapper::parse_from(["test", "--format", "text"]);
        assert_eq!(w.args.format, Some(OutputMode::Text));
    }
}
