//! `days add` — add one special day and rewrite the data file.

use anyhow::Context;
use clap::Args;
use days_core::date;
use days_core::{Kind, SpecialDay, SpecialDayStore};
use std::io::{Read, Seek, Write};
use tracing::warn;

#[derive(Args, Debug)]
pub struct AddArgs {
    /// Date: YYYY-MM-DD, optionally followed by HH, HH:MM or HH:MM:SS.
    #[arg(short, long)]
    pub date: String,

    /// Name of the day (at most 36 bytes).
    #[arg(short, long)]
    pub name: String,

    /// Kind: birth, memo, or countdown.
    #[arg(short, long, default_value = "memo")]
    pub kind: Kind,
}

pub fn run_add<B: Read + Write + Seek>(
    args: &AddArgs,
    store: &mut SpecialDayStore<B>,
) -> anyhow::Result<()> {
    let day = SpecialDay::new(args.date.trim(), args.name.trim(), args.kind)
        .context("Invalid special day")?;

    if let Err(err) = date::parse(day.date()) {
        warn!(code = %err.code(), "{err}; the day count will show as unknown");
    }

    let index = store.add(day)?;
    store.persist_all().context("Failed to save special days")?;

    println!("Added #{}: {} ({})", index + 1, args.name.trim(), args.kind.label());
    Ok(())
}
