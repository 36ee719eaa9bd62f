use std::path::PathBuf;

use clap::Args;
use replan_core::time;
use replan_core::{RestrictedEntry, RestrictionSet};

#[derive(Args)]
pub struct SlotArgs {
    /// Preferred start time, 12-hour display format (e.g. "2:30 PM")
    #[arg(long)]
    start: String,
    /// Slot duration in minutes
    #[arg(long)]
    duration: i64,
    /// JSON file with restricted-hours entries
    #[arg(long)]
    restrictions: PathBuf,
}

pub fn run(args: SlotArgs) -> Result<(), Box<dyn std::error::Error>> {
    let preferred = time::parse_display_time(&args.start)?;
    let entries: Vec<RestrictedEntry> = super::load_json(&args.restrictions)?;
    let restrictions = RestrictionSet::from_entries(&entries);

    match restrictions.next_available_slot(preferred, args.duration) {
        Some(start) => println!("{}", time::minutes_to_clock_time(start)),
        None => println!("no slot available before midnight"),
    }
    Ok(())
}
