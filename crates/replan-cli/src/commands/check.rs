use std::path::PathBuf;

use clap::Args;
use replan_core::time;
use replan_core::{CalendarEvent, ConflictDetector, DEFAULT_BUFFER_MINUTES};

#[derive(Args)]
pub struct CheckArgs {
    /// Candidate start, local civil time (YYYY-MM-DDTHH:MM:SS)
    #[arg(long)]
    at: String,
    /// Candidate duration in minutes
    #[arg(long)]
    duration: i64,
    /// JSON file with the day's events (array of calendar events)
    #[arg(long)]
    events: PathBuf,
    /// Event title to exclude (the event being rescheduled)
    #[arg(long)]
    exclude: Option<String>,
    /// Symmetric buffer in minutes
    #[arg(long, default_value_t = DEFAULT_BUFFER_MINUTES)]
    buffer: i64,
    /// Emit the full report as JSON
    #[arg(long)]
    json: bool,
}

pub fn run(args: CheckArgs) -> Result<(), Box<dyn std::error::Error>> {
    let start = time::parse_local_datetime(&args.at)?;
    let end = start + chrono::Duration::minutes(args.duration);
    let events: Vec<CalendarEvent> = super::load_json(&args.events)?;

    let report = ConflictDetector::new().with_buffer(args.buffer).check_slot(
        start,
        end,
        &events,
        args.exclude.as_deref(),
    );

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    if report.has_conflict {
        println!(
            "conflict: {} event(s) block this slot",
            report.conflicting_events.len()
        );
        for event in &report.conflicting_events {
            println!(
                "  {} ({} - {})",
                event.title,
                time::format_local_datetime(event.start),
                time::format_local_datetime(event.end),
            );
        }
    } else {
        println!("no conflict");
    }
    Ok(())
}
