use std::path::PathBuf;

use chrono::NaiveDate;
use clap::Args;
use replan_core::time;
use replan_core::{
    CalendarEvent, InMemoryEventSource, InMemoryPreferenceStore, PlacementOutcome, PlanRunner,
    RestrictedEntry, SearchOptions, Task,
};

#[derive(Args)]
pub struct PlanArgs {
    /// Date to schedule against (YYYY-MM-DD)
    #[arg(long)]
    date: NaiveDate,
    /// JSON file with the planned tasks (array)
    #[arg(long)]
    tasks: PathBuf,
    /// JSON file with the day's existing events (array)
    #[arg(long)]
    events: Option<PathBuf>,
    /// JSON file with restricted-hours entries (array)
    #[arg(long)]
    restrictions: Option<PathBuf>,
    /// Forward step per probe, in minutes
    #[arg(long)]
    step: Option<i64>,
    /// Search horizon, in minutes
    #[arg(long)]
    horizon: Option<i64>,
    /// Emit the full batch result as JSON
    #[arg(long)]
    json: bool,
}

pub fn run(args: PlanArgs) -> Result<(), Box<dyn std::error::Error>> {
    let tasks: Vec<Task> = super::load_json(&args.tasks)?;
    let events: Vec<CalendarEvent> = match &args.events {
        Some(path) => super::load_json(path)?,
        None => Vec::new(),
    };
    let entries: Vec<RestrictedEntry> = match &args.restrictions {
        Some(path) => super::load_json(path)?,
        None => Vec::new(),
    };

    let mut options = SearchOptions::plan_confirmation();
    if let Some(step) = args.step {
        options = options.with_step(step);
    }
    if let Some(horizon) = args.horizon {
        options = options.with_horizon(horizon);
    }

    let runner = PlanRunner::new(
        InMemoryEventSource::new(events),
        InMemoryPreferenceStore::new(entries),
    );
    let result = runner.run("local", args.date, tasks, &options)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    for placement in &result.results {
        match (placement.outcome, placement.start) {
            (PlacementOutcome::Placed, Some(start)) => println!(
                "placed  {} at {}",
                placement.task.title,
                time::format_local_datetime(start),
            ),
            (PlacementOutcome::Moved, Some(start)) => println!(
                "moved   {} to {} ({})",
                placement.task.title,
                time::format_local_datetime(start),
                time::describe_shift(placement.moved_by_minutes),
            ),
            (PlacementOutcome::Skipped, _) => {
                println!("skipped {} (no slot within horizon)", placement.task.title)
            }
            (PlacementOutcome::Failed, _) => println!(
                "failed  {} ({})",
                placement.task.title,
                placement.error.as_deref().unwrap_or("transport error"),
            ),
            _ => {}
        }
    }
    println!();
    println!("{}", result.summary());
    Ok(())
}
