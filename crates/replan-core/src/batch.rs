//! Batch scheduler: place an ordered list of planned tasks for one session.
//!
//! Tasks are processed strictly in input order. Each placement is appended
//! to the working event set as a synthetic event, so later tasks treat
//! earlier placements as real conflict sources. One task running out of
//! room never aborts the batch.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::conflict::CalendarEvent;
use crate::restriction::RestrictionSet;
use crate::search::{find_slot, SearchOptions, SearchOutcome};
use crate::time;

/// A newly desired task, as produced by the external planner or manual
/// entry. Consumed once placed or skipped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Proposed interval, local civil time.
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<i32>,
}

impl Task {
    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }

    /// Proposed intervals must run forward.
    pub fn validate(&self) -> Result<(), crate::error::ValidationError> {
        if self.end <= self.start {
            return Err(crate::error::ValidationError::InvalidInterval {
                start_minutes: time::minutes_since_midnight(self.start),
                end_minutes: time::minutes_since_midnight(self.end),
            });
        }
        Ok(())
    }
}

/// How a single task fared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlacementOutcome {
    /// Placed at its proposed time.
    Placed,
    /// Placed, but shifted forward to dodge conflicts.
    Moved,
    /// No feasible slot within the horizon.
    Skipped,
    /// Transport failure while materializing the placement.
    Failed,
}

/// Per-task result of a batch run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlacementResult {
    pub task: Task,
    /// Final interval when placed; `None` for skipped/failed tasks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<NaiveDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<NaiveDateTime>,
    pub moved_by_minutes: i64,
    pub outcome: PlacementOutcome,
    /// Transport error message for failed tasks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Aggregate result of one batch run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchResult {
    pub placed_count: usize,
    pub moved_count: usize,
    pub skipped_count: usize,
    pub failed_count: usize,
    pub total_count: usize,
    pub results: Vec<PlacementResult>,
}

impl BatchResult {
    /// Human-readable summary in the shape the client renders after plan
    /// confirmation.
    pub fn summary(&self) -> String {
        let created = self.placed_count + self.moved_count;
        let mut lines = vec![format!(
            "Created {} of {} calendar events",
            created, self.total_count
        )];
        if self.moved_count > 0 {
            lines.push(format!(
                "Moved {} event{} to avoid conflicts",
                self.moved_count,
                if self.moved_count == 1 { "" } else { "s" }
            ));
        }
        if self.skipped_count > 0 {
            lines.push(format!(
                "Skipped {} event{} due to conflicts",
                self.skipped_count,
                if self.skipped_count == 1 { "" } else { "s" }
            ));
        }
        if self.failed_count > 0 {
            lines.push(format!(
                "Failed to create {} event{}",
                self.failed_count,
                if self.failed_count == 1 { "" } else { "s" }
            ));
        }
        lines.join("\n")
    }

    /// Record a materialization failure after the fact (used by the runner
    /// when the event source rejects a computed placement).
    pub(crate) fn mark_failed(&mut self, index: usize, message: String) {
        let result = &mut self.results[index];
        match result.outcome {
            PlacementOutcome::Placed => self.placed_count -= 1,
            PlacementOutcome::Moved => self.moved_count -= 1,
            _ => return,
        }
        result.outcome = PlacementOutcome::Failed;
        result.error = Some(message);
        self.failed_count += 1;
    }
}

/// Place tasks sequentially against a day's events.
///
/// Pure computation: no I/O happens here. `day_events` is the immutable
/// snapshot fetched at the start of the run; placements accumulate on a
/// working copy so each task's conflict universe includes everything placed
/// before it.
pub fn schedule_batch(
    tasks: Vec<Task>,
    day_events: &[CalendarEvent],
    restrictions: Option<&RestrictionSet>,
    options: &SearchOptions,
) -> BatchResult {
    let mut working_events = day_events.to_vec();
    let mut batch = BatchResult {
        total_count: tasks.len(),
        ..Default::default()
    };

    for task in tasks {
        // An inverted interval can never be placed; record it as failed
        // rather than minting a negative-duration synthetic event.
        if let Err(err) = task.validate() {
            tracing::warn!(title = %task.title, %err, "rejecting task with invalid interval");
            batch.failed_count += 1;
            batch.results.push(PlacementResult {
                task,
                start: None,
                end: None,
                moved_by_minutes: 0,
                outcome: PlacementOutcome::Failed,
                error: Some(err.to_string()),
            });
            continue;
        }

        let outcome = find_slot(
            task.start,
            task.end,
            &working_events,
            None,
            restrictions,
            options,
        );

        match outcome {
            SearchOutcome::Found {
                start,
                end,
                moved_by_minutes,
            } => {
                let placement_outcome = if moved_by_minutes > 0 {
                    batch.moved_count += 1;
                    PlacementOutcome::Moved
                } else {
                    batch.placed_count += 1;
                    PlacementOutcome::Placed
                };

                working_events.push(CalendarEvent::new(
                    task.title.clone(),
                    start,
                    end,
                    format!("replan-{}", uuid::Uuid::new_v4()),
                ));

                batch.results.push(PlacementResult {
                    task,
                    start: Some(start),
                    end: Some(end),
                    moved_by_minutes,
                    outcome: placement_outcome,
                    error: None,
                });
            }
            SearchOutcome::Exhausted { shifts_tried } => {
                tracing::debug!(
                    title = %task.title,
                    shifts_tried,
                    "no feasible slot within horizon, skipping"
                );
                batch.skipped_count += 1;
                batch.results.push(PlacementResult {
                    task,
                    start: None,
                    end: None,
                    moved_by_minutes: 0,
                    outcome: PlacementOutcome::Skipped,
                    error: None,
                });
            }
        }
    }

    batch
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(minutes: i64) -> NaiveDateTime {
        time::datetime_at(NaiveDate::from_ymd_opt(2025, 3, 14).unwrap(), minutes)
    }

    fn task(title: &str, start_minutes: i64, end_minutes: i64) -> Task {
        Task {
            title: title.to_string(),
            description: None,
            start: at(start_minutes),
            end: at(end_minutes),
            category: None,
            priority: None,
        }
    }

    fn event(title: &str, start_minutes: i64, end_minutes: i64) -> CalendarEvent {
        CalendarEvent::new(title, at(start_minutes), at(end_minutes), "e")
    }

    #[test]
    fn test_later_task_sees_earlier_placement() {
        // A and B both propose 9:00-10:00 against an empty day. A is placed
        // as-is; B only conflicts with A's *placed* interval, so B must move.
        let tasks = vec![task("A", 540, 600), task("B", 540, 600)];
        let batch = schedule_batch(tasks, &[], None, &SearchOptions::plan_confirmation());

        assert_eq!(batch.placed_count, 1);
        assert_eq!(batch.moved_count, 1);
        assert_eq!(batch.results[0].outcome, PlacementOutcome::Placed);
        assert_eq!(batch.results[1].outcome, PlacementOutcome::Moved);
        assert!(batch.results[1].moved_by_minutes > 0);
    }

    #[test]
    fn test_results_keep_input_order() {
        let tasks = vec![
            task("Late", 1260, 1320),
            task("Early", 540, 600),
            task("Midday", 720, 780),
        ];
        let batch = schedule_batch(tasks, &[], None, &SearchOptions::plan_confirmation());

        let titles: Vec<_> = batch.results.iter().map(|r| r.task.title.as_str()).collect();
        assert_eq!(titles, vec!["Late", "Early", "Midday"]);
    }

    #[test]
    fn test_skip_does_not_abort_batch() {
        // First task can never fit (day fully blocked against its window),
        // second one is far enough out to land.
        let events = vec![event("Wall", 0, 1439)];
        let next_day_start = 1440 + 600;
        let tasks = vec![
            task("Doomed", 540, 600),
            task("Fine", next_day_start, next_day_start + 60),
        ];

        let batch = schedule_batch(tasks, &events, None, &SearchOptions::plan_confirmation());

        assert_eq!(batch.skipped_count, 1);
        assert_eq!(batch.placed_count, 1);
        assert_eq!(batch.results[0].outcome, PlacementOutcome::Skipped);
        assert!(batch.results[0].start.is_none());
        assert_eq!(batch.results[1].outcome, PlacementOutcome::Placed);
    }

    #[test]
    fn test_counts_add_up() {
        let events = vec![event("Lunch", 720, 780)];
        let tasks = vec![
            task("One", 540, 600),
            task("Two", 735, 765),
            task("Three", 1020, 1080),
        ];
        let batch = schedule_batch(tasks, &events, None, &SearchOptions::plan_confirmation());

        assert_eq!(batch.total_count, 3);
        assert_eq!(
            batch.placed_count + batch.moved_count + batch.skipped_count + batch.failed_count,
            3
        );
    }

    #[test]
    fn test_restrictions_respected_in_batch() {
        use crate::restriction::RestrictedRange;

        let restrictions = RestrictionSet::new(vec![RestrictedRange {
            start_minutes: 540,
            end_minutes: 660,
        }]);
        let tasks = vec![task("Gym", 540, 600)];
        let batch = schedule_batch(
            tasks,
            &[],
            Some(&restrictions),
            &SearchOptions::plan_confirmation(),
        );

        let result = &batch.results[0];
        assert_eq!(result.outcome, PlacementOutcome::Moved);
        assert_eq!(result.start, Some(at(660)));
    }

    #[test]
    fn test_inverted_interval_recorded_as_failed() {
        // end <= start: no placement, no synthetic event, batch continues.
        let tasks = vec![task("Backwards", 600, 540), task("Fine", 720, 780)];
        let batch = schedule_batch(tasks, &[], None, &SearchOptions::plan_confirmation());

        assert_eq!(batch.failed_count, 1);
        assert_eq!(batch.placed_count, 1);
        assert_eq!(batch.results[0].outcome, PlacementOutcome::Failed);
        assert!(batch.results[0].start.is_none());
        assert!(batch.results[0].error.is_some());
        // The bad task left nothing behind for the next one to dodge.
        assert_eq!(batch.results[1].outcome, PlacementOutcome::Placed);
        assert_eq!(batch.results[1].moved_by_minutes, 0);
    }

    #[test]
    fn test_summary_mentions_moves_and_skips() {
        let events = vec![event("Wall", 0, 1439)];
        let tasks = vec![task("A", 540, 600), task("B", 540, 600)];
        let batch = schedule_batch(tasks, &events, None, &SearchOptions::plan_confirmation());

        let summary = batch.summary();
        assert!(summary.contains("Skipped 2 events"));
    }

    #[test]
    fn test_mark_failed_adjusts_counts() {
        let tasks = vec![task("A", 540, 600)];
        let mut batch = schedule_batch(tasks, &[], None, &SearchOptions::plan_confirmation());
        assert_eq!(batch.placed_count, 1);

        batch.mark_failed(0, "calendar API unreachable".to_string());

        assert_eq!(batch.placed_count, 0);
        assert_eq!(batch.failed_count, 1);
        assert_eq!(batch.results[0].outcome, PlacementOutcome::Failed);
        assert!(batch.results[0].error.is_some());
    }
}
