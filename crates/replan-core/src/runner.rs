//! Plan runner: orchestrates a full scheduling run against the ports.
//!
//! I/O happens at two points only: the snapshot fetch at the start of a run
//! (day events + restricted hours, once, treated as immutable for the
//! run's duration) and the per-task materialization of computed placements.
//! Everything in between is pure computation. A transport failure while
//! materializing one placement is recorded on that task and the rest of
//! the batch continues; there is no rollback.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::batch::{self, BatchResult, PlacementOutcome, Task};
use crate::conflict::CalendarEvent;
use crate::error::Result;
use crate::ports::{EventSource, PreferenceStore};
use crate::restriction::RestrictionSet;
use crate::search::{find_slot, SearchOptions, SearchOutcome};
use crate::time;

/// Outcome of rescheduling a single existing event.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RescheduleOutcome {
    /// Event moved; `shifted_by` is the total shift from the original
    /// interval, phrased for display (e.g. "in 1 day and 2 hours").
    Moved {
        start: chrono::NaiveDateTime,
        end: chrono::NaiveDateTime,
        shifted_by: String,
    },
    /// No free slot within the reschedule window.
    NoSlot,
}

/// Drives scheduling runs through an event source and preference store.
pub struct PlanRunner<E, P> {
    events: E,
    preferences: P,
}

impl<E: EventSource, P: PreferenceStore> PlanRunner<E, P> {
    pub fn new(events: E, preferences: P) -> Self {
        Self {
            events,
            preferences,
        }
    }

    pub fn event_source(&self) -> &E {
        &self.events
    }

    /// Run a full batch: snapshot, place, materialize.
    ///
    /// The snapshot fetch failing aborts the run (there is nothing sound to
    /// schedule against); a failed restricted-hours fetch only logs and
    /// falls back to no restrictions, matching the client's behavior. Each
    /// placement is created through the event source sequentially, and a
    /// per-task transport error downgrades that task to `Failed` without
    /// touching the others.
    pub fn run(
        &self,
        user_id: &str,
        date: NaiveDate,
        tasks: Vec<Task>,
        options: &SearchOptions,
    ) -> Result<BatchResult> {
        let day_events = self.events.find_events(date)?;

        let restrictions = match self.preferences.restricted_hours(user_id) {
            Ok(entries) => RestrictionSet::from_entries(&entries),
            Err(err) => {
                tracing::warn!(%err, "restricted hours unavailable, scheduling without them");
                RestrictionSet::default()
            }
        };
        let restrictions = (!restrictions.is_empty()).then_some(&restrictions);

        let mut result = batch::schedule_batch(tasks, &day_events, restrictions, options);

        for index in 0..result.results.len() {
            let placement = &result.results[index];
            if !matches!(
                placement.outcome,
                PlacementOutcome::Placed | PlacementOutcome::Moved
            ) {
                continue;
            }
            // Computed placements always carry an interval.
            let (Some(start), Some(end)) = (placement.start, placement.end) else {
                continue;
            };

            let created = self.events.create_event(
                &placement.task.title,
                start,
                end,
                placement.task.description.as_deref(),
            );
            if let Err(err) = created {
                tracing::warn!(title = %placement.task.title, %err, "failed to create placed event");
                result.mark_failed(index, err.to_string());
            }
        }

        Ok(result)
    }

    /// Move an existing event to tomorrow at the same time, sliding forward
    /// in 30-minute steps until a free slot appears (bounded at 48 hours
    /// from the original start).
    pub fn reschedule_event(&self, event: &CalendarEvent) -> Result<RescheduleOutcome> {
        let base_shift = Duration::days(1);
        let candidate_start = event.start + base_shift;
        let candidate_end = event.end + base_shift;

        // Probing can slide past the candidate's midnight, so snapshot both
        // affected dates up front.
        let first_day = candidate_start.date();
        let mut day_events = self.events.find_events(first_day)?;
        if let Some(next) = first_day.succ_opt() {
            day_events.extend(self.events.find_events(next)?);
        }

        let options = SearchOptions::manual_reschedule().with_horizon(24 * 60);
        let outcome = find_slot(
            candidate_start,
            candidate_end,
            &day_events,
            Some(&event.title),
            None,
            &options,
        );

        match outcome {
            SearchOutcome::Found {
                start,
                end,
                moved_by_minutes,
            } => {
                self.events
                    .move_event(&event.title, event.start, start, end)?;
                let total_shift = base_shift.num_minutes() + moved_by_minutes;
                Ok(RescheduleOutcome::Moved {
                    start,
                    end,
                    shifted_by: time::describe_shift(total_shift),
                })
            }
            SearchOutcome::Exhausted { .. } => Ok(RescheduleOutcome::NoSlot),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    use crate::ports::{InMemoryEventSource, InMemoryPreferenceStore};
    use crate::restriction::RestrictedEntry;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 14).unwrap()
    }

    fn at(minutes: i64) -> chrono::NaiveDateTime {
        time::datetime_at(date(), minutes)
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

    #[test]
    fn test_run_materializes_placements() {
        let source = InMemoryEventSource::new(vec![CalendarEvent::new(
            "Lunch",
            at(720),
            at(780),
            "lunch-1",
        )]);
        let runner = PlanRunner::new(source, InMemoryPreferenceStore::default());

        let result = runner
            .run(
                "user-1",
                date(),
                vec![task("Deep work", 540, 630)],
                &SearchOptions::plan_confirmation(),
            )
            .unwrap();

        assert_eq!(result.placed_count, 1);
        assert_eq!(runner.events.all_events().len(), 2);
    }

    #[test]
    fn test_run_respects_restricted_hours() {
        let source = InMemoryEventSource::new(Vec::new());
        let prefs = InMemoryPreferenceStore::new(vec![RestrictedEntry {
            id: "evening".into(),
            start_time: "09:00".into(),
            end_time: "11:00".into(),
        }]);
        let runner = PlanRunner::new(source, prefs);

        let result = runner
            .run(
                "user-1",
                date(),
                vec![task("Gym", 540, 600)],
                &SearchOptions::plan_confirmation(),
            )
            .unwrap();

        assert_eq!(result.moved_count, 1);
        assert_eq!(result.results[0].start, Some(at(660)));
    }

    #[test]
    fn test_transport_failure_is_per_task() {
        let source = InMemoryEventSource::new(Vec::new());
        source.reject_title("Doomed");
        let runner = PlanRunner::new(source, InMemoryPreferenceStore::default());

        let result = runner
            .run(
                "user-1",
                date(),
                vec![task("Doomed", 540, 600), task("Fine", 720, 780)],
                &SearchOptions::plan_confirmation(),
            )
            .unwrap();

        assert_eq!(result.failed_count, 1);
        assert_eq!(result.placed_count, 1);
        assert_eq!(result.results[0].outcome, PlacementOutcome::Failed);
        assert_eq!(result.results[1].outcome, PlacementOutcome::Placed);
        // Only the successful placement was materialized
        assert_eq!(runner.events.all_events().len(), 1);
    }

    #[test]
    fn test_reschedule_moves_to_tomorrow() {
        let event = CalendarEvent::new("Dentist", at(600), at(660), "d-1");
        let source = InMemoryEventSource::new(vec![event.clone()]);
        let runner = PlanRunner::new(source, InMemoryPreferenceStore::default());

        let outcome = runner.reschedule_event(&event).unwrap();

        match outcome {
            RescheduleOutcome::Moved {
                start, shifted_by, ..
            } => {
                assert_eq!(start, event.start + Duration::days(1));
                assert_eq!(shifted_by, "in 1 day");
            }
            other => panic!("expected Moved, got {other:?}"),
        }
    }

    #[test]
    fn test_reschedule_slides_past_tomorrow_conflict() {
        let event = CalendarEvent::new("Dentist", at(600), at(660), "d-1");
        let tomorrow = date().succ_opt().unwrap();
        let blocker = CalendarEvent::new(
            "Offsite",
            time::datetime_at(tomorrow, 540),
            time::datetime_at(tomorrow, 720),
            "o-1",
        );
        let source = InMemoryEventSource::new(vec![event.clone(), blocker]);
        let runner = PlanRunner::new(source, InMemoryPreferenceStore::default());

        let outcome = runner.reschedule_event(&event).unwrap();

        match outcome {
            RescheduleOutcome::Moved { start, .. } => {
                // 12:00 blocker end + 30-min buffer, reached by 30-min steps
                assert_eq!(start, time::datetime_at(tomorrow, 750));
            }
            other => panic!("expected Moved, got {other:?}"),
        }
    }
}
