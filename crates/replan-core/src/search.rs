//! Forward slot search.
//!
//! Starting from a task's proposed interval, probe candidate slots through
//! the conflict detector (and optionally the restriction engine), advancing
//! by a fixed step until a free slot turns up or the search horizon is
//! exceeded. Probing is a pure loop over in-memory data; running out of
//! room is a normal outcome, not an error.

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::conflict::{CalendarEvent, ConflictDetector, DEFAULT_BUFFER_MINUTES};
use crate::restriction::RestrictionSet;
use crate::time;

/// Step, horizon, and buffer for one search.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SearchOptions {
    /// Forward shift added per probe (minutes).
    pub step_minutes: i64,
    /// Maximum total forward shift before giving up (minutes).
    pub horizon_minutes: i64,
    /// Symmetric conflict buffer (minutes).
    pub buffer_minutes: i64,
}

impl SearchOptions {
    /// Preset for the manual reschedule flow: 30-minute steps across two
    /// days.
    pub fn manual_reschedule() -> Self {
        Self {
            step_minutes: 30,
            horizon_minutes: 48 * 60,
            buffer_minutes: DEFAULT_BUFFER_MINUTES,
        }
    }

    /// Preset for plan confirmation: hourly steps, half a day.
    pub fn plan_confirmation() -> Self {
        Self {
            step_minutes: 60,
            horizon_minutes: 12 * 60,
            buffer_minutes: DEFAULT_BUFFER_MINUTES,
        }
    }

    pub fn with_step(mut self, minutes: i64) -> Self {
        self.step_minutes = minutes;
        self
    }

    pub fn with_horizon(mut self, minutes: i64) -> Self {
        self.horizon_minutes = minutes;
        self
    }
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self::plan_confirmation()
    }
}

/// Terminal state of a slot search.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SearchOutcome {
    /// A free slot was found.
    Found {
        start: NaiveDateTime,
        end: NaiveDateTime,
        /// Total forward shift from the proposed interval (minutes); zero
        /// means the proposed slot was free as-is.
        moved_by_minutes: i64,
    },
    /// Every candidate within the horizon was taken.
    Exhausted {
        /// Forward shifts attempted after the original probe.
        shifts_tried: u32,
    },
}

impl SearchOutcome {
    pub fn is_found(&self) -> bool {
        matches!(self, SearchOutcome::Found { .. })
    }
}

/// Find the nearest feasible slot for an interval.
///
/// Each candidate is the *original* interval shifted by the elapsed amount
/// (never re-derived from the previous candidate, so repeated stepping
/// cannot drift). A candidate is feasible when the buffered conflict test
/// passes and, if a restriction set is supplied, the slot's time-of-day is
/// unrestricted. Forward probing is monotonic and deterministic: the first
/// feasible elapsed value wins. A non-positive step cannot make progress
/// and is rejected up front as `Exhausted`.
pub fn find_slot(
    start: NaiveDateTime,
    end: NaiveDateTime,
    events: &[CalendarEvent],
    exclude_title: Option<&str>,
    restrictions: Option<&RestrictionSet>,
    options: &SearchOptions,
) -> SearchOutcome {
    // A non-positive step can never advance past the horizon.
    if options.step_minutes <= 0 {
        tracing::warn!(
            step_minutes = options.step_minutes,
            "rejecting search with non-positive step"
        );
        return SearchOutcome::Exhausted { shifts_tried: 0 };
    }

    let detector = ConflictDetector::new().with_buffer(options.buffer_minutes);
    let duration_minutes = (end - start).num_minutes();

    let mut elapsed = 0i64;
    let mut shifts_tried = 0u32;

    loop {
        let candidate_start = start + Duration::minutes(elapsed);
        let candidate_end = end + Duration::minutes(elapsed);

        let report = detector.check_slot(candidate_start, candidate_end, events, exclude_title);
        let restricted = restrictions.is_some_and(|set| {
            let start_of_day = time::minutes_since_midnight(candidate_start);
            set.is_restricted(start_of_day, start_of_day + duration_minutes)
        });

        if !report.has_conflict && !restricted {
            tracing::debug!(
                moved_by_minutes = elapsed,
                start = %time::format_local_datetime(candidate_start),
                "slot found"
            );
            return SearchOutcome::Found {
                start: candidate_start,
                end: candidate_end,
                moved_by_minutes: elapsed,
            };
        }

        elapsed += options.step_minutes;
        if elapsed > options.horizon_minutes {
            tracing::debug!(shifts_tried, "slot search exhausted");
            return SearchOutcome::Exhausted { shifts_tried };
        }
        shifts_tried += 1;
    }
}
