//! Buffered-interval conflict detection against a day's events.
//!
//! A candidate slot conflicts with an event when the candidate, padded by a
//! symmetric buffer on both sides, overlaps the event. The buffer enforces
//! minimum spacing so nothing gets scheduled back-to-back with zero
//! transition time.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::{Result, TimeFormatError};
use crate::time;

/// Default symmetric buffer applied to a candidate before overlap testing.
pub const DEFAULT_BUFFER_MINUTES: i64 = 30;

/// An existing calendar event, as surfaced by the event source.
///
/// Read-only input to the detector; the library only writes events through
/// the [`EventSource`](crate::ports::EventSource) trait.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub title: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    /// Opaque id assigned by the source calendar.
    pub source_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl CalendarEvent {
    pub fn new(
        title: impl Into<String>,
        start: NaiveDateTime,
        end: NaiveDateTime,
        source_id: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            start,
            end,
            source_id: source_id.into(),
            description: None,
        }
    }

    /// Build from the 12-hour display times the calendar API returns for a
    /// given date. An end earlier than the start means the event crosses
    /// midnight, so the end rolls into the next day.
    pub fn from_display_times(
        title: impl Into<String>,
        date: NaiveDate,
        start_time: &str,
        end_time: &str,
        source_id: impl Into<String>,
    ) -> Result<Self, TimeFormatError> {
        let start_minutes = time::parse_display_time(start_time)?;
        let end_minutes = time::parse_display_time(end_time)?;
        let (start_minutes, end_minutes) = time::normalize_span(start_minutes, end_minutes);

        Ok(Self::new(
            title,
            time::datetime_at(date, start_minutes),
            time::datetime_at(date, end_minutes),
            source_id,
        ))
    }

    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }

    /// Check if this event overlaps a time range (strict comparisons).
    pub fn overlaps(&self, start: NaiveDateTime, end: NaiveDateTime) -> bool {
        self.start < end && self.end > start
    }
}

/// Result of a conflict check: every blocking event, not just the first,
/// so callers can report what stood in the way of a slot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConflictReport {
    pub has_conflict: bool,
    pub conflicting_events: Vec<CalendarEvent>,
}

impl ConflictReport {
    fn empty() -> Self {
        Self {
            has_conflict: false,
            conflicting_events: Vec::new(),
        }
    }
}

/// Conflict detector with a configurable symmetric buffer.
#[derive(Debug, Clone, Copy)]
pub struct ConflictDetector {
    buffer_minutes: i64,
}

impl ConflictDetector {
    /// Create a detector with the default 30-minute buffer.
    pub fn new() -> Self {
        Self {
            buffer_minutes: DEFAULT_BUFFER_MINUTES,
        }
    }

    /// Set the buffer width.
    pub fn with_buffer(mut self, minutes: i64) -> Self {
        self.buffer_minutes = minutes;
        self
    }

    pub fn buffer_minutes(&self) -> i64 {
        self.buffer_minutes
    }

    /// Test a candidate slot against a day's events.
    ///
    /// The candidate is padded by the buffer on both sides before the
    /// overlap test; comparisons are strict, so a gap of exactly the buffer
    /// width between candidate and event is NOT a conflict. Events titled
    /// `exclude_title` are skipped so an event being rescheduled does not
    /// conflict with itself.
    pub fn check_slot(
        &self,
        candidate_start: NaiveDateTime,
        candidate_end: NaiveDateTime,
        events: &[CalendarEvent],
        exclude_title: Option<&str>,
    ) -> ConflictReport {
        let buffered_start = candidate_start - Duration::minutes(self.buffer_minutes);
        let buffered_end = candidate_end + Duration::minutes(self.buffer_minutes);

        let mut report = ConflictReport::empty();

        for event in events {
            if exclude_title.is_some_and(|title| event.title == title) {
                continue;
            }
            if event.overlaps(buffered_start, buffered_end) {
                report.conflicting_events.push(event.clone());
            }
        }

        report.has_conflict = !report.conflicting_events.is_empty();
        report
    }
}

impl Default for ConflictDetector {
    fn default() -> Self {
        Self::new()
    }
}
