//! Restricted-hours engine.
//!
//! Users mark recurring time-of-day windows (e.g. "no events 22:00-23:59")
//! in which nothing may be scheduled. The engine holds an immutable
//! snapshot of those windows for one user, fetched once per scheduling run,
//! and answers two questions: does a candidate interval touch a restricted
//! window, and where is the next start time of a given duration that does
//! not.

use serde::{Deserialize, Serialize};

use crate::time::{self, MINUTES_PER_DAY};

/// Probing granularity for [`RestrictionSet::next_available_slot`].
///
/// Coarser misses legitimate small gaps; finer buys nothing at typical task
/// durations.
pub const SLOT_STEP_MINUTES: i64 = 15;

/// A recurring restricted time-of-day window, as stored by the preference
/// store. Times are "HH:MM" strings on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestrictedEntry {
    pub id: String,
    pub start_time: String,
    pub end_time: String,
}

/// A validated restricted window in minutes since midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RestrictedRange {
    pub start_minutes: i64,
    pub end_minutes: i64,
}

/// Verdict from [`RestrictionSet::validate_event_time`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeValidation {
    pub is_valid: bool,
    /// Suggested alternative start ("HH:MM") when the requested time is
    /// restricted and an alternative exists before midnight.
    pub suggestion: Option<String>,
}

/// Immutable set of restricted ranges for one user.
///
/// Overlapping ranges behave as their union: an interval is restricted if it
/// overlaps any of them.
#[derive(Debug, Clone, Default)]
pub struct RestrictionSet {
    ranges: Vec<RestrictedRange>,
}

impl RestrictionSet {
    /// Build from validated minute ranges.
    pub fn new(ranges: Vec<RestrictedRange>) -> Self {
        Self { ranges }
    }

    /// Build from stored entries, skipping corrupt ones.
    ///
    /// One bad preference entry must not disable restriction checking for
    /// the whole run, so malformed times and inverted ranges are dropped
    /// with a warning instead of failing the snapshot.
    pub fn from_entries(entries: &[RestrictedEntry]) -> Self {
        let mut ranges = Vec::with_capacity(entries.len());

        for entry in entries {
            let start = match time::parse_clock_time(&entry.start_time) {
                Ok(m) => m,
                Err(err) => {
                    tracing::warn!(id = %entry.id, %err, "skipping corrupt restricted-hours entry");
                    continue;
                }
            };
            let end = match time::parse_clock_time(&entry.end_time) {
                Ok(m) => m,
                Err(err) => {
                    tracing::warn!(id = %entry.id, %err, "skipping corrupt restricted-hours entry");
                    continue;
                }
            };
            if end <= start {
                tracing::warn!(
                    id = %entry.id,
                    start_minutes = start,
                    end_minutes = end,
                    "skipping restricted-hours entry with inverted range"
                );
                continue;
            }
            ranges.push(RestrictedRange {
                start_minutes: start,
                end_minutes: end,
            });
        }

        Self { ranges }
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    pub fn ranges(&self) -> &[RestrictedRange] {
        &self.ranges
    }

    /// True iff the interval overlaps any restricted range.
    ///
    /// Standard half-open overlap test, no buffer: the interval touches a
    /// range when `start < range.end && range.start < end`.
    pub fn is_restricted(&self, start_minutes: i64, end_minutes: i64) -> bool {
        let (start, end) = time::normalize_span(start_minutes, end_minutes);
        self.ranges
            .iter()
            .any(|range| start < range.end_minutes && range.start_minutes < end)
    }

    /// Find the first unrestricted start time at or after `preferred_start`.
    ///
    /// Steps forward in 15-minute increments; gives up at midnight. A
    /// candidate whose end runs past midnight cannot overlap a same-day
    /// range, so the effective boundary policy is "first start at or after
    /// the restriction end, else `None`".
    pub fn next_available_slot(
        &self,
        preferred_start_minutes: i64,
        duration_minutes: i64,
    ) -> Option<i64> {
        let mut start = preferred_start_minutes;
        while start < MINUTES_PER_DAY {
            if !self.is_restricted(start, start + duration_minutes) {
                return Some(start);
            }
            start += SLOT_STEP_MINUTES;
        }
        None
    }

    /// Validate a proposed event time, suggesting an alternative start when
    /// it lands in restricted hours.
    pub fn validate_event_time(&self, start_minutes: i64, end_minutes: i64) -> TimeValidation {
        if !self.is_restricted(start_minutes, end_minutes) {
            return TimeValidation {
                is_valid: true,
                suggestion: None,
            };
        }

        let (start, end) = time::normalize_span(start_minutes, end_minutes);
        let suggestion = self
            .next_available_slot(start, end - start)
            .map(time::minutes_to_clock_time);

        TimeValidation {
            is_valid: false,
            suggestion,
        }
    }
}
