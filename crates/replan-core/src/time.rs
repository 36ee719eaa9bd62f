//! Time model: one place for every wall-clock conversion.
//!
//! The collaborator calendar API speaks local civil time only -- display
//! times like "2:30 PM" and datetime strings like "2025-03-14T14:30:00"
//! with no timezone offset. Every comparison in the library goes through
//! the conversions here so cross-midnight spans are normalized identically
//! at every call site.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};

use crate::error::{Result, TimeFormatError};

/// Minutes in one civil day.
pub const MINUTES_PER_DAY: i64 = 1440;

/// Format string for the collaborator API's civil datetimes.
const LOCAL_DATETIME_FMT: &str = "%Y-%m-%dT%H:%M:%S";

/// Parse a 12-hour display time ("h:mm AM/PM") into minutes since midnight.
///
/// Fails fast on a missing meridiem or out-of-range hour/minute; a malformed
/// planner time means the task cannot be placed.
pub fn parse_display_time(s: &str) -> Result<i64, TimeFormatError> {
    let trimmed = s.trim();
    let (clock, meridiem) = trimmed
        .rsplit_once(' ')
        .ok_or_else(|| TimeFormatError::MissingMeridiem(s.to_string()))?;

    let upper = meridiem.to_ascii_uppercase();
    if upper != "AM" && upper != "PM" {
        return Err(TimeFormatError::MissingMeridiem(s.to_string()));
    }

    let (hour_str, minute_str) =
        clock
            .split_once(':')
            .ok_or_else(|| TimeFormatError::Malformed {
                input: s.to_string(),
                expected: "h:mm AM/PM",
            })?;

    let hour: u32 = hour_str
        .trim()
        .parse()
        .map_err(|_| TimeFormatError::Malformed {
            input: s.to_string(),
            expected: "h:mm AM/PM",
        })?;
    let minute: u32 = minute_str
        .trim()
        .parse()
        .map_err(|_| TimeFormatError::Malformed {
            input: s.to_string(),
            expected: "h:mm AM/PM",
        })?;

    if hour < 1 || hour > 12 {
        return Err(TimeFormatError::OutOfRange {
            input: s.to_string(),
            unit: "hour",
            value: hour,
        });
    }
    if minute > 59 {
        return Err(TimeFormatError::OutOfRange {
            input: s.to_string(),
            unit: "minute",
            value: minute,
        });
    }

    // 12 AM is midnight, 12 PM is noon
    let hour24 = match (hour, upper.as_str()) {
        (12, "AM") => 0,
        (12, "PM") => 12,
        (h, "PM") => h + 12,
        (h, _) => h,
    };

    Ok(hour24 as i64 * 60 + minute as i64)
}

/// Parse an "HH:MM" 24-hour time into minutes since midnight.
///
/// Used for stored preference entries (restricted hours).
pub fn parse_clock_time(s: &str) -> Result<i64, TimeFormatError> {
    let (hour_str, minute_str) =
        s.trim()
            .split_once(':')
            .ok_or_else(|| TimeFormatError::Malformed {
                input: s.to_string(),
                expected: "HH:MM",
            })?;

    let hour: u32 = hour_str.parse().map_err(|_| TimeFormatError::Malformed {
        input: s.to_string(),
        expected: "HH:MM",
    })?;
    let minute: u32 = minute_str.parse().map_err(|_| TimeFormatError::Malformed {
        input: s.to_string(),
        expected: "HH:MM",
    })?;

    if hour > 23 {
        return Err(TimeFormatError::OutOfRange {
            input: s.to_string(),
            unit: "hour",
            value: hour,
        });
    }
    if minute > 59 {
        return Err(TimeFormatError::OutOfRange {
            input: s.to_string(),
            unit: "minute",
            value: minute,
        });
    }

    Ok(hour as i64 * 60 + minute as i64)
}

/// Parse a canonical `YYYY-MM-DDTHH:MM:SS` civil datetime string.
pub fn parse_local_datetime(s: &str) -> Result<NaiveDateTime, TimeFormatError> {
    NaiveDateTime::parse_from_str(s.trim(), LOCAL_DATETIME_FMT).map_err(|_| {
        TimeFormatError::Malformed {
            input: s.to_string(),
            expected: "YYYY-MM-DDTHH:MM:SS",
        }
    })
}

/// Format a civil datetime as the canonical `YYYY-MM-DDTHH:MM:SS` string.
///
/// No timezone conversion -- the system is timezone-naive by design.
pub fn format_local_datetime(dt: NaiveDateTime) -> String {
    dt.format(LOCAL_DATETIME_FMT).to_string()
}

/// Combine a date with a minutes-since-midnight offset into a datetime.
///
/// Offsets past 1440 roll into the following day.
pub fn datetime_at(date: NaiveDate, minutes: i64) -> NaiveDateTime {
    let midnight = date.and_time(NaiveTime::MIN);
    midnight + chrono::Duration::minutes(minutes)
}

/// Minutes since midnight for a datetime's time-of-day component.
pub fn minutes_since_midnight(dt: NaiveDateTime) -> i64 {
    dt.hour() as i64 * 60 + dt.minute() as i64
}

/// Normalize a (start, end) minute span that may cross midnight.
///
/// If end < start the span wraps past midnight, so a day is added to the
/// end point. An 11:30 PM - 12:30 AM event comes out as 60 minutes, not
/// negative. Must be used everywhere a duration or overlap is computed.
pub fn normalize_span(start_minutes: i64, end_minutes: i64) -> (i64, i64) {
    if end_minutes < start_minutes {
        (start_minutes, end_minutes + MINUTES_PER_DAY)
    } else {
        (start_minutes, end_minutes)
    }
}

/// Render minutes since midnight as "HH:MM" (rolls over past midnight).
pub fn minutes_to_clock_time(minutes: i64) -> String {
    let m = minutes.rem_euclid(MINUTES_PER_DAY);
    format!("{:02}:{:02}", m / 60, m % 60)
}

/// Human-readable description of a forward shift, for batch summaries.
///
/// "45 minutes", "2 hours", "1 day and 3 hours" -- mirrors the phrasing
/// the client renders after a reschedule.
pub fn describe_shift(minutes: i64) -> String {
    if minutes <= 0 {
        return "at the original time".to_string();
    }

    let days = minutes / MINUTES_PER_DAY;
    let hours = (minutes % MINUTES_PER_DAY) / 60;
    let mins = minutes % 60;

    let mut parts = Vec::new();
    if days > 0 {
        parts.push(format!("{} day{}", days, if days == 1 { "" } else { "s" }));
    }
    if hours > 0 {
        parts.push(format!(
            "{} hour{}",
            hours,
            if hours == 1 { "" } else { "s" }
        ));
    }
    if mins > 0 {
        parts.push(format!(
            "{} minute{}",
            mins,
            if mins == 1 { "" } else { "s" }
        ));
    }

    format!("in {}", parts.join(" and "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_parse_display_time() {
        assert_eq!(parse_display_time("9:30 AM").unwrap(), 570);
        assert_eq!(parse_display_time("12:00 AM").unwrap(), 0);
        assert_eq!(parse_display_time("12:00 PM").unwrap(), 720);
        assert_eq!(parse_display_time("11:59 PM").unwrap(), 1439);
        assert_eq!(parse_display_time("1:05 pm").unwrap(), 785);
    }

    #[test]
    fn test_parse_display_time_rejects_missing_meridiem() {
        assert!(matches!(
            parse_display_time("14:30"),
            Err(TimeFormatError::MissingMeridiem(_))
        ));
    }

    #[test]
    fn test_parse_display_time_rejects_out_of_range() {
        assert!(matches!(
            parse_display_time("13:00 PM"),
            Err(TimeFormatError::OutOfRange { unit: "hour", .. })
        ));
        assert!(matches!(
            parse_display_time("9:75 AM"),
            Err(TimeFormatError::OutOfRange { unit: "minute", .. })
        ));
    }

    #[test]
    fn test_parse_clock_time() {
        assert_eq!(parse_clock_time("00:00").unwrap(), 0);
        assert_eq!(parse_clock_time("22:00").unwrap(), 1320);
        assert!(parse_clock_time("24:00").is_err());
        assert!(parse_clock_time("9").is_err());
    }

    #[test]
    fn test_local_datetime_round_trip() {
        let dt = parse_local_datetime("2025-03-14T14:30:00").unwrap();
        assert_eq!(format_local_datetime(dt), "2025-03-14T14:30:00");
    }

    #[test]
    fn test_rejects_offset_datetime() {
        assert!(parse_local_datetime("2025-03-14T14:30:00Z").is_err());
    }

    #[test]
    fn test_normalize_span_cross_midnight() {
        // 11:30 PM - 12:30 AM is 60 minutes, not negative
        let (start, end) = normalize_span(1410, 30);
        assert_eq!(end - start, 60);

        // Same-day span unchanged
        assert_eq!(normalize_span(540, 600), (540, 600));
    }

    #[test]
    fn test_datetime_at_rolls_over() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 14).unwrap();
        let dt = datetime_at(date, 1500); // 25:00 -> next day 01:00
        assert_eq!(format_local_datetime(dt), "2025-03-15T01:00:00");
    }

    #[test]
    fn test_describe_shift() {
        assert_eq!(describe_shift(0), "at the original time");
        assert_eq!(describe_shift(45), "in 45 minutes");
        assert_eq!(describe_shift(120), "in 2 hours");
        assert_eq!(describe_shift(1620), "in 1 day and 3 hours");
    }
}
