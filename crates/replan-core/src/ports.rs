//! Collaborator ports: the calendar event source and the preference store.
//!
//! The scheduling core never talks to the outside world directly -- it
//! consumes these two traits, implemented by the surrounding app. A
//! REST-backed event source for the collaborator calendar API ships here,
//! along with an in-memory implementation for tests and offline runs.

use std::collections::HashSet;
use std::sync::Mutex;
use std::time::Duration;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::conflict::CalendarEvent;
use crate::error::{CoreError, Result};
use crate::restriction::RestrictedEntry;
use crate::time;

/// Per-call timeout for event source transport.
const TRANSPORT_TIMEOUT: Duration = Duration::from_secs(15);

/// Query and mutate calendar events, scoped to one civil date per query.
///
/// All times cross this boundary as local civil time; no timezone offset is
/// transmitted.
pub trait EventSource: Send + Sync {
    /// All events on the given date, across the user's calendars.
    fn find_events(&self, date: NaiveDate) -> Result<Vec<CalendarEvent>>;

    /// Create a new event.
    fn create_event(
        &self,
        title: &str,
        start: NaiveDateTime,
        end: NaiveDateTime,
        description: Option<&str>,
    ) -> Result<()>;

    /// Move an existing event, identified by title and current start, to a
    /// new interval.
    fn move_event(
        &self,
        title: &str,
        current_start: NaiveDateTime,
        new_start: NaiveDateTime,
        new_end: NaiveDateTime,
    ) -> Result<()>;
}

/// Read user scheduling preferences.
pub trait PreferenceStore: Send + Sync {
    /// The user's restricted-hours entries, raw as stored. Corrupt entries
    /// are filtered later by [`RestrictionSet::from_entries`](crate::restriction::RestrictionSet::from_entries).
    fn restricted_hours(&self, user_id: &str) -> Result<Vec<RestrictedEntry>>;
}

// --- REST event source ------------------------------------------------------

/// Event as the collaborator calendar API returns it: 12-hour display
/// times, scoped to the queried date.
#[derive(Debug, Deserialize)]
struct WireEvent {
    title: String,
    start_time: String,
    end_time: String,
    #[serde(default)]
    event_id: String,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Serialize)]
struct FindEventsRequest<'a> {
    date: &'a str,
}

#[derive(Debug, Deserialize)]
struct FindEventsResponse {
    #[serde(default)]
    events: Vec<WireEvent>,
}

#[derive(Debug, Serialize)]
struct CreateEventRequest<'a> {
    title: &'a str,
    start_datetime: String,
    end_datetime: String,
    description: &'a str,
}

#[derive(Debug, Serialize)]
struct MoveEventRequest<'a> {
    title: &'a str,
    current_start_datetime: String,
    new_start_datetime: String,
    new_end_datetime: String,
}

/// [`EventSource`] backed by the collaborator calendar HTTP API.
pub struct RestEventSource {
    base_url: String,
    access_token: String,
    client: reqwest::Client,
}

impl RestEventSource {
    /// Build a client with the bounded per-call timeout. Fails if the TLS
    /// backend cannot be initialized.
    pub fn new(base_url: impl Into<String>, access_token: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(TRANSPORT_TIMEOUT)
            .build()?;
        Ok(Self {
            base_url: base_url.into(),
            access_token: access_token.into(),
            client,
        })
    }

    fn post<B: Serialize, R: for<'de> Deserialize<'de>>(&self, endpoint: &str, body: &B) -> Result<R> {
        let url = format!("{}{}", self.base_url, endpoint);
        let response = tokio::runtime::Handle::current().block_on(async {
            self.client
                .post(&url)
                .bearer_auth(&self.access_token)
                .json(body)
                .send()
                .await?
                .error_for_status()?
                .json::<R>()
                .await
        })?;
        Ok(response)
    }
}

impl EventSource for RestEventSource {
    fn find_events(&self, date: NaiveDate) -> Result<Vec<CalendarEvent>> {
        let date_str = date.format("%Y-%m-%d").to_string();
        let response: FindEventsResponse =
            self.post("/events/find", &FindEventsRequest { date: &date_str })?;

        let mut events = Vec::with_capacity(response.events.len());
        for wire in response.events {
            match CalendarEvent::from_display_times(
                &wire.title,
                date,
                &wire.start_time,
                &wire.end_time,
                &wire.event_id,
            ) {
                Ok(mut event) => {
                    event.description = wire.description;
                    events.push(event);
                }
                // One unparseable event must not disable conflict checking
                // for the rest of the day.
                Err(err) => {
                    tracing::warn!(title = %wire.title, %err, "skipping event with malformed times");
                }
            }
        }
        Ok(events)
    }

    fn create_event(
        &self,
        title: &str,
        start: NaiveDateTime,
        end: NaiveDateTime,
        description: Option<&str>,
    ) -> Result<()> {
        let _: serde_json::Value = self.post(
            "/event/create",
            &CreateEventRequest {
                title,
                start_datetime: time::format_local_datetime(start),
                end_datetime: time::format_local_datetime(end),
                description: description.unwrap_or(""),
            },
        )?;
        Ok(())
    }

    fn move_event(
        &self,
        title: &str,
        current_start: NaiveDateTime,
        new_start: NaiveDateTime,
        new_end: NaiveDateTime,
    ) -> Result<()> {
        let _: serde_json::Value = self.post(
            "/event/move",
            &MoveEventRequest {
                title,
                current_start_datetime: time::format_local_datetime(current_start),
                new_start_datetime: time::format_local_datetime(new_start),
                new_end_datetime: time::format_local_datetime(new_end),
            },
        )?;
        Ok(())
    }
}

// --- In-memory implementations ----------------------------------------------

/// In-memory [`EventSource`] for tests and offline planning runs.
#[derive(Default)]
pub struct InMemoryEventSource {
    events: Mutex<Vec<CalendarEvent>>,
    /// Titles for which `create_event` reports a transport failure.
    rejected_titles: Mutex<HashSet<String>>,
}

impl InMemoryEventSource {
    pub fn new(events: Vec<CalendarEvent>) -> Self {
        Self {
            events: Mutex::new(events),
            rejected_titles: Mutex::new(HashSet::new()),
        }
    }

    /// Make `create_event` fail for the given title, to exercise per-task
    /// failure handling.
    pub fn reject_title(&self, title: impl Into<String>) {
        self.rejected_titles.lock().unwrap().insert(title.into());
    }

    /// Snapshot of everything currently stored.
    pub fn all_events(&self) -> Vec<CalendarEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl EventSource for InMemoryEventSource {
    fn find_events(&self, date: NaiveDate) -> Result<Vec<CalendarEvent>> {
        Ok(self
            .events
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.start.date() == date)
            .cloned()
            .collect())
    }

    fn create_event(
        &self,
        title: &str,
        start: NaiveDateTime,
        end: NaiveDateTime,
        description: Option<&str>,
    ) -> Result<()> {
        if self.rejected_titles.lock().unwrap().contains(title) {
            return Err(CoreError::transport(
                "in-memory",
                format!("create rejected for '{title}'"),
            ));
        }

        let mut event = CalendarEvent::new(
            title,
            start,
            end,
            format!("mem-{}", uuid::Uuid::new_v4()),
        );
        event.description = description.map(str::to_string);
        self.events.lock().unwrap().push(event);
        Ok(())
    }

    fn move_event(
        &self,
        title: &str,
        current_start: NaiveDateTime,
        new_start: NaiveDateTime,
        new_end: NaiveDateTime,
    ) -> Result<()> {
        let mut events = self.events.lock().unwrap();
        let event = events
            .iter_mut()
            .find(|e| e.title == title && e.start == current_start)
            .ok_or_else(|| {
                CoreError::transport("in-memory", format!("no event '{title}' at given start"))
            })?;
        event.start = new_start;
        event.end = new_end;
        Ok(())
    }
}

/// In-memory [`PreferenceStore`] holding one user's entries.
#[derive(Default)]
pub struct InMemoryPreferenceStore {
    entries: Vec<RestrictedEntry>,
}

impl InMemoryPreferenceStore {
    pub fn new(entries: Vec<RestrictedEntry>) -> Self {
        Self { entries }
    }
}

impl PreferenceStore for InMemoryPreferenceStore {
    fn restricted_hours(&self, _user_id: &str) -> Result<Vec<RestrictedEntry>> {
        Ok(self.entries.clone())
    }
}
