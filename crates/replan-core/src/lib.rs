//! # Replan Core Library
//!
//! Core scheduling and conflict-resolution logic for Replan: given a day's
//! existing calendar events and a batch of newly desired tasks (typically
//! produced by an external AI planner), find non-overlapping time slots for
//! each task, honoring a buffer around existing events and user-defined
//! restricted hours, and probe forward in bounded increments when the
//! proposed slot is taken.
//!
//! ## Architecture
//!
//! - **Time model**: one place for every wall-clock conversion (12-hour
//!   display strings, civil datetimes, minutes-since-midnight)
//! - **Restriction engine**: union overlap test over restricted-hour
//!   windows, plus 15-minute forward slot probing
//! - **Conflict detector**: buffered-interval overlap test against a day's
//!   events, collecting every blocker
//! - **Slot search**: forward probing with a fixed step and bounded
//!   horizon; exhaustion is a normal outcome, not an error
//! - **Batch scheduler**: sequential placement where later tasks see
//!   earlier placements as conflicts
//! - **Ports**: the `EventSource` / `PreferenceStore` traits the
//!   surrounding app implements, and the `PlanRunner` orchestrating a full
//!   run through them
//!
//! The whole scheduling path is timezone-naive by design: the collaborator
//! calendar API speaks local civil time with no offsets.

pub mod batch;
pub mod conflict;
pub mod error;
pub mod ports;
pub mod restriction;
pub mod runner;
pub mod search;
pub mod time;

pub use batch::{schedule_batch, BatchResult, PlacementOutcome, PlacementResult, Task};
pub use conflict::{CalendarEvent, ConflictDetector, ConflictReport, DEFAULT_BUFFER_MINUTES};
pub use error::{CoreError, Result, TimeFormatError, ValidationError};
pub use ports::{EventSource, InMemoryEventSource, InMemoryPreferenceStore, PreferenceStore, RestEventSource};
pub use restriction::{RestrictedEntry, RestrictedRange, RestrictionSet};
pub use runner::{PlanRunner, RescheduleOutcome};
pub use search::{find_slot, SearchOptions, SearchOutcome};
