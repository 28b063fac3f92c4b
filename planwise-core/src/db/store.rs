//! Event store abstraction
//!
//! The calendar path only needs a keyed store of [`CalendarEvent`]s. The
//! SQLite [`Database`](super::Database) is the shipped implementation;
//! hosts that keep events elsewhere implement this trait instead.

use crate::error::Result;
use crate::types::CalendarEvent;

/// Keyed persistence for calendar events.
pub trait EventStore: Send + Sync {
    /// All stored events, ordered by date
    fn get_all(&self) -> Result<Vec<CalendarEvent>>;

    /// Insert, or replace the event with the same id
    fn upsert(&self, event: &CalendarEvent) -> Result<()>;

    /// Upsert several events as one unit
    ///
    /// The default implementation is not atomic; stores that support
    /// transactions should override it.
    fn upsert_batch(&self, events: &[CalendarEvent]) -> Result<()> {
        for event in events {
            self.upsert(event)?;
        }
        Ok(())
    }

    /// Delete by id. Returns false when no such event existed.
    fn delete_by_id(&self, id: &str) -> Result<bool>;
}
