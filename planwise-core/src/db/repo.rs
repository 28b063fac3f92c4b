//! Database repository layer
//!
//! Provides query and insert operations for calendar events.

use super::store::EventStore;
use crate::error::{Error, Result};
use crate::types::{CalendarEvent, EventCategory, RecurringFrequency};
use chrono::NaiveDateTime;
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// ISO-8601 format dates are stored in
const DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f";

/// Database handle (single connection)
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open or create a database at the given path
    pub fn open(path: &PathBuf) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            ",
        )?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Run migrations on this database
    pub fn migrate(&self) -> Result<()> {
        let conn = self.conn();
        super::schema::run_migrations(&conn)
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        // A panic while holding the lock cannot leave SQLite half-written
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ============================================
    // Event operations
    // ============================================

    /// Insert or update an event
    pub fn upsert_event(&self, event: &CalendarEvent) -> Result<()> {
        let conn = self.conn();
        Self::upsert_with(&conn, event)?;
        Ok(())
    }

    /// Insert or update several events in one transaction
    pub fn upsert_events(&self, events: &[CalendarEvent]) -> Result<()> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;
        for event in events {
            Self::upsert_with(&tx, event)?;
        }
        tx.commit()?;
        tracing::debug!(count = events.len(), "Upserted events");
        Ok(())
    }

    fn upsert_with(conn: &Connection, event: &CalendarEvent) -> rusqlite::Result<usize> {
        conn.execute(
            r#"
            INSERT INTO events (id, title, category, date, description, recurring, end_date)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT(id) DO UPDATE SET
                title = excluded.title,
                category = excluded.category,
                date = excluded.date,
                description = excluded.description,
                recurring = excluded.recurring,
                end_date = excluded.end_date
            "#,
            params![
                event.id,
                event.title,
                event.category.as_str(),
                event.date.format(DATE_FORMAT).to_string(),
                event.description,
                event.recurring.map(|f| f.as_str()),
                event.end_date.map(|d| d.format(DATE_FORMAT).to_string()),
            ],
        )
    }

    /// Get an event by ID
    pub fn get_event(&self, id: &str) -> Result<Option<CalendarEvent>> {
        let conn = self.conn();
        conn.query_row("SELECT * FROM events WHERE id = ?", [id], Self::row_to_event)
            .optional()
            .map_err(Error::from)
    }

    /// List all events ordered by date
    pub fn list_events(&self) -> Result<Vec<CalendarEvent>> {
        let conn = self.conn();
        let mut stmt = conn.prepare("SELECT * FROM events ORDER BY date ASC, id ASC")?;
        let events = stmt
            .query_map([], Self::row_to_event)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(events)
    }

    /// Count stored events
    pub fn count_events(&self) -> Result<i64> {
        let conn = self.conn();
        let count = conn.query_row("SELECT COUNT(*) FROM events", [], |r| r.get(0))?;
        Ok(count)
    }

    /// Delete an event by ID. Returns whether a row was removed.
    pub fn delete_event(&self, id: &str) -> Result<bool> {
        let conn = self.conn();
        let removed = conn.execute("DELETE FROM events WHERE id = ?", [id])?;
        Ok(removed > 0)
    }

    fn row_to_event(row: &Row) -> rusqlite::Result<CalendarEvent> {
        let category_str: String = row.get("category")?;
        let date_str: String = row.get("date")?;
        let recurring_str: Option<String> = row.get("recurring")?;
        let end_date_str: Option<String> = row.get("end_date")?;

        Ok(CalendarEvent {
            id: row.get("id")?,
            title: row.get("title")?,
            category: category_str
                .parse::<EventCategory>()
                .map_err(|e| conversion_error(e.into()))?,
            date: parse_date(&date_str)?,
            description: row.get("description")?,
            recurring: recurring_str
                .map(|s| s.parse::<RecurringFrequency>())
                .transpose()
                .map_err(|e| conversion_error(e.into()))?,
            end_date: end_date_str.as_deref().map(parse_date).transpose()?,
        })
    }
}

fn parse_date(s: &str) -> rusqlite::Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, DATE_FORMAT).map_err(|e| conversion_error(Box::new(e)))
}

fn conversion_error(err: Box<dyn std::error::Error + Send + Sync>) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(0, Type::Text, err)
}

impl EventStore for Database {
    fn get_all(&self) -> Result<Vec<CalendarEvent>> {
        self.list_events()
    }

    fn upsert(&self, event: &CalendarEvent) -> Result<()> {
        self.upsert_event(event)
    }

    fn upsert_batch(&self, events: &[CalendarEvent]) -> Result<()> {
        self.upsert_events(events)
    }

    fn delete_by_id(&self, id: &str) -> Result<bool> {
        self.delete_event(id)
    }
}
