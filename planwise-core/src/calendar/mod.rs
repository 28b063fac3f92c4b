//! Calendar path
//!
//! - [`date_text`]: date phrase → date, relative to a caller-supplied `now`
//! - [`compose`]: utterance → title, category, date phrase, recurrence
//! - [`recurrence`]: recurring event → persisted instances

pub mod compose;
pub mod date_text;
pub mod recurrence;

pub use compose::{compose, ComposedEvent};
pub use date_text::resolve;
pub use recurrence::expand;
