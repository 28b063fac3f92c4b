//! # planwise-core
//!
//! Core library for planwise, the rule-based understanding layer of a
//! personal planning assistant.
//!
//! This library provides:
//! - Calendar extraction: date phrases, event titles, recurrence expansion
//! - Finance extraction: intent classification, entity extraction, responses
//! - Event storage with SQLite
//! - Configuration management and logging infrastructure
//!
//! ## Architecture
//!
//! Every utterance flows through [`Pipeline::process`]:
//! - **Calendar path:** compose → resolve date → expand recurrence → store
//! - **Finance path:** classify (remote service or local) + extract → synthesize
//!
//! Parsing never fails: each cascade has a fallback value, and storage or
//! service errors degrade to a smaller result instead of propagating.
//!
//! ## Example
//!
//! ```rust,no_run
//! use planwise_core::{Config, Database, Pipeline};
//!
//! # async fn run() -> planwise_core::Result<()> {
//! let config = Config::load()?;
//! let db = Database::open(&Config::database_path())?;
//! db.migrate()?;
//!
//! let pipeline = Pipeline::new(db, &config);
//! let now = chrono::Local::now().naive_local();
//! if let Some(response) = pipeline.process("put dance recital on the 22nd", None, now).await {
//!     println!("{}", response.response);
//! }
//! # Ok(())
//! # }
//! ```

// Re-export commonly used items at the crate root
pub use config::Config;
pub use db::{Database, EventStore};
pub use dedup::DedupGuard;
pub use error::{Error, Result};
pub use pipeline::Pipeline;
pub use types::*;

// Public modules
pub mod calendar;
pub mod config;
pub mod db;
pub mod dedup;
pub mod error;
pub mod finance;
pub mod format;
pub mod intent_service;
pub mod logging;
pub mod pipeline;
pub mod types;
