//! DocOps Store — SQLite persistence for cases, notes and audit events.

pub mod schema;
pub mod sqlite;
pub mod types;

pub use sqlite::SqliteStore;
pub use types::*;
