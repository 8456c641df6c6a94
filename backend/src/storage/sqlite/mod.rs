//! Relational backend: SQLite via sqlx.
//!
//! Identity is a canonical-form TEXT primary key, uniqueness and referential
//! integrity are enforced by the schema (UNIQUE indexes, foreign key with
//! `ON DELETE CASCADE`), and timestamps live as fixed-width RFC 3339 UTC
//! text so range predicates work as plain string comparisons.

pub mod db;
pub mod todo_repository;
pub mod user_repository;

pub use db::DbConnection;
pub use todo_repository::TodoRepository;
pub use user_repository::UserRepository;

use anyhow::{anyhow, Result};
use chrono::{DateTime, SecondsFormat, Utc};

/// Fixed-width RFC 3339 UTC text; lexicographic order equals chronological
/// order, which the due-date range queries rely on.
pub(crate) fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| anyhow!("invalid stored timestamp {:?}: {}", raw, e))
}
