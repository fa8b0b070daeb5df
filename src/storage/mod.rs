mod database;
mod error;

pub use database::DatabaseClient;
pub use error::StorageError;

use chrono::{DateTime, SecondsFormat, Utc};

/// Fixed-width UTC text so that lexical order in SQL matches chronological order.
pub fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, StorageError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StorageError::InvalidRow(format!("bad timestamp {value:?}: {e}")))
}
