mod error;
mod model;

pub use error::AttemptError;
pub use model::*;

use chrono::{DateTime, Duration, SubsecRound, Utc};
use libsql::{params, Row};

use crate::storage::{format_timestamp, parse_timestamp, DatabaseClient, StorageError};

/// Append-only log of login attempts.
#[derive(Clone)]
pub struct AttemptService {
    db: DatabaseClient,
}

impl AttemptService {
    pub fn new(db: DatabaseClient) -> Self {
        Self { db }
    }

    pub async fn record_attempt(&self, attempt: NewAttempt) -> Result<AttemptRecord, AttemptError> {
        self.record_attempt_at(attempt, Utc::now()).await
    }

    pub(crate) async fn record_attempt_at(
        &self,
        attempt: NewAttempt,
        timestamp: DateTime<Utc>,
    ) -> Result<AttemptRecord, AttemptError> {
        // Stored with microsecond precision.
        let timestamp = timestamp.trunc_subsecs(6);
        let conn = self.db.get_connection().await?;
        conn.execute(
            "INSERT INTO login_attempts (timestamp, username, password, a, response_status, response_message, network_name)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                format_timestamp(timestamp),
                attempt.username.as_str(),
                MASKED_PASSWORD,
                attempt.session_token.as_str(),
                attempt.response_status.as_str(),
                attempt.response_message.as_str(),
                attempt.network_name.clone(),
            ],
        )
        .await
        .map_err(|e| StorageError::Database(e))?;

        let id = conn.last_insert_rowid();
        debug!("Recorded login attempt #{id} for {}", attempt.username);

        Ok(AttemptRecord {
            id,
            timestamp,
            username: attempt.username,
            password: MASKED_PASSWORD.to_string(),
            session_token: attempt.session_token,
            response_status: attempt.response_status,
            response_message: attempt.response_message,
            network_name: attempt.network_name,
        })
    }

    /// Newest first. `limit` must be at least 1.
    pub async fn list_recent(&self, limit: u32) -> Result<Vec<AttemptRecord>, AttemptError> {
        if limit == 0 {
            return Err(AttemptError::InvalidLimit(limit));
        }

        let conn = self.db.get_connection().await?;
        let mut rows = conn
            .query(
                "SELECT id, timestamp, username, password, a, response_status, response_message, network_name
                 FROM login_attempts
                 ORDER BY timestamp DESC, id DESC
                 LIMIT ?1",
                [i64::from(limit)],
            )
            .await
            .map_err(|e| StorageError::Database(e))?;

        let mut records = Vec::new();
        while let Some(row) = rows.next().await.map_err(|e| StorageError::Database(e))? {
            records.push(row_to_record(&row)?);
        }

        Ok(records)
    }

    pub async fn prune_older_than(&self, days: u32) -> Result<u64, AttemptError> {
        self.prune_older_than_at(days, Utc::now()).await
    }

    pub(crate) async fn prune_older_than_at(&self, days: u32, now: DateTime<Utc>) -> Result<u64, AttemptError> {
        // A cutoff before the earliest representable date cannot match any row.
        let Some(cutoff) = now.checked_sub_signed(Duration::days(i64::from(days))) else {
            debug!("Prune window of {days} days reaches past the earliest date; nothing to delete");
            return Ok(0);
        };
        let conn = self.db.get_connection().await?;

        let deleted = conn
            .execute(
                "DELETE FROM login_attempts WHERE timestamp < ?1",
                [format_timestamp(cutoff)],
            )
            .await
            .map_err(|e| StorageError::Database(e))?;

        if deleted > 0 {
            info!("Pruned {deleted} login attempts older than {days} days");
        }
        Ok(deleted)
    }

    pub async fn clear_all(&self) -> Result<u64, AttemptError> {
        let conn = self.db.get_connection().await?;
        let deleted = conn
            .execute("DELETE FROM login_attempts", ())
            .await
            .map_err(|e| StorageError::Database(e))?;

        info!("Cleared {deleted} login attempts");
        Ok(deleted)
    }

    pub async fn count(&self) -> Result<u64, AttemptError> {
        let conn = self.db.get_connection().await?;
        let mut rows = conn
            .query("SELECT COUNT(*) FROM login_attempts", ())
            .await
            .map_err(|e| StorageError::Database(e))?;

        let count = match rows.next().await.map_err(|e| StorageError::Database(e))? {
            Some(row) => row.get::<i64>(0).map_err(|e| StorageError::Database(e))?,
            None => 0,
        };
        Ok(u64::try_from(count).unwrap_or_default())
    }
}

fn row_to_record(row: &Row) -> Result<AttemptRecord, StorageError> {
    let timestamp = row.get::<String>(1)?;

    Ok(AttemptRecord {
        id: row.get::<i64>(0)?,
        timestamp: parse_timestamp(&timestamp)?,
        username: row.get::<String>(2)?,
        password: row.get::<String>(3)?,
        session_token: row.get::<String>(4)?,
        response_status: row.get::<String>(5)?,
        response_message: row.get::<String>(6)?,
        network_name: row.get::<Option<String>>(7)?,
    })
}
