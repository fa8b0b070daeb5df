use chrono::{DateTime, Utc};

use crate::service::portal::LoginOutcome;

/// Stored in place of the real password on every attempt row.
pub const MASKED_PASSWORD: &str = "******";

/// Attempts older than this are pruned after each login.
pub const RETENTION_DAYS: u32 = 30;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptRecord {
    pub id: i64,
    pub timestamp: DateTime<Utc>,
    pub username: String,
    pub password: String,
    pub session_token: String,
    pub response_status: String,
    pub response_message: String,
    pub network_name: Option<String>,
}

/// Fields of an attempt that are known before it is written. Rows always
/// store [`MASKED_PASSWORD`], so there is no password here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAttempt {
    pub username: String,
    pub session_token: String,
    pub response_status: String,
    pub response_message: String,
    pub network_name: Option<String>,
}

impl NewAttempt {
    pub fn from_outcome(username: &str, outcome: &LoginOutcome, network_name: Option<&str>) -> Self {
        Self {
            username: username.to_string(),
            session_token: outcome.session_token.clone(),
            response_status: outcome.status.clone(),
            response_message: outcome.message.clone(),
            network_name: network_name.map(str::to_string),
        }
    }
}
