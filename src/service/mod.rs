pub mod attempt;
pub mod credential;
mod error;
pub mod http;
pub mod portal;

pub use error::ServiceError;

use attempt::{AttemptRecord, AttemptService, NewAttempt, RETENTION_DAYS};
use credential::{CredentialService, CredentialSource};
use portal::{LoginOutcome, PortalService};

use crate::storage::DatabaseClient;

#[derive(Debug, Clone)]
pub struct LoginReport {
    pub outcome: LoginOutcome,
    pub record: AttemptRecord,
}

#[derive(Clone)]
pub struct ServiceRegistry {
    pub portal: PortalService,
    pub attempt: AttemptService,
    pub credential: CredentialService,
}

impl ServiceRegistry {
    pub fn new(db: DatabaseClient, portal: PortalService) -> Self {
        info!("Initializing service registry");

        Self {
            portal,
            attempt: AttemptService::new(db.clone()),
            credential: CredentialService::new(db),
        }
    }

    /// Runs one login and appends exactly one attempt row for it, then drops
    /// rows past the retention window.
    pub async fn login_and_record(&self, source: &dyn CredentialSource) -> Result<LoginReport, ServiceError> {
        let credentials = source.credentials().await?;
        let outcome = self.portal.login(&credentials).await;

        let attempt = NewAttempt::from_outcome(&credentials.username, &outcome, source.network_name());
        let record = self.attempt.record_attempt(attempt).await?;
        self.attempt.prune_older_than(RETENTION_DAYS).await?;

        Ok(LoginReport { outcome, record })
    }
}
