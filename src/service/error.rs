use super::{attempt::AttemptError, credential::CredentialError, portal::PortalError};

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Portal error: {0}")]
    Portal(#[from] PortalError),
    #[error("Attempt log error: {0}")]
    Attempt(#[from] AttemptError),
    #[error("Credential error: {0}")]
    Credential(#[from] CredentialError),
}
