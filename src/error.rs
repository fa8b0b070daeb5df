use crate::config::ConfigError;
use crate::logging::LoggingError;
use crate::service::attempt::AttemptError;
use crate::service::credential::CredentialError;
use crate::service::portal::PortalError;
use crate::service::ServiceError;
use crate::storage::StorageError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Logging error: {0}")]
    Logging(#[from] LoggingError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Service error: {0}")]
    Service(#[from] ServiceError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<AttemptError> for AppError {
    fn from(error: AttemptError) -> Self {
        AppError::Service(ServiceError::Attempt(error))
    }
}

impl From<CredentialError> for AppError {
    fn from(error: CredentialError) -> Self {
        AppError::Service(ServiceError::Credential(error))
    }
}

impl From<PortalError> for AppError {
    fn from(error: PortalError) -> Self {
        AppError::Service(ServiceError::Portal(error))
    }
}

pub type AppResult<T> = Result<T, AppError>;
