use crate::storage::StorageError;

#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("No stored credentials for network {0:?} (run --setup --network {0})")]
    NotFound(String),
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}
