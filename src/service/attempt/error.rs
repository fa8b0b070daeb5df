use crate::storage::StorageError;

#[derive(Debug, thiserror::Error)]
pub enum AttemptError {
    #[error("Limit must be a positive integer, got {0}")]
    InvalidLimit(u32),
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}
