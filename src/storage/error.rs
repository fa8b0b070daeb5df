use libsql::errors::Error as LibsqlError;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] LibsqlError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid row: {0}")]
    InvalidRow(String),
}
