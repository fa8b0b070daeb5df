use libsql::{Builder, Connection, Database};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::OnceCell;

use super::StorageError;

const SCHEMA: [&str; 3] = [
    "CREATE TABLE IF NOT EXISTS login_attempts (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        timestamp TEXT NOT NULL,
        username TEXT NOT NULL,
        password TEXT NOT NULL,
        a TEXT NOT NULL,
        response_status TEXT NOT NULL,
        response_message TEXT NOT NULL,
        network_name TEXT
    )",
    "CREATE INDEX IF NOT EXISTS idx_login_attempts_timestamp ON login_attempts (timestamp)",
    "CREATE TABLE IF NOT EXISTS credentials (
        network_name TEXT PRIMARY KEY,
        username TEXT NOT NULL,
        password TEXT NOT NULL,
        login_url TEXT NOT NULL,
        product_type TEXT NOT NULL DEFAULT '0',
        updated_at TEXT NOT NULL
    )",
];

/// Handle to the local attempt database.
///
/// Connections are handed out per operation and dropped by the caller when the
/// operation ends. The schema is created the first time a connection is
/// requested, so opening a client never touches the tables.
#[derive(Clone)]
pub struct DatabaseClient {
    inner: Arc<Database>,
    path: PathBuf,
    schema: Arc<OnceCell<()>>,
}

impl DatabaseClient {
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        debug!("Opening attempt database at {}", path.display());
        let db = Builder::new_local(&path)
            .build()
            .await
            .map_err(|e| StorageError::Database(e))?;

        Ok(Self {
            inner: Arc::new(db),
            path,
            schema: Arc::new(OnceCell::new()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn get_connection(&self) -> Result<Connection, StorageError> {
        let conn = self.inner.connect().map_err(|e| StorageError::Database(e))?;
        self.schema.get_or_try_init(|| init_schema(&conn)).await?;
        Ok(conn)
    }
}

async fn init_schema(conn: &Connection) -> Result<(), StorageError> {
    info!("Initializing attempt database schema...");
    for statement in SCHEMA {
        conn.execute(statement, ())
            .await
            .map_err(|e| StorageError::Database(e))?;
    }
    info!("Attempt database schema ready");
    Ok(())
}
