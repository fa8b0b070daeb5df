mod error;
mod model;

pub use error::CredentialError;
pub use model::Credential;

use async_trait::async_trait;
use libsql::{params, Row};

use crate::config::PortalConfig;
use crate::service::portal::PortalCredentials;
use crate::storage::{format_timestamp, parse_timestamp, DatabaseClient, StorageError};

/// Where the secret for a single login request comes from.
#[async_trait]
pub trait CredentialSource: Send + Sync {
    async fn credentials(&self) -> Result<PortalCredentials, CredentialError>;

    /// Network the credentials belong to, if they were looked up by name.
    fn network_name(&self) -> Option<&str> {
        None
    }
}

#[async_trait]
impl CredentialSource for PortalConfig {
    async fn credentials(&self) -> Result<PortalCredentials, CredentialError> {
        Ok(PortalCredentials::from(self))
    }
}

/// Name-keyed credentials table.
#[derive(Clone)]
pub struct CredentialService {
    db: DatabaseClient,
}

impl CredentialService {
    pub fn new(db: DatabaseClient) -> Self {
        Self { db }
    }

    /// Inserts the credential, replacing any entry with the same network name.
    pub async fn upsert(&self, credential: &Credential) -> Result<(), CredentialError> {
        let conn = self.db.get_connection().await?;
        conn.execute(
            "INSERT INTO credentials (network_name, username, password, login_url, product_type, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(network_name) DO UPDATE SET
                 username = excluded.username,
                 password = excluded.password,
                 login_url = excluded.login_url,
                 product_type = excluded.product_type,
                 updated_at = excluded.updated_at",
            params![
                credential.network_name.as_str(),
                credential.username.as_str(),
                credential.password.as_str(),
                credential.login_url.as_str(),
                credential.product_type.as_str(),
                format_timestamp(credential.updated_at),
            ],
        )
        .await
        .map_err(|e| StorageError::Database(e))?;

        info!("Saved credentials for network {}", credential.network_name);
        Ok(())
    }

    pub async fn lookup(&self, network_name: &str) -> Result<Option<Credential>, CredentialError> {
        let conn = self.db.get_connection().await?;
        let mut rows = conn
            .query(
                "SELECT network_name, username, password, login_url, product_type, updated_at
                 FROM credentials WHERE network_name = ?1 LIMIT 1",
                [network_name],
            )
            .await
            .map_err(|e| StorageError::Database(e))?;

        match rows.next().await.map_err(|e| StorageError::Database(e))? {
            Some(row) => Ok(Some(row_to_credential(&row)?)),
            None => Ok(None),
        }
    }
}

fn row_to_credential(row: &Row) -> Result<Credential, StorageError> {
    let updated_at = row.get::<String>(5)?;

    Ok(Credential {
        network_name: row.get::<String>(0)?,
        username: row.get::<String>(1)?,
        password: row.get::<String>(2)?,
        login_url: row.get::<String>(3)?,
        product_type: row.get::<String>(4)?,
        updated_at: parse_timestamp(&updated_at)?,
    })
}

/// Credentials looked up by network name at request time.
pub struct StoredCredentialSource {
    service: CredentialService,
    network_name: String,
}

impl StoredCredentialSource {
    pub fn new(service: CredentialService, network_name: &str) -> Self {
        Self {
            service,
            network_name: network_name.to_string(),
        }
    }
}

#[async_trait]
impl CredentialSource for StoredCredentialSource {
    async fn credentials(&self) -> Result<PortalCredentials, CredentialError> {
        self.service
            .lookup(&self.network_name)
            .await?
            .map(PortalCredentials::from)
            .ok_or_else(|| CredentialError::NotFound(self.network_name.clone()))
    }

    fn network_name(&self) -> Option<&str> {
        Some(&self.network_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::{tempdir, TempDir};

    async fn service() -> (TempDir, CredentialService) {
        let dir = tempdir().unwrap();
        let db = DatabaseClient::open(dir.path().join("attempts.db")).await.unwrap();
        (dir, CredentialService::new(db))
    }

    #[tokio::test]
    async fn test_lookup_missing_network() {
        let (_dir, service) = service().await;
        assert!(service.lookup("nowhere").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_upsert_replaces_by_network_name() {
        let (_dir, service) = service().await;

        let first = Credential::new("office", "alice", "one", "http://10.0.0.1:8090/login.xml");
        service.upsert(&first).await.unwrap();

        let second = Credential::new("office", "bob", "two", "http://10.0.0.2:8090/login.xml").with_product_type("2");
        service.upsert(&second).await.unwrap();

        let stored = service.lookup("office").await.unwrap().unwrap();
        assert_eq!(stored.username, "bob");
        assert_eq!(stored.password, "two");
        assert_eq!(stored.login_url, "http://10.0.0.2:8090/login.xml");
        assert_eq!(stored.product_type, "2");
    }

    #[tokio::test]
    async fn test_stored_source_resolves_credentials() {
        let (_dir, service) = service().await;
        service
            .upsert(&Credential::new("home", "carol", "pw", "http://192.168.1.1/login.xml"))
            .await
            .unwrap();

        let source = StoredCredentialSource::new(service.clone(), "home");
        let credentials = source.credentials().await.unwrap();
        assert_eq!(credentials.username, "carol");
        assert_eq!(credentials.product_type, "0");
        assert_eq!(source.network_name(), Some("home"));

        let missing = StoredCredentialSource::new(service, "cafe");
        assert!(matches!(
            missing.credentials().await,
            Err(CredentialError::NotFound(name)) if name == "cafe"
        ));
    }

    #[tokio::test]
    async fn test_config_source() {
        let config = PortalConfig {
            wifi_url: "http://192.168.100.1:8090/login.xml".to_string(),
            username: "dave".to_string(),
            password: "pw".to_string(),
            product_type: "0".to_string(),
        };

        let credentials = config.credentials().await.unwrap();
        assert_eq!(credentials.login_url, config.wifi_url);
        assert_eq!(config.network_name(), None);
    }
}
