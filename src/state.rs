use crate::config::AppConfig;
use crate::error::AppResult;
use crate::service::portal::PortalService;
use crate::service::ServiceRegistry;
use crate::storage::DatabaseClient;

/// Everything a command needs, built once per invocation and passed by
/// reference.
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub services: ServiceRegistry,
}

impl AppState {
    pub async fn new(config: AppConfig) -> AppResult<Self> {
        let db = DatabaseClient::open(&config.db_path).await?;
        info!("Using attempt database {}", db.path().display());
        let portal = PortalService::new()?;
        let services = ServiceRegistry::new(db, portal);

        Ok(Self { config, services })
    }
}
