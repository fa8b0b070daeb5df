use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use url::Url;

use crate::logging::LoggingConfig;

pub const DEFAULT_CONFIG_PATH: &str = "config.json";
pub const DEFAULT_DB_PATH: &str = "wifi_log.db";
pub const DEFAULT_PRODUCT_TYPE: &str = "0";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config file not found: {0} (run with --setup to create it)")]
    NotFound(PathBuf),
    #[error("Failed to read config file {0}: {1}")]
    Read(PathBuf, #[source] io::Error),
    #[error("Failed to write config file {0}: {1}")]
    Write(PathBuf, #[source] io::Error),
    #[error("Invalid config file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Missing required config field: {0}")]
    MissingField(&'static str),
    #[error("Invalid login URL {0:?}: {1}")]
    InvalidUrl(String, #[source] url::ParseError),
}

/// Runtime settings for one invocation.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub config_path: PathBuf,
    pub db_path: PathBuf,
    pub logging: LoggingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            config_path: PathBuf::from(DEFAULT_CONFIG_PATH),
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            logging: LoggingConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn load_portal(&self) -> Result<PortalConfig, ConfigError> {
        PortalConfig::load(&self.config_path)
    }
}

/// Contents of the JSON config file.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct PortalConfig {
    #[serde(default)]
    pub wifi_url: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default = "default_product_type")]
    pub product_type: String,
}

fn default_product_type() -> String {
    DEFAULT_PRODUCT_TYPE.to_string()
}

impl fmt::Debug for PortalConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PortalConfig")
            .field("wifi_url", &self.wifi_url)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("product_type", &self.product_type)
            .finish()
    }
}

impl PortalConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        info!("Loading config from {}", path.display());
        let raw = fs::read_to_string(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => ConfigError::NotFound(path.to_path_buf()),
            _ => ConfigError::Read(path.to_path_buf(), e),
        })?;

        let config = Self::from_json(&raw)?;
        debug!("Config loaded: {config:?}");
        Ok(config)
    }

    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.wifi_url.trim().is_empty() {
            return Err(ConfigError::MissingField("wifi_url"));
        }
        if self.username.trim().is_empty() {
            return Err(ConfigError::MissingField("username"));
        }
        if self.password.is_empty() {
            return Err(ConfigError::MissingField("password"));
        }
        Url::parse(&self.wifi_url).map_err(|e| ConfigError::InvalidUrl(self.wifi_url.clone(), e))?;
        Ok(())
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        self.validate()?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| ConfigError::Write(path.to_path_buf(), e))?;
        }

        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json + "\n").map_err(|e| ConfigError::Write(path.to_path_buf(), e))?;
        info!("Config saved to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_product_type_defaults_to_zero() {
        let config = PortalConfig::from_json(
            r#"{"wifi_url": "http://192.168.100.1:8090/login.xml", "username": "alice", "password": "hunter2"}"#,
        )
        .unwrap();

        assert_eq!(config.product_type, "0");
        assert_eq!(config.username, "alice");
    }

    #[test]
    fn test_missing_required_field() {
        let err = PortalConfig::from_json(r#"{"wifi_url": "http://192.168.100.1:8090/login.xml", "password": "x"}"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::MissingField("username")));

        let err = PortalConfig::from_json(r#"{"wifi_url": "", "username": "a", "password": "x"}"#).unwrap_err();
        assert!(matches!(err, ConfigError::MissingField("wifi_url")));
    }

    #[test]
    fn test_invalid_url_and_json() {
        let err = PortalConfig::from_json(r#"{"wifi_url": "not a url", "username": "a", "password": "x"}"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidUrl(..)));

        assert!(matches!(PortalConfig::from_json("{"), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_missing_file_is_reported() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");

        let err = PortalConfig::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(p) if p == path));
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("conf").join("config.json");
        let config = PortalConfig {
            wifi_url: "http://10.0.0.1:8090/login.xml".to_string(),
            username: "bob".to_string(),
            password: "s3cret".to_string(),
            product_type: "1".to_string(),
        };

        config.save(&path).unwrap();
        assert_eq!(PortalConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn test_debug_hides_password() {
        let config = PortalConfig {
            wifi_url: "http://10.0.0.1/login.xml".to_string(),
            username: "bob".to_string(),
            password: "s3cret".to_string(),
            product_type: "0".to_string(),
        };
        assert!(!format!("{config:?}").contains("s3cret"));
    }
}
