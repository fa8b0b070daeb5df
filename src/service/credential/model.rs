use std::fmt;

use chrono::{DateTime, Utc};

use crate::config::DEFAULT_PRODUCT_TYPE;
use crate::service::portal::PortalCredentials;

/// Login details saved under a network name. The password is kept as plain
/// text in the database.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    pub network_name: String,
    pub username: String,
    pub password: String,
    pub login_url: String,
    pub product_type: String,
    pub updated_at: DateTime<Utc>,
}

impl Credential {
    pub fn new(network_name: &str, username: &str, password: &str, login_url: &str) -> Self {
        Self {
            network_name: network_name.to_string(),
            username: username.to_string(),
            password: password.to_string(),
            login_url: login_url.to_string(),
            product_type: DEFAULT_PRODUCT_TYPE.to_string(),
            updated_at: Utc::now(),
        }
    }

    pub fn with_product_type(mut self, product_type: &str) -> Self {
        self.product_type = product_type.to_string();
        self
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("network_name", &self.network_name)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("login_url", &self.login_url)
            .field("product_type", &self.product_type)
            .field("updated_at", &self.updated_at)
            .finish()
    }
}

impl From<Credential> for PortalCredentials {
    fn from(credential: Credential) -> Self {
        Self {
            login_url: credential.login_url,
            username: credential.username,
            password: credential.password,
            product_type: credential.product_type,
        }
    }
}
