use std::fmt;

use chrono::{DateTime, Utc};

use crate::config::PortalConfig;

pub const LOGIN_MODE: &str = "191";
pub const FAILED_STATUS: &str = "FAILED";
pub const UNKNOWN_RESPONSE: &str = "Unknown response";

/// Everything needed for one login request.
#[derive(Clone, PartialEq, Eq)]
pub struct PortalCredentials {
    pub login_url: String,
    pub username: String,
    pub password: String,
    pub product_type: String,
}

impl fmt::Debug for PortalCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PortalCredentials")
            .field("login_url", &self.login_url)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("product_type", &self.product_type)
            .finish()
    }
}

impl From<&PortalConfig> for PortalCredentials {
    fn from(config: &PortalConfig) -> Self {
        Self {
            login_url: config.wifi_url.clone(),
            username: config.username.clone(),
            password: config.password.clone(),
            product_type: config.product_type.clone(),
        }
    }
}

/// The `a` value sent with every login: Unix time in whole seconds.
pub fn session_token_at(now: DateTime<Utc>) -> String {
    now.timestamp().to_string()
}

pub fn session_token() -> String {
    session_token_at(Utc::now())
}

/// Form body of the `mode=191` login request.
pub struct LoginPayload<'a> {
    pub username: &'a str,
    pub password: &'a str,
    pub a: String,
    pub producttype: &'a str,
}

impl<'a> LoginPayload<'a> {
    pub fn new(credentials: &'a PortalCredentials) -> Self {
        Self {
            username: &credentials.username,
            password: &credentials.password,
            a: session_token(),
            producttype: &credentials.product_type,
        }
    }

    pub fn as_form(&self) -> [(&'static str, &str); 5] {
        [
            ("mode", LOGIN_MODE),
            ("username", self.username),
            ("password", self.password),
            ("a", self.a.as_str()),
            ("producttype", self.producttype),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginOutcome {
    pub success: bool,
    /// HTTP status code as text, or `FAILED` when no response arrived.
    pub status: String,
    pub message: String,
    pub session_token: String,
    /// Value of the `<status>` element, when the portal sent one.
    pub portal_status: Option<String>,
}

impl LoginOutcome {
    pub fn failed(session_token: String, message: String) -> Self {
        Self {
            success: false,
            status: FAILED_STATUS.to_string(),
            message,
            session_token,
            portal_status: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Connectivity {
    Reachable(u16),
    Unreachable(String),
}
