mod error;
mod model;
mod util;

pub use error::PortalError;
pub use model::*;
pub use util::{extract_message, extract_status, is_successful};

use std::sync::Arc;

use super::http::{HttpClient, HttpService, CONNECTIVITY_TIMEOUT};

/// Talks to the captive portal: one login POST per call, never retried.
#[derive(Clone)]
pub struct PortalService {
    http: Arc<dyn HttpClient>,
}

impl PortalService {
    pub fn new() -> Result<Self, PortalError> {
        Ok(Self::with_client(Arc::new(HttpService::new()?)))
    }

    pub fn with_client(http: Arc<dyn HttpClient>) -> Self {
        Self { http }
    }

    /// Submits the credentials and classifies the reply.
    ///
    /// Transport failures do not surface as errors: they come back as a
    /// `FAILED` outcome carrying the error text, so the attempt can still be
    /// recorded.
    pub async fn login(&self, credentials: &PortalCredentials) -> LoginOutcome {
        let payload = LoginPayload::new(credentials);
        info!("Logging in as {} via {}", credentials.username, credentials.login_url);
        debug!("Session token: {}", payload.a);

        let result = self.http.post_form(&credentials.login_url, &payload.as_form()).await;
        match result {
            Ok(response) => {
                let message = extract_message(&response.body);
                let portal_status = extract_status(&response.body);
                let success = is_successful(portal_status.as_deref(), &message);

                if success {
                    info!("Login succeeded ({}): {}", response.status, message);
                } else {
                    warn!("Login failed ({}): {}", response.status, message);
                }

                LoginOutcome {
                    success,
                    status: response.status.to_string(),
                    message,
                    session_token: payload.a,
                    portal_status,
                }
            }
            Err(e) => {
                error!("Login request to {} failed: {}", credentials.login_url, e);
                LoginOutcome::failed(payload.a, e.to_string())
            }
        }
    }

    pub async fn test_connectivity(&self, url: &str) -> Connectivity {
        info!("Testing connectivity to {url}...");
        match self.http.head(url, CONNECTIVITY_TIMEOUT).await {
            Ok(status) => {
                info!("{url} is reachable (HTTP {status})");
                Connectivity::Reachable(status)
            }
            Err(e) => {
                warn!("{url} is unreachable: {e}");
                Connectivity::Unreachable(e.to_string())
            }
        }
    }
}
