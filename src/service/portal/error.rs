#[derive(Debug, thiserror::Error)]
pub enum PortalError {
    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}
