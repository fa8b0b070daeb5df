use async_trait::async_trait;
use reqwest::{
    header::{self, HeaderMap, HeaderValue},
    Client,
};
use std::time::Duration;

/// Upper bound for the connectivity probe. Login requests are not bounded.
pub const CONNECTIVITY_TIMEOUT: Duration = Duration::from_secs(5);

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn post_form(&self, url: &str, form: &[(&str, &str)]) -> Result<RawResponse, reqwest::Error>;
    async fn head(&self, url: &str, timeout: Duration) -> Result<u16, reqwest::Error>;
}

#[derive(Clone)]
pub struct HttpService {
    client: Client,
}

impl HttpService {
    pub fn new() -> Result<Self, reqwest::Error> {
        let client = Self::create_client(Self::get_portal_headers())?;
        Ok(Self { client })
    }

    fn get_portal_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            HeaderValue::from_static("application/xml, text/xml;q=0.9, */*;q=0.8"),
        );
        headers
    }

    fn create_client(headers: HeaderMap) -> Result<Client, reqwest::Error> {
        // Some portals hand out a session cookie on the first response.
        Client::builder()
            .cookie_store(true)
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .build()
    }
}

#[async_trait]
impl HttpClient for HttpService {
    async fn post_form(&self, url: &str, form: &[(&str, &str)]) -> Result<RawResponse, reqwest::Error> {
        let response = self.client.post(url).form(form).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        debug!("POST {} -> {} ({} bytes)", url, status, body.len());
        Ok(RawResponse { status, body })
    }

    async fn head(&self, url: &str, timeout: Duration) -> Result<u16, reqwest::Error> {
        let response = self.client.head(url).timeout(timeout).send().await?;
        Ok(response.status().as_u16())
    }
}
