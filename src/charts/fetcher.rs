use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::Client;

use crate::charts::errors::Result;

/// Desktop Chrome user agent; chart pages serve a reduced page to unknown clients
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";
/// Per-request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Anything that can hand back the markup of a chart page
#[async_trait]
pub trait PageSource {
    /// Body of the page at `url`; non-success statuses are errors
    async fn fetch_page(&self, url: &str) -> Result<String>;
}

/// [`PageSource`] backed by a reqwest client
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Build a client sending `user_agent` and giving up after `timeout`
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()?;
        Ok(HttpFetcher { client })
    }
}

#[async_trait]
impl PageSource for HttpFetcher {
    async fn fetch_page(&self, url: &str) -> Result<String> {
        debug!("GET {url}");
        let response = self.client.get(url).send().await?.error_for_status()?;
        let body = response.text().await?;
        debug!("Fetched {} bytes from {url}", body.len());
        Ok(body)
    }
}
