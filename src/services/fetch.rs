use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use crate::error::{Error, Result};

/// Plain HTTP GETs against upstream hosts.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn text(&self, url: &str) -> Result<String>;

    async fn bytes(&self, url: &str) -> Result<Vec<u8>>;
}

#[derive(Clone, Default)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    async fn get(&self, url: &str) -> Result<reqwest::Response> {
        debug!("GET {}", url);
        let res = self.client.get(url).send().await?;

        if res.status().is_success() {
            Ok(res)
        } else {
            Err(Error::fetch(format!(
                "GET {} failed with status: {}",
                url,
                res.status()
            )))
        }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn text(&self, url: &str) -> Result<String> {
        Ok(self.get(url).await?.text().await?)
    }

    async fn bytes(&self, url: &str) -> Result<Vec<u8>> {
        Ok(self.get(url).await?.bytes().await?.to_vec())
    }
}
