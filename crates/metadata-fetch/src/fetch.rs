//! Fetching metadata documents.

use async_trait::async_trait;
use reqwest::{header, Client};
use tracing::{debug, instrument};

use crate::config::FetchConfig;
use crate::error::{FetchError, FetchResult};

/// Source of document text for a URL.
#[async_trait]
pub trait DocumentFetcher: Send + Sync {
    /// Fetch the document at `url` as text.
    async fn fetch(&self, url: &str) -> FetchResult<String>;
}

/// HTTP(S) fetcher with a body size limit.
pub struct HttpFetcher {
    client: Client,
    config: FetchConfig,
}

impl HttpFetcher {
    pub fn new(config: FetchConfig) -> FetchResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(FetchError::ClientBuild)?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    fn too_large(&self, url: &str) -> FetchError {
        FetchError::BodyTooLarge {
            url: url.to_string(),
            limit: self.config.max_body_bytes,
        }
    }
}

#[async_trait]
impl DocumentFetcher for HttpFetcher {
    #[instrument(skip(self), fields(url = %url))]
    async fn fetch(&self, url: &str) -> FetchResult<String> {
        let http_error = |source| FetchError::Http {
            url: url.to_string(),
            source,
        };

        let mut response = self
            .client
            .get(url)
            .header(header::ACCEPT, "application/xml, text/xml, text/html, */*;q=0.8")
            .send()
            .await
            .map_err(http_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let limit = self.config.max_body_bytes;
        if response.content_length().is_some_and(|len| len > limit as u64) {
            return Err(self.too_large(url));
        }

        let mut body: Vec<u8> = Vec::new();
        while let Some(chunk) = response.chunk().await.map_err(http_error)? {
            if body.len() + chunk.len() > limit {
                return Err(self.too_large(url));
            }
            body.extend_from_slice(&chunk);
        }

        debug!(bytes = body.len(), status = status.as_u16(), "Fetched document");
        Ok(String::from_utf8_lossy(&body).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_from_default_config() {
        let fetcher = HttpFetcher::new(FetchConfig::default()).unwrap();
        assert_eq!(fetcher.config().max_body_bytes, 16 * 1024 * 1024);
    }

    #[tokio::test]
    async fn test_invalid_url_is_http_error() {
        let fetcher = HttpFetcher::new(FetchConfig::default()).unwrap();
        let err = fetcher.fetch("not a url").await.unwrap_err();
        assert!(matches!(err, FetchError::Http { url, .. } if url == "not a url"));
    }
}
