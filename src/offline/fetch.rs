use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;

use super::cache::CachedResponse;
use crate::error::CacheError;

/// Live network access for the offline layer.
#[async_trait]
pub trait AssetFetcher: Send + Sync {
    /// Fetches `path` from the origin. Non-2xx responses are returned, not
    /// turned into errors; only transport failures are `Err`.
    async fn fetch(&self, path: &str) -> Result<CachedResponse, CacheError>;
}

/// Fetches assets over HTTP from a fixed origin.
#[derive(Debug, Clone)]
pub struct HttpAssetFetcher {
    origin: String,
    client: reqwest::Client,
}

impl HttpAssetFetcher {
    pub fn new(origin: &str, client: reqwest::Client) -> Self {
        Self {
            origin: origin.trim_end_matches('/').to_string(),
            client,
        }
    }
}

#[async_trait]
impl AssetFetcher for HttpAssetFetcher {
    async fn fetch(&self, path: &str) -> Result<CachedResponse, CacheError> {
        let url = format!("{}{}", self.origin, path);
        let fail = |e: reqwest::Error| CacheError::Fetch {
            path: path.to_string(),
            reason: e.to_string(),
        };

        let response = self.client.get(&url).send().await.map_err(fail)?;
        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.bytes().await.map_err(fail)?.to_vec();

        Ok(CachedResponse {
            status,
            content_type,
            body,
        })
    }
}
