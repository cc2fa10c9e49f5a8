use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::cache::{AssetCache, CacheStorage, CachedResponse};
use super::fetch::AssetFetcher;
use crate::error::CacheError;

/// Current cache version tag.
pub const DEFAULT_VERSION: &str = "microgrid-pwa-v1";

/// Paths pre-cached at install.
pub const DEFAULT_ASSETS: &[&str] = &[
    "/",
    "/forecast",
    "/reports",
    "/agent",
    "/about",
    "/static/style.css",
    "/static/script.js",
    "/static/manifest.json",
];

/// How a fetch consults the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CachePolicy {
    /// Serve the cached copy if any, else go live. Live results are never
    /// written back.
    #[default]
    CacheFirst,
    /// Serve the cached copy and refresh it in the background. Misses go
    /// live and are stored.
    StaleWhileRevalidate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServedFrom {
    Cache,
    Network,
}

impl ServedFrom {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cache => "cache",
            Self::Network => "network",
        }
    }
}

impl fmt::Display for ServedFrom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Served {
    pub response: CachedResponse,
    pub source: ServedFrom,
}

/// Offline resilience for a fixed asset manifest.
///
/// `install` pre-caches the manifest under the current version tag,
/// `activate` removes caches from other versions and `handle_fetch`
/// answers individual requests.
pub struct OfflineLayer {
    storage: CacheStorage,
    version: String,
    assets: Vec<String>,
    policy: CachePolicy,
    fetcher: Arc<dyn AssetFetcher>,
}

impl OfflineLayer {
    pub fn new(
        storage: CacheStorage,
        version: impl Into<String>,
        assets: Vec<String>,
        policy: CachePolicy,
        fetcher: Arc<dyn AssetFetcher>,
    ) -> Self {
        Self {
            storage,
            version: version.into(),
            assets,
            policy,
            fetcher,
        }
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn policy(&self) -> CachePolicy {
        self.policy
    }

    pub fn storage(&self) -> &CacheStorage {
        &self.storage
    }

    /// Fetches every manifest path and stores them in the versioned cache.
    ///
    /// All-or-nothing: nothing is written unless every path returned 2xx.
    ///
    /// # Returns
    ///
    /// The number of assets stored.
    pub async fn install(&self) -> Result<usize, CacheError> {
        let mut fetched = Vec::with_capacity(self.assets.len());
        for path in &self.assets {
            let response = self.fetcher.fetch(path).await?;
            if !response.is_success() {
                return Err(CacheError::Install {
                    path: path.clone(),
                    status: response.status,
                });
            }
            fetched.push((path, response));
        }

        let cache = self.storage.open(&self.version).await?;
        for (path, response) in &fetched {
            cache.put(path, response).await?;
        }
        info!(version = %self.version, assets = fetched.len(), "offline cache installed");
        Ok(fetched.len())
    }

    /// Deletes every cache not named after the current version.
    ///
    /// # Returns
    ///
    /// Names of the removed caches.
    pub async fn activate(&self) -> Result<Vec<String>, CacheError> {
        let mut removed = Vec::new();
        for name in self.storage.keys().await? {
            if name != self.version && self.storage.delete(&name).await? {
                removed.push(name);
            }
        }
        if !removed.is_empty() {
            info!(?removed, "stale offline caches removed");
        }
        Ok(removed)
    }

    /// Answers one request according to the configured policy.
    ///
    /// `path` is the full request target, query included; it is both the
    /// cache key and the upstream path.
    ///
    /// # Errors
    ///
    /// Fails only when the cache misses and the live fetch fails.
    pub async fn handle_fetch(&self, path: &str) -> Result<Served, CacheError> {
        let cache = self.storage.open(&self.version).await?;

        let cached = match cache.match_path(path).await {
            Ok(hit) => hit,
            Err(e) => {
                warn!(path, "cache lookup failed, going live: {e}");
                None
            }
        };

        if let Some(response) = cached {
            if self.policy == CachePolicy::StaleWhileRevalidate {
                self.revalidate(cache, path);
            }
            debug!(path, "served from cache");
            return Ok(Served {
                response,
                source: ServedFrom::Cache,
            });
        }

        let response = self.fetcher.fetch(path).await?;
        if self.policy == CachePolicy::StaleWhileRevalidate && response.is_success() {
            if let Err(e) = cache.put(path, &response).await {
                warn!(path, "could not store live response: {e}");
            }
        }
        debug!(path, status = response.status, "served from network");
        Ok(Served {
            response,
            source: ServedFrom::Network,
        })
    }

    fn revalidate(&self, cache: AssetCache, path: &str) {
        let fetcher = Arc::clone(&self.fetcher);
        let path = path.to_string();
        tokio::spawn(async move {
            match fetcher.fetch(&path).await {
                Ok(fresh) if fresh.is_success() => {
                    if let Err(e) = cache.put(&path, &fresh).await {
                        warn!(path, "background refresh not stored: {e}");
                    }
                }
                Ok(fresh) => debug!(path, status = fresh.status, "refresh skipped"),
                Err(e) => debug!(path, "refresh failed: {e}"),
            }
        });
    }
}

impl fmt::Debug for OfflineLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OfflineLayer")
            .field("storage", &self.storage)
            .field("version", &self.version)
            .field("assets", &self.assets)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}
