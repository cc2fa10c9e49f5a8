//! Offline resilience: a versioned on-disk asset cache in front of the
//! dashboard's web origin.

pub mod cache;
pub mod fetch;
pub mod layer;
#[cfg(feature = "serve")]
pub mod proxy;

pub use cache::{AssetCache, CacheStorage, CachedResponse};
pub use fetch::{AssetFetcher, HttpAssetFetcher};
pub use layer::{CachePolicy, DEFAULT_ASSETS, DEFAULT_VERSION, OfflineLayer, Served, ServedFrom};
