//! Named, versioned response caches on disk.
//!
//! Layout: `<root>/<cache name>/<encoded path>.entry`. An entry is one
//! line of JSON metadata (status, content type) followed by the raw body,
//! so a reader never pairs metadata and body from different writes.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::debug;

use crate::error::CacheError;

/// A stored (or freshly fetched) asset response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl CachedResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct EntryMeta {
    status: u16,
    #[serde(default)]
    content_type: Option<String>,
}

/// Root directory holding every named cache.
#[derive(Debug, Clone)]
pub struct CacheStorage {
    root: PathBuf,
}

impl CacheStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Opens (creating if needed) the cache called `name`.
    pub async fn open(&self, name: &str) -> Result<AssetCache, CacheError> {
        let dir = self.root.join(name);
        fs::create_dir_all(&dir).await?;
        Ok(AssetCache {
            name: name.to_string(),
            dir,
        })
    }

    /// Names of every cache currently on disk, sorted.
    pub async fn keys(&self) -> Result<Vec<String>, CacheError> {
        let mut entries = match fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if entry.file_type().await?.is_dir() {
                if let Some(name) = entry.file_name().to_str() {
                    names.push(name.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }

    /// Deletes the cache called `name`.
    ///
    /// # Returns
    ///
    /// `false` if no such cache existed.
    pub async fn delete(&self, name: &str) -> Result<bool, CacheError> {
        match fs::remove_dir_all(self.root.join(name)).await {
            Ok(()) => {
                debug!(cache = name, "cache deleted");
                Ok(true)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

/// One named cache, keyed by request path.
#[derive(Debug, Clone)]
pub struct AssetCache {
    name: String,
    dir: PathBuf,
}

impl AssetCache {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Stores `response` under `path`, replacing any previous entry.
    ///
    /// The entry is written to a private temp file and renamed into place,
    /// so concurrent readers see either the old entry or the new one.
    pub async fn put(&self, path: &str, response: &CachedResponse) -> Result<(), CacheError> {
        let meta = EntryMeta {
            status: response.status,
            content_type: response.content_type.clone(),
        };
        let mut bytes = serde_json::to_vec(&meta)?;
        bytes.push(b'\n');
        bytes.extend_from_slice(&response.body);

        let entry = self.entry_file(path);
        let seq = TEMP_SEQ.fetch_add(1, Ordering::Relaxed);
        let tmp = entry.with_extension(format!("tmp-{}-{seq}", std::process::id()));
        fs::write(&tmp, &bytes).await?;
        if let Err(e) = fs::rename(&tmp, &entry).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(e.into());
        }
        Ok(())
    }

    /// Looks up `path`; `None` when it was never stored.
    pub async fn match_path(&self, path: &str) -> Result<Option<CachedResponse>, CacheError> {
        let mut bytes = match fs::read(self.entry_file(path)).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let split = bytes
            .iter()
            .position(|&b| b == b'\n')
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidData, "cache entry has no header"))?;
        let meta: EntryMeta = serde_json::from_slice(&bytes[..split])?;
        let body = bytes.split_off(split + 1);
        Ok(Some(CachedResponse {
            status: meta.status,
            content_type: meta.content_type,
            body,
        }))
    }

    fn entry_file(&self, path: &str) -> PathBuf {
        self.dir.join(format!("{}.entry", urlencoding::encode(path)))
    }
}

/// Distinguishes temp files of concurrent writers in one process.
static TEMP_SEQ: AtomicU64 = AtomicU64::new(0);

#[cfg(test)]
mod tests {
    use super::*;

    fn css() -> CachedResponse {
        CachedResponse {
            status: 200,
            content_type: Some("text/css".into()),
            body: b"body { margin: 0 }".to_vec(),
        }
    }

    #[tokio::test]
    async fn put_then_match() {
        let dir = tempfile::tempdir().unwrap();
        let storage = CacheStorage::new(dir.path());
        let cache = storage.open("v1").await.unwrap();

        assert_eq!(cache.match_path("/static/style.css").await.unwrap(), None);
        cache.put("/static/style.css", &css()).await.unwrap();
        assert_eq!(
            cache.match_path("/static/style.css").await.unwrap(),
            Some(css())
        );
        // Root and nested paths must not collide.
        assert_eq!(cache.match_path("/").await.unwrap(), None);
    }

    #[tokio::test]
    async fn query_is_part_of_the_key() {
        let dir = tempfile::tempdir().unwrap();
        let cache = CacheStorage::new(dir.path()).open("v1").await.unwrap();
        cache.put("/", &css()).await.unwrap();
        assert_eq!(cache.match_path("/?x=1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn concurrent_puts_never_mix_entries() {
        let dir = tempfile::tempdir().unwrap();
        let cache = CacheStorage::new(dir.path()).open("v1").await.unwrap();
        let old = CachedResponse {
            status: 200,
            content_type: Some("text/html".into()),
            body: b"<html>old</html>".to_vec(),
        };
        let new = CachedResponse {
            status: 203,
            content_type: Some("text/plain".into()),
            body: b"fresh".to_vec(),
        };

        let mut tasks = Vec::new();
        for i in 0..20 {
            let cache = cache.clone();
            let response = if i % 2 == 0 { old.clone() } else { new.clone() };
            tasks.push(tokio::spawn(async move { cache.put("/", &response).await }));
        }
        for _ in 0..20 {
            let seen = cache.match_path("/").await.unwrap();
            if let Some(seen) = seen {
                assert!(seen == old || seen == new, "mixed entry: {seen:?}");
            }
            tokio::task::yield_now().await;
        }
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        let stored = cache.match_path("/").await.unwrap().unwrap();
        assert!(stored == old || stored == new);
        let leftovers = std::fs::read_dir(dir.path().join("v1"))
            .unwrap()
            .filter(|e| {
                e.as_ref()
                    .unwrap()
                    .file_name()
                    .to_string_lossy()
                    .contains(".tmp-")
            })
            .count();
        assert_eq!(leftovers, 0);
    }

    #[tokio::test]
    async fn keys_and_delete() {
        let dir = tempfile::tempdir().unwrap();
        let storage = CacheStorage::new(dir.path().join("caches"));
        assert!(storage.keys().await.unwrap().is_empty());

        storage.open("v2").await.unwrap();
        storage.open("v1").await.unwrap();
        assert_eq!(storage.keys().await.unwrap(), vec!["v1", "v2"]);

        assert!(storage.delete("v1").await.unwrap());
        assert!(!storage.delete("v1").await.unwrap());
        assert_eq!(storage.keys().await.unwrap(), vec!["v2"]);
    }
}
