use crate::config::cli::LocalStorage;
use crate::core::Storage;
use crate::utils::error::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Disk-backed memoization of knowledge-base responses.
///
/// Entries live at `<dir>/<namespace>/<encoded key>.json`. A missing or
/// unreadable entry is a miss; the next successful fetch overwrites it.
#[derive(Debug, Clone)]
pub struct ResponseCache {
    storage: LocalStorage,
}

#[derive(Debug, Serialize, Deserialize)]
struct CacheEntry {
    key: String,
    fetched_at: DateTime<Utc>,
    body: serde_json::Value,
}

impl ResponseCache {
    pub fn new(dir: impl Into<String>) -> Self {
        Self {
            storage: LocalStorage::new(dir.into()),
        }
    }

    pub fn dir(&self) -> &str {
        self.storage.base_path()
    }

    fn entry_path(namespace: &str, key: &str) -> String {
        let encoded: String = url::form_urlencoded::byte_serialize(key.as_bytes()).collect();
        format!("{}/{}.json", namespace, encoded)
    }

    pub async fn get(&self, namespace: &str, key: &str) -> Option<serde_json::Value> {
        let path = Self::entry_path(namespace, key);
        let bytes = self.storage.read_file(&path).await.ok()?;

        match serde_json::from_slice::<CacheEntry>(&bytes) {
            Ok(entry) if entry.key == key => {
                tracing::debug!("Cache hit {}/{} (fetched {})", namespace, key, entry.fetched_at);
                Some(entry.body)
            }
            Ok(_) => None,
            Err(e) => {
                tracing::warn!("Ignoring unreadable cache entry {}: {}", path, e);
                None
            }
        }
    }

    pub async fn put(&self, namespace: &str, key: &str, body: &serde_json::Value) -> Result<()> {
        let entry = CacheEntry {
            key: key.to_string(),
            fetched_at: Utc::now(),
            body: body.clone(),
        };
        let data = serde_json::to_vec_pretty(&entry)?;
        self.storage
            .write_file(&Self::entry_path(namespace, key), &data)
            .await
    }
}
