//! Object-store boundary.
//!
//! The ingestion core never talks to a concrete storage service; it goes
//! through [`ObjectStore`], which a deployment backs with its real object
//! store client. [`MemoryStore`] is an in-memory implementation for tests
//! and local pipelines.

use crate::error::{ExportError, IngestError, StoreError};
use crate::types::TwinDocument;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::Mutex;

/// Scheme prefix for remote export targets (`store://bucket/key`)
pub const STORE_URL_SCHEME: &str = "store://";

/// Minimal object-store operations the core depends on.
///
/// Implementations own pagination: `list_keys` returns the complete key set
/// under a prefix, walking continuation tokens internally. Retries also
/// belong to the implementation, not to this core.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// List all keys under a prefix, in listing order
    async fn list_keys(&self, bucket: &str, prefix: &str) -> Result<Vec<String>, StoreError>;

    /// Fetch an object's full body
    async fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>, StoreError>;

    /// Write an object, replacing any existing one
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StoreError>;
}

/// Serialize a twin to pretty-printed JSON and upload it under *key*
pub async fn put_twin_json(
    store: &dyn ObjectStore,
    bucket: &str,
    key: &str,
    twin: &TwinDocument,
) -> Result<(), IngestError> {
    let body = serde_json::to_vec_pretty(twin)?;
    let size = body.len();
    store
        .put_object(bucket, key, body, "application/json")
        .await?;
    tracing::info!(bucket, key, size, "uploaded twin document");
    Ok(())
}

/// Fetch and parse a stored twin document
pub async fn get_twin_json(
    store: &dyn ObjectStore,
    bucket: &str,
    key: &str,
) -> Result<TwinDocument, IngestError> {
    let body = store.get_object(bucket, key).await?;
    Ok(serde_json::from_slice(&body)?)
}

/// Split a `store://bucket/key` target into its bucket and key parts.
///
/// The caller has already checked for the scheme prefix; anything without
/// both a bucket and a non-empty key is rejected.
pub fn parse_store_url(target: &str) -> Result<(String, String), ExportError> {
    let rest = target
        .strip_prefix(STORE_URL_SCHEME)
        .ok_or_else(|| ExportError::InvalidTarget {
            target: target.to_string(),
            reason: format!("expected a '{STORE_URL_SCHEME}' prefix"),
        })?;

    match rest.split_once('/') {
        Some((bucket, key)) if !bucket.is_empty() && !key.is_empty() => {
            Ok((bucket.to_string(), key.to_string()))
        }
        _ => Err(ExportError::InvalidTarget {
            target: target.to_string(),
            reason: "expected both a bucket and a key".to_string(),
        }),
    }
}

/// In-memory [`ObjectStore`] backed by a map, for tests and local runs
#[derive(Default)]
pub struct MemoryStore {
    objects: Mutex<HashMap<(String, String), Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an object directly, bypassing the trait
    pub async fn insert(&self, bucket: &str, key: &str, body: Vec<u8>) {
        self.objects
            .lock()
            .await
            .insert((bucket.to_string(), key.to_string()), body);
    }

    pub async fn len(&self) -> usize {
        self.objects.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.objects.lock().await.is_empty()
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn list_keys(&self, bucket: &str, prefix: &str) -> Result<Vec<String>, StoreError> {
        let objects = self.objects.lock().await;
        let mut keys: Vec<String> = objects
            .keys()
            .filter(|(b, k)| b == bucket && k.starts_with(prefix))
            .map(|(_, k)| k.clone())
            .collect();
        keys.sort();
        Ok(keys)
    }

    async fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>, StoreError> {
        self.objects
            .lock()
            .await
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("{bucket}/{key}")))
    }

    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Vec<u8>,
        _content_type: &str,
    ) -> Result<(), StoreError> {
        self.insert(bucket, key, body).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_store_url() {
        let (bucket, key) = parse_store_url("store://my-bucket/chunks/out.jsonl").unwrap();
        assert_eq!(bucket, "my-bucket");
        assert_eq!(key, "chunks/out.jsonl");
    }

    #[test]
    fn test_parse_store_url_rejects_missing_key() {
        assert!(parse_store_url("store://bucket-only").is_err());
        assert!(parse_store_url("store://bucket/").is_err());
        assert!(parse_store_url("store:///key").is_err());
    }

    #[tokio::test]
    async fn test_memory_store_roundtrip() {
        let store = MemoryStore::new();
        store
            .put_object("bucket", "a/b.json", b"body".to_vec(), "application/json")
            .await
            .unwrap();

        let body = store.get_object("bucket", "a/b.json").await.unwrap();
        assert_eq!(body, b"body");
    }

    #[tokio::test]
    async fn test_memory_store_missing_key() {
        let store = MemoryStore::new();
        let err = store.get_object("bucket", "missing").await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_memory_store_list_filters_bucket_and_prefix() {
        let store = MemoryStore::new();
        store.insert("b1", "extracted/a.json", vec![]).await;
        store.insert("b1", "extracted/b.json", vec![]).await;
        store.insert("b1", "source/a.pdf", vec![]).await;
        store.insert("b2", "extracted/c.json", vec![]).await;

        let keys = store.list_keys("b1", "extracted/").await.unwrap();
        assert_eq!(keys, vec!["extracted/a.json", "extracted/b.json"]);
    }
}
