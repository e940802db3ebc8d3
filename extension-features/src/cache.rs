//! Object cache for fully resolved feature categories.
//!
//! The driver persists each resolved category as a JSON value keyed by
//! `<provider identity>/<platform>/<category>`, so requests against the
//! same file-system identity and platform converge on the same entries
//! while distinct identities never collide.

use crate::error::FeatureError;
use async_trait::async_trait;
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Key-value store for resolved category mappings.
///
/// The engine provides no single-flight guarantee on top of this: two
/// concurrent callers racing on the same key may both compute and both
/// call `set` with identical values.
#[async_trait]
pub trait ObjectCache: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<JsonValue>, FeatureError>;
    async fn set(&self, key: &str, value: JsonValue) -> Result<(), FeatureError>;
}

/// Process-local cache over a `tokio::sync::RwLock`'d map.
#[derive(Default)]
pub struct MemoryObjectCache {
    entries: RwLock<HashMap<String, JsonValue>>,
}

impl MemoryObjectCache {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ObjectCache for MemoryObjectCache {
    async fn get(&self, key: &str) -> Result<Option<JsonValue>, FeatureError> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: JsonValue) -> Result<(), FeatureError> {
        self.entries.write().await.insert(key.to_string(), value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_memory_cache_get_set() {
        let cache = MemoryObjectCache::new();
        assert!(cache.get("k").await.unwrap().is_none());

        cache.set("k", json!({"a": 1})).await.unwrap();
        assert_eq!(cache.get("k").await.unwrap(), Some(json!({"a": 1})));

        cache.set("k", json!({"a": 2})).await.unwrap();
        assert_eq!(cache.get("k").await.unwrap(), Some(json!({"a": 2})));
    }
}
