//! Content providers: where feature definition files come from.
//!
//! The engine only needs parsed JSON objects keyed by path, plus a stable
//! identity string to namespace its cache entries. A directory-backed
//! provider covers the normal case; a static in-memory provider is useful
//! for tests and for embedding definitions directly.

use crate::error::FeatureError;
use async_trait::async_trait;
use serde_json::{Map as JsonMap, Value as JsonValue};
use std::collections::HashMap;
use std::path::PathBuf;

/// Source of parsed feature-definition content.
#[async_trait]
pub trait ContentProvider: Send + Sync {
    /// Reads and parses the JSON object at `path`.
    ///
    /// Returns `Ok(None)` when the file does not exist; absent sources are
    /// expected (optional extra schema files) and never an error. A file
    /// that exists but is unreadable or is not a JSON object is an error.
    async fn read_object(&self, path: &str) -> Result<Option<JsonMap<String, JsonValue>>, FeatureError>;

    /// Stable identity of the backing store, used to namespace cache keys.
    /// Two providers serving the same content must report the same identity.
    fn identity(&self) -> String;
}

/// Reads feature definition files from a directory tree via `tokio::fs`.
pub struct FileContentProvider {
    root: PathBuf,
}

impl FileContentProvider {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        FileContentProvider { root: root.into() }
    }
}

#[async_trait]
impl ContentProvider for FileContentProvider {
    async fn read_object(&self, path: &str) -> Result<Option<JsonMap<String, JsonValue>>, FeatureError> {
        let full = self.root.join(path);
        let content = match tokio::fs::read_to_string(&full).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(FeatureError::Io {
                    path: full.display().to_string(),
                    source: e,
                })
            }
        };
        parse_object(&content, &full.display().to_string()).map(Some)
    }

    fn identity(&self) -> String {
        self.root.display().to_string()
    }
}

/// In-memory provider over a fixed path → JSON object map.
pub struct StaticContentProvider {
    files: HashMap<String, JsonMap<String, JsonValue>>,
    identity: String,
}

impl StaticContentProvider {
    pub fn new(identity: impl Into<String>) -> Self {
        StaticContentProvider {
            files: HashMap::new(),
            identity: identity.into(),
        }
    }

    /// Adds a file. `content` must be a JSON object.
    pub fn with_file(mut self, path: impl Into<String>, content: JsonValue) -> Self {
        if let JsonValue::Object(map) = content {
            self.files.insert(path.into(), map);
        }
        self
    }
}

#[async_trait]
impl ContentProvider for StaticContentProvider {
    async fn read_object(&self, path: &str) -> Result<Option<JsonMap<String, JsonValue>>, FeatureError> {
        Ok(self.files.get(path).cloned())
    }

    fn identity(&self) -> String {
        self.identity.clone()
    }
}

fn parse_object(content: &str, path: &str) -> Result<JsonMap<String, JsonValue>, FeatureError> {
    let parsed: JsonValue = serde_json::from_str(content).map_err(|e| FeatureError::Parse {
        path: path.to_string(),
        source: e,
    })?;
    match parsed {
        JsonValue::Object(map) => Ok(map),
        other => Err(FeatureError::Parse {
            path: path.to_string(),
            source: serde::de::Error::custom(format!(
                "expected a JSON object at the top level, got {}",
                json_type_name(&other)
            )),
        }),
    }
}

fn json_type_name(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "a boolean",
        JsonValue::Number(_) => "a number",
        JsonValue::String(_) => "a string",
        JsonValue::Array(_) => "an array",
        JsonValue::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::env::temp_dir;

    #[tokio::test]
    async fn test_file_provider_reads_json_object() {
        let dir = temp_dir().join(format!("features_provider_test_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(
            dir.join("_api_features.json"),
            r#"{"alarms": {"channel": "stable"}}"#,
        )
        .unwrap();

        let provider = FileContentProvider::new(&dir);
        let obj = provider.read_object("_api_features.json").await.unwrap().unwrap();
        assert_eq!(obj["alarms"]["channel"], json!("stable"));

        // Cleanup
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn test_file_provider_absent_is_none() {
        let dir = temp_dir().join(format!("features_provider_absent_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();

        let provider = FileContentProvider::new(&dir);
        assert!(provider.read_object("missing.json").await.unwrap().is_none());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn test_file_provider_malformed_is_parse_error() {
        let dir = temp_dir().join(format!("features_provider_malformed_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("bad.json"), "not json").unwrap();

        let provider = FileContentProvider::new(&dir);
        let err = provider.read_object("bad.json").await.unwrap_err();
        assert!(matches!(err, FeatureError::Parse { .. }));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn test_file_provider_non_object_top_level() {
        let dir = temp_dir().join(format!("features_provider_nonobj_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("list.json"), "[1, 2, 3]").unwrap();

        let provider = FileContentProvider::new(&dir);
        let err = provider.read_object("list.json").await.unwrap_err();
        assert!(matches!(err, FeatureError::Parse { .. }));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn test_static_provider() {
        let provider = StaticContentProvider::new("test")
            .with_file("a.json", json!({"x": {"channel": "dev"}}));
        assert!(provider.read_object("a.json").await.unwrap().is_some());
        assert!(provider.read_object("b.json").await.unwrap().is_none());
        assert_eq!(provider.identity(), "test");
    }
}
