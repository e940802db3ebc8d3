//! Error type for feature loading and resolution.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FeatureError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid feature definition for {name} in {path}: {reason}")]
    InvalidDefinition {
        path: String,
        name: String,
        reason: String,
    },

    #[error("cache error: {0}")]
    Cache(String),

    #[error("cache entry {key} is not a feature map: {source}")]
    CacheDecode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("dependency cycle or missing category while resolving {category} features: {features:?}")]
    DependencyCycle {
        category: String,
        features: Vec<String>,
    },
}
