//! Feature value loader: merges raw feature-definition records from a
//! category's sources into per-name value lists.
//!
//! A single feature name may carry several simultaneously declared
//! variants (platform-specific alternates), either as repeated entries
//! across sources or as a list within one source. The loader preserves
//! encounter order: source order first, then declaration order.

use crate::config::CategorySources;
use crate::error::FeatureError;
use crate::provider::ContentProvider;
use crate::types::FeatureValue;
use futures::future::{try_join, try_join_all};
use serde_json::Value as JsonValue;
use std::collections::HashMap;

/// The merged raw content of one category.
#[derive(Debug, Clone, Default)]
pub struct LoadedCategory {
    /// Feature name → declared value variants from primary sources, after
    /// the visibility filter.
    pub values: HashMap<String, Vec<FeatureValue>>,
    /// Feature name → records from extra schema sources. Never filtered;
    /// overlaid unconditionally once a feature resolves.
    pub extra: HashMap<String, Vec<FeatureValue>>,
}

/// Loads and merges all sources for one category.
///
/// All reads are issued concurrently. Sources the provider reports absent
/// contribute nothing; read and parse failures propagate.
pub async fn load_category(
    provider: &dyn ContentProvider,
    sources: &CategorySources,
) -> Result<LoadedCategory, FeatureError> {
    let primary_reads = sources.features.iter().map(|p| provider.read_object(p));
    let extra_reads = sources.extras.iter().map(|p| provider.read_object(p));
    let (primaries, extras) =
        try_join(try_join_all(primary_reads), try_join_all(extra_reads)).await?;

    let mut loaded = LoadedCategory::default();
    for (path, content) in sources.features.iter().zip(primaries) {
        match content {
            Some(object) => append_source(&mut loaded.values, path, object, true)?,
            None => tracing::debug!(path = %path, "feature source absent, skipping"),
        }
    }
    for (path, content) in sources.extras.iter().zip(extras) {
        match content {
            Some(object) => append_source(&mut loaded.extra, path, object, false)?,
            None => tracing::debug!(path = %path, "extra schema source absent, skipping"),
        }
    }
    Ok(loaded)
}

fn append_source(
    merged: &mut HashMap<String, Vec<FeatureValue>>,
    path: &str,
    object: serde_json::Map<String, JsonValue>,
    filtered: bool,
) -> Result<(), FeatureError> {
    for (name, entry) in object {
        let variants = match entry {
            JsonValue::Object(fields) => vec![FeatureValue::new(fields)],
            JsonValue::Array(items) => items
                .into_iter()
                .map(|item| match item {
                    JsonValue::Object(fields) => Ok(FeatureValue::new(fields)),
                    _ => Err(invalid_definition(path, &name, "expected an object or a list of objects")),
                })
                .collect::<Result<Vec<_>, _>>()?,
            _ => return Err(invalid_definition(path, &name, "expected an object or a list of objects")),
        };
        for value in variants {
            if filtered {
                check_extension_types(&value, path, &name)?;
                if is_ignored(&name, &value) {
                    tracing::trace!(feature = %name, path = %path, "dropping ignored feature value");
                    continue;
                }
            }
            merged.entry(name.clone()).or_default().push(value);
        }
    }
    Ok(())
}

fn invalid_definition(path: &str, name: &str, reason: &str) -> FeatureError {
    FeatureError::InvalidDefinition {
        path: path.to_string(),
        name: name.to_string(),
        reason: reason.to_string(),
    }
}

/// Shape check for `extension_types` on primary sources: the wildcard, a
/// platform-type string, or a list of platform-type strings. Extra schema
/// records are opaque overlays and are not checked.
fn check_extension_types(
    value: &FeatureValue,
    path: &str,
    name: &str,
) -> Result<(), FeatureError> {
    match value.get("extension_types") {
        None | Some(JsonValue::String(_)) => Ok(()),
        Some(JsonValue::Array(items)) if items.iter().all(JsonValue::is_string) => Ok(()),
        Some(_) => Err(invalid_definition(
            path,
            name,
            "extension_types must be a string or a list of strings",
        )),
    }
}

/// Visibility filter for primary sources: component-located and
/// whitelisted values are dropped, except for `*Private` features, which
/// are filtered elsewhere.
fn is_ignored(name: &str, value: &FeatureValue) -> bool {
    if name.ends_with("Private") {
        return false;
    }
    value.location() == Some("component") || value.has_whitelist()
}
