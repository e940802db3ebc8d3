//! Core data model for feature definitions.
//!
//! A feature definition file maps feature names to one or more value
//! variants. Variants carry a handful of well-known fields (channel,
//! extension_types, dependencies, noparent) plus arbitrary free-form
//! metadata that is merged opaquely during resolution.

use serde::{Deserialize, Serialize};
use serde_json::{Map as JsonMap, Value as JsonValue};
use std::collections::HashMap;
use std::fmt;

/// A fully resolved category: one winning record per feature name.
pub type FeatureMap = HashMap<String, FeatureValue>;

/// Release-stability tier, ordered from most stable to least stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Channel {
    Stable,
    Beta,
    Dev,
    Canary,
    Trunk,
}

impl Channel {
    /// All channels, most stable first.
    pub const ALL: [Channel; 5] = [
        Channel::Stable,
        Channel::Beta,
        Channel::Dev,
        Channel::Canary,
        Channel::Trunk,
    ];

    pub fn parse(s: &str) -> Option<Channel> {
        match s {
            "stable" => Some(Channel::Stable),
            "beta" => Some(Channel::Beta),
            "dev" => Some(Channel::Dev),
            "canary" => Some(Channel::Canary),
            "trunk" => Some(Channel::Trunk),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Stable => "stable",
            Channel::Beta => "beta",
            Channel::Dev => "dev",
            Channel::Canary => "canary",
            Channel::Trunk => "trunk",
        }
    }

    /// Returns the least-stable (newest) of the two channels.
    /// Equal channels return themselves.
    pub fn newest(a: Channel, b: Channel) -> Channel {
        a.max(b)
    }
}

impl Default for Channel {
    /// Most stable channel; the fallback when nothing declares or
    /// inherits a channel.
    fn default() -> Self {
        Channel::Stable
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One of the three fixed feature categories, each backed by its own
/// definition file(s).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    Api,
    Manifest,
    Permission,
}

impl Category {
    pub fn parse(s: &str) -> Option<Category> {
        match s {
            "api" => Some(Category::Api),
            "manifest" => Some(Category::Manifest),
            "permission" => Some(Category::Permission),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Category::Api => "api",
            Category::Manifest => "manifest",
            Category::Permission => "permission",
        }
    }

    /// The categories whose state must be available to resolve features of
    /// this category. API features may reference manifest and permission
    /// features; the other two only reference themselves.
    pub fn dependencies(&self) -> &'static [Category] {
        match self {
            Category::Api => &[Category::Api, Category::Manifest, Category::Permission],
            Category::Manifest => &[Category::Manifest],
            Category::Permission => &[Category::Permission],
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A parsed `"<category>:<feature>"` dependency reference.
///
/// The category is kept as a raw string: a reference to an unknown
/// category is not a parse error, it is an unsatisfiable dependency that
/// the driver surfaces once resolution stalls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyRef {
    pub category: String,
    pub feature: String,
}

impl DependencyRef {
    pub fn parse(s: &str) -> Option<DependencyRef> {
        let (category, feature) = s.split_once(':')?;
        if category.is_empty() || feature.is_empty() {
            return None;
        }
        Some(DependencyRef {
            category: category.to_string(),
            feature: feature.to_string(),
        })
    }
}

/// Declared platform validity of one feature value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtensionTypes {
    /// The literal `"all"` wildcard: valid on every platform.
    All,
    /// Valid exactly on the listed platform-type strings.
    List(Vec<String>),
}

/// One declared configuration variant for a feature.
///
/// Stored as a raw JSON object so that free-form metadata fields survive
/// merging untouched; the well-known fields are exposed through typed
/// accessors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureValue {
    fields: JsonMap<String, JsonValue>,
}

impl FeatureValue {
    pub fn new(fields: JsonMap<String, JsonValue>) -> Self {
        FeatureValue { fields }
    }

    pub fn fields(&self) -> &JsonMap<String, JsonValue> {
        &self.fields
    }

    pub fn get(&self, key: &str) -> Option<&JsonValue> {
        self.fields.get(key)
    }

    pub fn name(&self) -> Option<&str> {
        self.fields.get("name").and_then(JsonValue::as_str)
    }

    pub fn set_name(&mut self, name: &str) {
        self.fields
            .insert("name".to_string(), JsonValue::String(name.to_string()));
    }

    /// The declared channel, if present and recognized. Unknown channel
    /// strings are treated as absent.
    pub fn channel(&self) -> Option<Channel> {
        self.fields
            .get("channel")
            .and_then(JsonValue::as_str)
            .and_then(Channel::parse)
    }

    pub fn has_channel(&self) -> bool {
        self.fields.contains_key("channel")
    }

    pub fn set_channel(&mut self, channel: Channel) {
        self.fields.insert(
            "channel".to_string(),
            JsonValue::String(channel.as_str().to_string()),
        );
    }

    /// The declared `extension_types`, if any. The field is either the
    /// `"all"` wildcard, a single platform-type string, or an array of
    /// platform-type strings.
    pub fn extension_types(&self) -> Option<ExtensionTypes> {
        match self.fields.get("extension_types")? {
            JsonValue::String(s) if s == crate::platform::ALL_PLATFORMS => {
                Some(ExtensionTypes::All)
            }
            JsonValue::String(s) => Some(ExtensionTypes::List(vec![s.clone()])),
            JsonValue::Array(items) => Some(ExtensionTypes::List(
                items
                    .iter()
                    .filter_map(JsonValue::as_str)
                    .map(str::to_string)
                    .collect(),
            )),
            _ => None,
        }
    }

    /// Declared dependency references, in declaration order. Entries that
    /// are not `"<category>:<feature>"` strings are skipped.
    pub fn dependencies(&self) -> Vec<DependencyRef> {
        match self.fields.get("dependencies") {
            Some(JsonValue::Array(items)) => items
                .iter()
                .filter_map(JsonValue::as_str)
                .filter_map(DependencyRef::parse)
                .collect(),
            _ => Vec::new(),
        }
    }

    pub fn noparent(&self) -> bool {
        self.fields
            .get("noparent")
            .and_then(JsonValue::as_bool)
            .unwrap_or(false)
    }

    pub fn location(&self) -> Option<&str> {
        self.fields.get("location").and_then(JsonValue::as_str)
    }

    pub fn has_whitelist(&self) -> bool {
        self.fields.contains_key("whitelist")
    }

    /// Overwrite-merge: every field of `other` is copied in, replacing any
    /// existing field of the same name.
    pub fn overlay(&mut self, other: &FeatureValue) {
        for (key, value) in &other.fields {
            self.fields.insert(key.clone(), value.clone());
        }
    }

    /// Applies the parent-merge rule: start from a copy of `parent` with
    /// its `noparent` and `name` fields removed, then overlay this value's
    /// own declared fields on top.
    pub fn merged_with_parent(&self, parent: &FeatureValue) -> FeatureValue {
        let mut merged = parent.clone();
        merged.fields.remove("noparent");
        merged.fields.remove("name");
        merged.overlay(self);
        merged
    }
}

impl From<JsonMap<String, JsonValue>> for FeatureValue {
    fn from(fields: JsonMap<String, JsonValue>) -> Self {
        FeatureValue { fields }
    }
}

/// Candidate parent of a dotted feature name: everything before the last
/// `.`, if there is one. Whether the parent actually exists is decided by
/// the resolver against the category's declared names.
pub fn parent_feature_name(name: &str) -> Option<&str> {
    name.rsplit_once('.').map(|(parent, _)| parent)
}
