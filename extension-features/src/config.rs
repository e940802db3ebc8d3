//! Source-file configuration for the three feature categories.

use crate::types::Category;
use serde::{Deserialize, Serialize};

/// The files backing one category: primary feature-definition sources plus
/// optional extra schema files.
///
/// Primary sources are subject to the loader's visibility filter; extra
/// sources are merged unconditionally at the end of resolution. Any path
/// may be absent on a given provider.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CategorySources {
    pub features: Vec<String>,
    pub extras: Vec<String>,
}

impl CategorySources {
    pub fn new(features: impl Into<String>) -> Self {
        CategorySources {
            features: vec![features.into()],
            extras: Vec::new(),
        }
    }

    pub fn with_extra(mut self, path: impl Into<String>) -> Self {
        self.extras.push(path.into());
        self
    }
}

/// Per-category source files, with the conventional file layout as the
/// default: `_<category>_features.json` definitions, plus the base
/// `manifest.json` / `permissions.json` schemas as extras.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FeatureSources {
    pub api: CategorySources,
    pub manifest: CategorySources,
    pub permission: CategorySources,
}

impl Default for FeatureSources {
    fn default() -> Self {
        FeatureSources {
            api: CategorySources::new("_api_features.json"),
            manifest: CategorySources::new("_manifest_features.json").with_extra("manifest.json"),
            permission: CategorySources::new("_permission_features.json")
                .with_extra("permissions.json"),
        }
    }
}

impl FeatureSources {
    pub fn for_category(&self, category: Category) -> &CategorySources {
        match category {
            Category::Api => &self.api,
            Category::Manifest => &self.manifest,
            Category::Permission => &self.permission,
        }
    }
}
