//! Cross-category resolution driver.
//!
//! [`FeaturesBundle`] produces the fully resolved feature map for a
//! category, transparently loading and resolving whatever other
//! categories that category's features may depend on, and persisting
//! every freshly computed category to the object cache.

use crate::cache::ObjectCache;
use crate::config::FeatureSources;
use crate::error::FeatureError;
use crate::loader;
use crate::platform::normalize_platform;
use crate::provider::ContentProvider;
use crate::resolver::{resolve_feature, ResolutionState, ResolveOutcome};
use crate::types::{Category, FeatureMap};
use futures::future::try_join_all;
use std::collections::HashMap;
use std::sync::Arc;

/// Resolution engine for one (content identity, platform) pair.
///
/// Cheap to clone the inputs into; all state lives in the injected cache,
/// so a bundle itself is stateless between calls.
pub struct FeaturesBundle {
    provider: Arc<dyn ContentProvider>,
    cache: Arc<dyn ObjectCache>,
    sources: FeatureSources,
    platform: String,
}

impl FeaturesBundle {
    /// Creates a bundle targeting `platform` (normalized once here).
    pub fn new(
        provider: Arc<dyn ContentProvider>,
        cache: Arc<dyn ObjectCache>,
        sources: FeatureSources,
        platform: &str,
    ) -> Self {
        FeaturesBundle {
            provider,
            cache,
            sources,
            platform: normalize_platform(platform),
        }
    }

    /// The normalized target platform.
    pub fn platform(&self) -> &str {
        &self.platform
    }

    /// Resolved permission features.
    pub async fn permission_features(&self) -> Result<FeatureMap, FeatureError> {
        self.features(Category::Permission).await
    }

    /// Resolved manifest features.
    pub async fn manifest_features(&self) -> Result<FeatureMap, FeatureError> {
        self.features(Category::Manifest).await
    }

    /// Resolved API features. May pull in the manifest and permission
    /// categories, since API features can depend on either.
    pub async fn api_features(&self) -> Result<FeatureMap, FeatureError> {
        self.features(Category::Api).await
    }

    /// Resolves `category` and returns its feature map.
    ///
    /// Every category that had to be computed along the way is written to
    /// the cache, so a later request for a dependency category is a hit
    /// even if it was never asked for directly.
    pub async fn features(&self, category: Category) -> Result<FeatureMap, FeatureError> {
        if let Some(cached) = self.cached_category(category).await? {
            tracing::debug!(category = %category, "serving features from cache");
            return Ok(cached);
        }

        let dependency_categories = category.dependencies();
        let lookups = dependency_categories
            .iter()
            .map(|c| self.cached_category(*c));
        let cached = try_join_all(lookups).await?;

        let mut states: HashMap<Category, ResolutionState> = HashMap::new();
        let mut computed: Vec<Category> = Vec::new();
        for (cat, hit) in dependency_categories.iter().zip(cached) {
            match hit {
                Some(resolved) => {
                    states.insert(*cat, ResolutionState::from_resolved(resolved));
                }
                None => {
                    let loaded =
                        loader::load_category(&*self.provider, self.sources.for_category(*cat))
                            .await?;
                    states.insert(*cat, ResolutionState::new(loaded.values, loaded.extra));
                    computed.push(*cat);
                }
            }
        }

        self.resolve_to_fixed_point(&mut states)?;

        for cat in computed {
            let resolved = &states[&cat].resolved;
            let value = serde_json::to_value(resolved)
                .map_err(|e| FeatureError::Cache(format!("failed to encode {}: {}", cat, e)))?;
            self.cache.set(&self.cache_key(cat), value).await?;
        }

        let state = states
            .remove(&category)
            .unwrap_or_default();
        Ok(state.resolved)
    }

    /// Runs resolution passes until every category drains or a pass makes
    /// no progress at all, which means a dependency cycle or a reference
    /// to a category outside the dependency set.
    fn resolve_to_fixed_point(
        &self,
        states: &mut HashMap<Category, ResolutionState>,
    ) -> Result<(), FeatureError> {
        let mut pass = 0usize;
        while states.values().any(|s| !s.is_done()) {
            pass += 1;
            let mut progressed = 0usize;

            let mut categories: Vec<Category> = states.keys().copied().collect();
            categories.sort();
            for cat in categories {
                let names: Vec<String> = states[&cat].unresolved.keys().cloned().collect();
                for name in names {
                    let values = states[&cat].unresolved[&name].clone();
                    let extra = states[&cat].extra.get(&name).cloned().unwrap_or_default();
                    match resolve_feature(&name, &values, &extra, &self.platform, cat, states) {
                        ResolveOutcome::NotReady => {}
                        ResolveOutcome::Resolved(result) => {
                            if let Some(state) = states.get_mut(&cat) {
                                state.unresolved.remove(&name);
                                if let Some(feature) = result {
                                    state.resolved.insert(name, feature);
                                }
                                progressed += 1;
                            }
                        }
                    }
                }
            }

            tracing::trace!(pass, progressed, "resolution pass complete");
            if progressed == 0 {
                let (category, features) = stuck_features(states);
                tracing::warn!(
                    category = %category,
                    ?features,
                    "resolution stalled; dependency cycle or missing category"
                );
                return Err(FeatureError::DependencyCycle { category, features });
            }
        }
        Ok(())
    }

    async fn cached_category(&self, category: Category) -> Result<Option<FeatureMap>, FeatureError> {
        let key = self.cache_key(category);
        match self.cache.get(&key).await? {
            Some(value) => {
                let map = serde_json::from_value(value)
                    .map_err(|e| FeatureError::CacheDecode { key, source: e })?;
                Ok(Some(map))
            }
            None => Ok(None),
        }
    }

    fn cache_key(&self, category: Category) -> String {
        format!(
            "{}/{}/{}",
            self.provider.identity(),
            self.platform,
            category.name()
        )
    }
}

/// First stuck category (alphabetically) and its remaining feature names,
/// sorted for deterministic diagnostics.
fn stuck_features(states: &HashMap<Category, ResolutionState>) -> (String, Vec<String>) {
    let mut categories: Vec<Category> = states
        .iter()
        .filter(|(_, s)| !s.is_done())
        .map(|(c, _)| *c)
        .collect();
    categories.sort();
    let category = categories[0];
    let mut features: Vec<String> = states[&category].unresolved.keys().cloned().collect();
    features.sort();
    (category.name().to_string(), features)
}
