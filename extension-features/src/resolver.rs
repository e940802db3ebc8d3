//! Single-feature resolution: picks the winning value variant for one
//! feature on one platform.
//!
//! Resolution of a feature may require the resolved form of other
//! features, in the same category (dotted-name parents) or in another
//! category (declared dependencies). When a required feature has not been
//! resolved yet, the attempt is deferred rather than failed; the driver
//! retries on its next pass.

use crate::types::{
    parent_feature_name, Category, Channel, ExtensionTypes, FeatureMap, FeatureValue,
};
use std::collections::{HashMap, HashSet};

/// Per-category resolution bookkeeping.
///
/// A feature name lives in exactly one of `unresolved` or `resolved` at
/// any time; names absent from both once the category drains did not
/// exist on the target platform.
#[derive(Debug, Clone, Default)]
pub struct ResolutionState {
    pub unresolved: HashMap<String, Vec<FeatureValue>>,
    pub resolved: FeatureMap,
    pub extra: HashMap<String, Vec<FeatureValue>>,
    /// Every name declared by the category's primary sources; used to
    /// decide whether a dotted-name prefix is a real parent feature.
    pub all_names: HashSet<String>,
}

impl ResolutionState {
    /// Fresh state: everything unresolved.
    pub fn new(
        values: HashMap<String, Vec<FeatureValue>>,
        extra: HashMap<String, Vec<FeatureValue>>,
    ) -> Self {
        let all_names = values.keys().cloned().collect();
        ResolutionState {
            unresolved: values,
            resolved: FeatureMap::new(),
            extra,
            all_names,
        }
    }

    /// State recovered from a cache hit: fully resolved, nothing to do.
    pub fn from_resolved(resolved: FeatureMap) -> Self {
        let all_names = resolved.keys().cloned().collect();
        ResolutionState {
            unresolved: HashMap::new(),
            resolved,
            extra: HashMap::new(),
            all_names,
        }
    }

    pub fn is_done(&self) -> bool {
        self.unresolved.is_empty()
    }
}

/// Outcome of one resolution attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolveOutcome {
    /// A required feature or category is not resolved yet; retry later.
    NotReady,
    /// Resolution finished. `None` means the feature does not exist on the
    /// target platform, which is absence, not an error.
    Resolved(Option<FeatureValue>),
}

/// Resolves one feature from its declared value variants.
///
/// Walks the variants in order, filtering by platform, inheriting channel
/// and platform validity from dependencies and the dotted-name parent,
/// and merging all surviving variants of the winning (most stable)
/// channel. `extra` records are overlaid unconditionally at the end.
pub fn resolve_feature(
    name: &str,
    values: &[FeatureValue],
    extra: &[FeatureValue],
    platform: &str,
    category: Category,
    states: &HashMap<Category, ResolutionState>,
) -> ResolveOutcome {
    let mut winner: Option<FeatureValue> = None;
    let mut winner_channel: Option<Channel> = None;

    for value in values {
        // Declared platform validity. None = inherit from dependencies.
        let inherit_platform = value.extension_types().is_none();
        let mut valid_platform: Option<bool> = match value.extension_types() {
            None => None,
            Some(ExtensionTypes::All) => Some(true),
            Some(ExtensionTypes::List(types)) => Some(types.iter().any(|t| t == platform)),
        };

        // Declared channel. None = inherit the least stable among
        // dependency channels, else default to stable.
        let inherit_channel = !value.has_channel();
        let mut channel: Option<Channel> = value.channel();

        let mut effective = value.clone();
        let mut deps = value.dependencies();

        if !value.noparent() {
            if let Some(parent) = parent_feature_name(name) {
                let own_state = match states.get(&category) {
                    Some(state) => state,
                    None => return ResolveOutcome::NotReady,
                };
                if own_state.all_names.contains(parent) {
                    if own_state.unresolved.contains_key(parent) {
                        return ResolveOutcome::NotReady;
                    }
                    // The parent may be absent from `resolved` if it does
                    // not exist on this platform; the synthetic dependency
                    // below then invalidates the child as well.
                    if let Some(parent_value) = own_state.resolved.get(parent) {
                        effective = value.merged_with_parent(parent_value);
                    }
                    deps.push(crate::types::DependencyRef {
                        category: category.name().to_string(),
                        feature: parent.to_string(),
                    });
                }
            }
        }

        let mut ready = true;
        for dep_ref in &deps {
            let dep_state = Category::parse(&dep_ref.category).and_then(|c| states.get(&c));
            let dep_state = match dep_state {
                // Category not in the requested dependency set: this value
                // can never become ready here. Defer; the driver's stall
                // detection reports it.
                None => {
                    ready = false;
                    break;
                }
                Some(state) => state,
            };
            if dep_state.unresolved.contains_key(&dep_ref.feature) {
                ready = false;
                break;
            }
            let dep = dep_state.resolved.get(&dep_ref.feature);

            // Platform validity inherited from dependencies: present means
            // valid, absent means invalid. Once false it stays false.
            if inherit_platform && valid_platform != Some(false) {
                valid_platform = Some(dep.is_some());
            }
            // Inherited channel: a feature is only as stable as its least
            // stable dependency.
            if inherit_channel {
                if let Some(dep_channel) = dep.and_then(FeatureValue::channel) {
                    channel = Some(match channel {
                        None => dep_channel,
                        Some(current) => Channel::newest(current, dep_channel),
                    });
                }
            }
        }
        if !ready {
            return ResolveOutcome::NotReady;
        }

        let valid_platform = valid_platform.unwrap_or(true);
        if !valid_platform {
            continue;
        }
        let channel = channel.unwrap_or_default();

        // Merge policy: the most stable channel wins. A strictly more
        // stable variant restarts the merge, an equally stable variant
        // merges in (later fields win), a less stable variant is dropped.
        match winner_channel {
            Some(best) if channel > best => {}
            Some(best) if channel == best => {
                if let Some(w) = winner.as_mut() {
                    w.overlay(&effective);
                }
            }
            _ => {
                winner = Some(effective);
                winner_channel = Some(channel);
            }
        }
    }

    let (mut feature, channel) = match (winner, winner_channel) {
        (Some(feature), Some(channel)) => (feature, channel),
        _ => return ResolveOutcome::Resolved(None),
    };

    for record in extra {
        feature.overlay(record);
    }
    if feature.name().is_none() {
        feature.set_name(name);
    }
    feature.set_channel(channel);
    ResolveOutcome::Resolved(Some(feature))
}
