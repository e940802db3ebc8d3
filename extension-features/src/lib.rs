// Extension features resolution engine.
//
// Feature definitions for browser extensions live in per-category JSON
// files (api, manifest, permission). Each feature may declare several
// value variants; this crate resolves them to one winning record per
// feature for a target platform, following release-channel stability,
// cross-category dependencies and dotted-name parent inheritance, and
// caches fully resolved categories through a pluggable object cache.

pub mod bundle;
pub mod cache;
pub mod config;
pub mod error;
pub mod loader;
pub mod platform;
pub mod provider;
pub mod resolver;
pub mod types;

pub use bundle::FeaturesBundle;
pub use cache::{MemoryObjectCache, ObjectCache};
pub use config::{CategorySources, FeatureSources};
pub use error::FeatureError;
pub use loader::{load_category, LoadedCategory};
pub use provider::{ContentProvider, FileContentProvider, StaticContentProvider};
pub use resolver::{resolve_feature, ResolutionState, ResolveOutcome};
pub use types::{Category, Channel, DependencyRef, ExtensionTypes, FeatureMap, FeatureValue};
