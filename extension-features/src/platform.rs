//! Canonical platform-type strings and platform-name normalization.
//!
//! Feature values declare validity through `extension_types`: either the
//! `"all"` wildcard or a list of the canonical strings below. Callers may
//! hand the engine looser platform names ("extensions", "apps"); those are
//! normalized once at construction time.

/// Wildcard `extension_types` value: valid on every platform.
pub const ALL_PLATFORMS: &str = "all";

/// The fixed set of canonical platform-type strings.
pub const CANONICAL_PLATFORMS: &[&str] =
    &["extension", "platform_app", "hosted_app", "packaged_app"];

/// Maps a platform identifier to its canonical platform-type string.
///
/// The common plural/collective aliases are folded to their canonical
/// form; anything else is lowercased and passed through unchanged.
pub fn normalize_platform(name: &str) -> String {
    let lowered = name.to_ascii_lowercase();
    match lowered.as_str() {
        "extensions" => "extension".to_string(),
        "apps" | "app" => "platform_app".to_string(),
        _ => lowered,
    }
}

/// Whether `name` is one of the canonical platform-type strings.
pub fn is_canonical(name: &str) -> bool {
    CANONICAL_PLATFORMS.contains(&name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_aliases() {
        assert_eq!(normalize_platform("extensions"), "extension");
        assert_eq!(normalize_platform("apps"), "platform_app");
        assert_eq!(normalize_platform("Extension"), "extension");
    }

    #[test]
    fn test_normalize_passthrough() {
        assert_eq!(normalize_platform("platform_app"), "platform_app");
        assert_eq!(normalize_platform("hosted_app"), "hosted_app");
        assert_eq!(normalize_platform("something_else"), "something_else");
    }

    #[test]
    fn test_canonical_set() {
        for p in CANONICAL_PLATFORMS {
            assert!(is_canonical(p));
            assert_eq!(normalize_platform(p), *p);
        }
        assert!(!is_canonical("all"));
    }
}
