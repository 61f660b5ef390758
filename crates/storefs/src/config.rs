use std::collections::BTreeSet;

/// Read-only view of an authenticated connection, owned by the host's
/// credential collaborator. The engine never refreshes the token itself.
#[derive(Debug, Clone)]
pub struct ConnectionContext {
    /// Key distinguishing which remote store the cached tree reflects
    pub host: String,
    /// Base API endpoint, without a trailing slash
    pub api_url: String,
    /// Bearer token supplied by the host
    pub access_token: String,
}

impl ConnectionContext {
    pub fn new<H, U, T>(host: H, api_url: U, access_token: T) -> Self
    where
        H: Into<String>,
        U: Into<String>,
        T: Into<String>,
    {
        let api_url: String = api_url.into();
        ConnectionContext {
            host: host.into(),
            api_url: api_url.trim_end_matches('/').to_string(),
            access_token: access_token.into(),
        }
    }
}

/// Names beginning with these prefixes are system-owned in the remote store
/// and never enter the tree cache.
pub const DEFAULT_RESERVED_PREFIXES: &[&str] = &["msdyn_", "mscrm_", "adx_", "microsoft"];

/// Static engine behavior, fixed at construction
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Case-insensitive name prefixes excluded at listing time
    pub reserved_prefixes: Vec<String>,
    /// When set, every mutating operation fails with `NoPermission`
    pub read_only: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            reserved_prefixes: DEFAULT_RESERVED_PREFIXES
                .iter()
                .map(|p| p.to_string())
                .collect(),
            read_only: false,
        }
    }
}

impl EngineConfig {
    pub fn read_only() -> Self {
        EngineConfig {
            read_only: true,
            ..EngineConfig::default()
        }
    }

    pub fn is_reserved(&self, name: &str) -> bool {
        let lowered = name.to_lowercase();
        self.reserved_prefixes
            .iter()
            .any(|prefix| lowered.starts_with(&prefix.to_lowercase()))
    }
}

/// Allowed file-extension filter applied at listing time.
///
/// Extensions are normalized to lowercase with a leading dot; an empty set
/// allows everything. Excluded names never enter the tree cache.
#[derive(Debug, Clone, Default)]
pub struct FilterSet {
    extensions: BTreeSet<String>,
}

impl FilterSet {
    pub fn from_extensions<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let extensions = extensions
            .into_iter()
            .map(|ext| {
                let ext = ext.as_ref().trim().to_lowercase();
                if ext.starts_with('.') {
                    ext
                } else {
                    format!(".{}", ext)
                }
            })
            .collect();
        FilterSet { extensions }
    }

    pub fn is_empty(&self) -> bool {
        self.extensions.is_empty()
    }

    pub fn allows(&self, name: &str) -> bool {
        if self.extensions.is_empty() {
            return true;
        }
        match extension_of(name) {
            Some(ext) => self.extensions.contains(&ext),
            None => false,
        }
    }
}

/// Lowercased extension of a slash-delimited name, including the dot
pub(crate) fn extension_of(name: &str) -> Option<String> {
    let base = tinytree::path::basename(name);
    base.rfind('.').map(|at| base[at..].to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_trims_trailing_slash() {
        let ctx = ConnectionContext::new("prod", "https://example.test/api/", "tok");
        assert_eq!(ctx.api_url, "https://example.test/api");
    }

    #[test]
    fn test_reserved_prefixes_case_insensitive() {
        let config = EngineConfig::default();
        assert!(config.is_reserved("msdyn_internal.js"));
        assert!(config.is_reserved("MSDYN_internal.js"));
        assert!(config.is_reserved("Microsoft.Owned/file.css"));
        assert!(!config.is_reserved("my_app/msdyn_like.js"));
    }

    #[test]
    fn test_filter_normalization() {
        let filter = FilterSet::from_extensions(["JS", ".Css"]);
        assert!(filter.allows("a/b.js"));
        assert!(filter.allows("style.CSS"));
        assert!(!filter.allows("page.html"));
        assert!(!filter.allows("no-extension"));
    }

    #[test]
    fn test_empty_filter_allows_all() {
        let filter = FilterSet::default();
        assert!(filter.allows("anything.xyz"));
        assert!(filter.allows("no-extension"));
    }

    #[test]
    fn test_extension_of_uses_basename() {
        assert_eq!(extension_of("a.js/b"), None);
        assert_eq!(extension_of("dir/page.HTML"), Some(".html".to_string()));
    }
}
