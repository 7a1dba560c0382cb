//! Configuration types for the registry resolver.
//!
//! A configuration is the static, declarative list of sources plus the
//! options that govern how they are loaded and fetched. It is read once at
//! process start; reconfiguration builds a new `Registry` wholesale.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::registry::Registry;
use crate::resolver::ResolverOptions;

/// Environment variable naming the config file when none is passed explicitly.
pub const CONFIG_ENV: &str = "SPECREG_CONFIG";

/// Environment variable carrying a JSON array of `{name, url}` objects.
/// When set it replaces the configured `sources` wholesale.
pub const SOURCES_ENV: &str = "SPECREG_SOURCES";

/// One named document source, in the order it should be displayed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceEntry {
    /// Display label. Unique within a registry.
    pub name: String,
    /// URI or path of the document. Accepts `url` as an alias in config files.
    #[serde(alias = "url")]
    pub locator: String,
}

impl SourceEntry {
    #[must_use]
    pub fn new(name: impl Into<String>, locator: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            locator: locator.into(),
        }
    }
}

/// What to do when two entries share a locator under different names.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocatorPolicy {
    /// Accept silently. The same document may legitimately appear twice.
    #[default]
    Allow,
    /// Accept, but log a warning for each shared locator.
    Warn,
    /// Refuse to load the registry.
    Reject,
}

/// When documents are fetched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionMode {
    /// Fetch a document only when it is requested.
    #[default]
    Lazy,
    /// Fetch every document at startup and report failures up front.
    Eager,
}

/// How locators are turned into fetches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
#[non_exhaustive]
pub struct FetchConfig {
    /// Base URL that bare-path locators are joined against, the way a
    /// browser resolves `/specs/auth.yaml` relative to the viewer page.
    pub base_url: Option<String>,
    /// Directory that bare-path locators are read from when no `base_url`
    /// is set. A leading `/` refers to the root of this tree.
    pub document_root: Option<PathBuf>,
    /// Per-fetch timeout in seconds (default: 30).
    pub timeout_secs: u64,
    /// Maximum document size in bytes (default: 10 MiB).
    pub max_document_size: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            document_root: None,
            timeout_secs: 30,
            max_document_size: 10_485_760,
        }
    }
}

impl FetchConfig {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Full registry configuration as read from a file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
#[non_exhaustive]
pub struct RegistryConfig {
    pub mode: ResolutionMode,
    pub duplicate_locators: LocatorPolicy,
    /// Require an `openapi` or `swagger` version key in every document.
    pub require_api_description: bool,
    pub fetch: FetchConfig,
    pub sources: Vec<SourceEntry>,
}

impl RegistryConfig {
    /// Build a configuration around a plain source list with default options.
    #[must_use]
    pub fn with_sources(sources: Vec<SourceEntry>) -> Self {
        Self {
            sources,
            ..Self::default()
        }
    }

    /// Read a configuration file. `.json` files are parsed as JSON; anything
    /// else is parsed as YAML (which also accepts JSON).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Read` if the file cannot be read and
    /// `ConfigError::Parse` if its content does not match the config shape.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_owned(),
            source,
        })?;

        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("json"));

        let parsed = if is_json {
            serde_json::from_str::<Self>(&content).map_err(|e| e.to_string())
        } else {
            serde_saphyr::from_str::<Self>(&content).map_err(|e| e.to_string())
        };

        let config = parsed.map_err(|reason| ConfigError::Parse {
            path: path.to_owned(),
            reason,
        })?;
        tracing::debug!(
            path = %path.display(),
            sources = config.sources.len(),
            "Loaded registry config"
        );
        Ok(config)
    }

    /// Apply environment overrides (`SPECREG_SOURCES`).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Env` if the override is set but malformed.
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        match std::env::var(SOURCES_ENV) {
            Ok(raw) => self.apply_sources_override(&raw),
            Err(std::env::VarError::NotPresent) => Ok(()),
            Err(e) => Err(ConfigError::Env {
                var: SOURCES_ENV,
                reason: e.to_string(),
            }),
        }
    }

    /// Replace `sources` with a JSON array of `{name, url}` objects.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Env` if `raw` is not such an array.
    pub fn apply_sources_override(&mut self, raw: &str) -> Result<(), ConfigError> {
        let sources: Vec<SourceEntry> =
            serde_json::from_str(raw).map_err(|e| ConfigError::Env {
                var: SOURCES_ENV,
                reason: e.to_string(),
            })?;
        tracing::info!(sources = sources.len(), "Sources replaced from environment");
        self.sources = sources;
        Ok(())
    }

    /// Validate the source list and build the registry snapshot.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Load` if the sources violate a registry invariant.
    pub fn registry(&self) -> Result<Registry, ConfigError> {
        Ok(Registry::load_with_policy(
            self.sources.clone(),
            self.duplicate_locators,
        )?)
    }

    /// Options for a `Resolver` built from this configuration.
    #[must_use]
    pub fn resolver_options(&self) -> ResolverOptions {
        ResolverOptions {
            fetch: self.fetch.clone(),
            require_api_description: self.require_api_description,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn temp_config(suffix: &str, content: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_yaml_config_with_url_alias() {
        let file = temp_config(
            ".yaml",
            r"
mode: eager
duplicate_locators: reject
fetch:
  base_url: https://docs.example.com
  timeout_secs: 5
sources:
  - name: Auth Service
    url: /specs/auth-service.yaml
  - name: RBAC Service
    locator: /specs/rbac-service.yaml
",
        );
        let config = RegistryConfig::from_file(file.path()).unwrap();
        assert_eq!(config.mode, ResolutionMode::Eager);
        assert_eq!(config.duplicate_locators, LocatorPolicy::Reject);
        assert_eq!(
            config.fetch.base_url.as_deref(),
            Some("https://docs.example.com")
        );
        assert_eq!(config.fetch.timeout(), Duration::from_secs(5));
        assert_eq!(config.fetch.max_document_size, 10_485_760);
        assert_eq!(
            config.sources,
            vec![
                SourceEntry::new("Auth Service", "/specs/auth-service.yaml"),
                SourceEntry::new("RBAC Service", "/specs/rbac-service.yaml"),
            ]
        );
    }

    #[test]
    fn test_json_config_defaults() {
        let file = temp_config(
            ".json",
            r#"{"sources": [{"name": "GL Service", "url": "/specs/gl-service.yaml"}]}"#,
        );
        let config = RegistryConfig::from_file(file.path()).unwrap();
        assert_eq!(config.mode, ResolutionMode::Lazy);
        assert_eq!(config.duplicate_locators, LocatorPolicy::Allow);
        assert!(!config.require_api_description);
        assert_eq!(config.sources.len(), 1);
    }

    #[test]
    fn test_unknown_field_is_parse_error() {
        let file = temp_config(".yaml", "dom_id: '#swagger-ui'\nsources: []\n");
        let err = RegistryConfig::from_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }), "got: {err}");
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = RegistryConfig::from_file(&dir.path().join("nope.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_sources_override_replaces_wholesale() {
        let mut config = RegistryConfig::with_sources(vec![SourceEntry::new("Old", "/old.yaml")]);
        config
            .apply_sources_override(r#"[{"name": "AP Service", "url": "/specs/ap-service.yaml"}]"#)
            .unwrap();
        assert_eq!(
            config.sources,
            vec![SourceEntry::new("AP Service", "/specs/ap-service.yaml")]
        );
    }

    #[test]
    fn test_sources_override_rejects_garbage() {
        let mut config = RegistryConfig::default();
        let err = config.apply_sources_override("not json").unwrap_err();
        assert!(matches!(err, ConfigError::Env { var: SOURCES_ENV, .. }));
    }

    #[test]
    fn test_registry_propagates_load_errors() {
        let config = RegistryConfig::with_sources(vec![
            SourceEntry::new("AR Service", "/specs/ar.yaml"),
            SourceEntry::new("AR Service", "/specs/ar2.yaml"),
        ]);
        let err = config.registry().unwrap_err();
        assert!(matches!(err, ConfigError::Load(_)));
    }
}
