//! Error types for the registry resolver.
//!
//! Load-time errors (`LoadError`) reject a whole registry snapshot: a process
//! must not start with an invalid registry. Resolve-time errors
//! (`ResolveError`) are scoped to a single entry and never affect the others.

use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

/// A registry snapshot could not be built from its source list.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum LoadError {
    /// Two entries share the same display name.
    #[error("Duplicate source name '{name}' at positions {first} and {second}")]
    DuplicateName {
        name: String,
        /// 0-based position of the first occurrence.
        first: usize,
        /// 0-based position of the conflicting occurrence.
        second: usize,
    },

    /// An entry has an empty or blank locator.
    #[error("Source '{name}' at position {position} has an empty locator")]
    EmptyLocator { name: String, position: usize },

    /// An entry has an empty or blank name.
    #[error("Source at position {position} has an empty name")]
    EmptyName { position: usize },

    /// Two entries point at the same locator and the policy rejects that.
    #[error("Locator '{locator}' is used by both '{first}' and '{second}'")]
    DuplicateLocator {
        locator: String,
        first: String,
        second: String,
    },
}

/// Coarse classification of a resolve failure.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum FailureKind {
    /// No entry with the requested name exists.
    NotFound,
    /// The document could not be fetched (I/O, HTTP status, timeout, size).
    Unreachable,
    /// The document was fetched but is not a valid structured document.
    Parse,
}

/// A single entry could not be resolved.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum ResolveError {
    #[error("No source named '{name}' in the registry")]
    NotFound { name: String },

    #[error("Source '{name}' is unreachable at '{locator}': {reason}")]
    Unreachable {
        name: String,
        locator: String,
        reason: String,
    },

    #[error("Source '{name}' at '{locator}' is not a valid document: {reason}")]
    Parse {
        name: String,
        locator: String,
        reason: String,
    },
}

impl ResolveError {
    /// The failure class of this error.
    #[must_use]
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::NotFound { .. } => FailureKind::NotFound,
            Self::Unreachable { .. } => FailureKind::Unreachable,
            Self::Parse { .. } => FailureKind::Parse,
        }
    }

    /// Name of the entry the error is about.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::NotFound { name }
            | Self::Unreachable { name, .. }
            | Self::Parse { name, .. } => name,
        }
    }
}

/// A configuration file or environment override could not be used.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("Failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {}: {reason}", path.display())]
    Parse { path: PathBuf, reason: String },

    #[error("Invalid {var} value: {reason}")]
    Env { var: &'static str, reason: String },

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error(transparent)]
    Load(#[from] LoadError),
}

/// Source discovery failed.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DiscoverError {
    #[error("Discovery root does not exist: {}", .0.display())]
    MissingRoot(PathBuf),

    #[error("Invalid exclude glob pattern '{pattern}': {reason}")]
    InvalidExcludePattern { pattern: String, reason: String },

    #[error("Directory traversal error: {0}")]
    Walk(#[from] walkdir::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_name_message() {
        let err = LoadError::DuplicateName {
            name: "Auth Service".to_owned(),
            first: 0,
            second: 3,
        };
        let msg = err.to_string();
        assert!(msg.contains("Auth Service"));
        assert!(msg.contains("positions 0 and 3"));
    }

    #[test]
    fn test_resolve_error_kind_and_name() {
        let err = ResolveError::Unreachable {
            name: "GL Service".to_owned(),
            locator: "/specs/gl-service.yaml".to_owned(),
            reason: "connection refused".to_owned(),
        };
        assert_eq!(err.kind(), FailureKind::Unreachable);
        assert_eq!(err.name(), "GL Service");
        assert!(err.to_string().contains("/specs/gl-service.yaml"));

        let err = ResolveError::NotFound {
            name: "X".to_owned(),
        };
        assert_eq!(err.kind(), FailureKind::NotFound);
    }

    #[test]
    fn test_failure_kind_serializes_snake_case() {
        let json = serde_json::to_string(&FailureKind::NotFound).unwrap();
        assert_eq!(json, "\"not_found\"");
    }
}
