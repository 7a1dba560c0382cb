//! # specreg
//!
//! Registry resolver for the API description documents behind a
//! documentation viewer.
//!
//! A registry is an ordered, immutable list of named sources (`name` plus
//! `locator`). Loading validates the list as a whole; resolving fetches and
//! checks one entry at a time, so a broken source never blocks the others.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use specreg::{Registry, Resolver, ResolverOptions, SourceEntry};
//!
//! # async fn run() -> anyhow::Result<()> {
//! let registry = Registry::load(vec![
//!     SourceEntry::new("Auth", "https://docs.example.com/specs/auth.yaml"),
//!     SourceEntry::new("RBAC", "https://docs.example.com/specs/rbac.yaml"),
//! ])?;
//!
//! let resolver = Resolver::new(registry, ResolverOptions::default())?;
//! let doc = resolver.resolve("Auth").await?;
//! println!("{} bytes, {:?}", doc.content.len(), doc.kind);
//!
//! let report = resolver.resolve_all().await;
//! println!("Resolved {} of {}", report.resolved, report.total);
//! # Ok(())
//! # }
//! ```

mod config;
mod discover;
mod document;
mod error;
mod fetch;
mod locator;
pub mod output;
mod registry;
mod report;
mod resolver;

pub use config::{
    CONFIG_ENV, FetchConfig, LocatorPolicy, RegistryConfig, ResolutionMode, SOURCES_ENV,
    SourceEntry,
};
pub use discover::{DiscoverConfig, discover, label_for_stem};
pub use document::{DocumentFormat, DocumentKind};
pub use error::{ConfigError, DiscoverError, FailureKind, LoadError, ResolveError};
pub use registry::Registry;
pub use report::{CatalogReport, DocumentSummary, ResolveFailure};
pub use resolver::{ResolvedDocument, Resolver, ResolverOptions};

/// Validate `sources` and build a registry, accepting shared locators.
///
/// # Errors
///
/// See [`Registry::load`].
pub fn load(sources: Vec<SourceEntry>) -> Result<Registry, LoadError> {
    Registry::load(sources)
}

/// Entries of `registry` in load order.
#[must_use]
pub fn list(registry: &Registry) -> &[SourceEntry] {
    registry.list()
}

/// Resolve one entry with default fetch options.
///
/// Builds a fresh HTTP client per call; long-lived callers should keep a
/// [`Resolver`] instead.
///
/// # Errors
///
/// Returns `ResolveError::NotFound`, `ResolveError::Unreachable` (including
/// a failure to build the HTTP client), or `ResolveError::Parse`.
pub async fn resolve(registry: &Registry, name: &str) -> Result<ResolvedDocument, ResolveError> {
    let resolver =
        Resolver::new(registry.clone(), ResolverOptions::default()).map_err(|e| {
            ResolveError::Unreachable {
                name: name.to_owned(),
                locator: registry
                    .get(name)
                    .map(|entry| entry.locator.clone())
                    .unwrap_or_default(),
                reason: e.to_string(),
            }
        })?;
    resolver.resolve(name).await
}
