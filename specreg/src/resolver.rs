//! Resolution of registry entries into checked documents.

use chrono::{DateTime, Utc};

use crate::config::{FetchConfig, SourceEntry};
use crate::document::{DocumentFormat, DocumentKind, check_document, format_hint};
use crate::error::{ConfigError, ResolveError};
use crate::fetch::Fetcher;
use crate::locator::target_for;
use crate::registry::Registry;
use crate::report::CatalogReport;

/// Options that shape every resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[non_exhaustive]
pub struct ResolverOptions {
    pub fetch: FetchConfig,
    /// Require an `openapi` or `swagger` version key in every document.
    pub require_api_description: bool,
}

/// A fetched document that passed the structural check.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub struct ResolvedDocument {
    pub entry: SourceEntry,
    /// Raw document bytes, exactly as fetched.
    pub content: Vec<u8>,
    pub format: DocumentFormat,
    pub kind: DocumentKind,
    pub title: Option<String>,
    pub api_version: Option<String>,
    pub resolved_at: DateTime<Utc>,
}

/// Resolves entries of one registry snapshot.
///
/// Holds no mutable state: clones can resolve different entries
/// concurrently, and a failure of one entry never affects another.
#[derive(Debug, Clone)]
pub struct Resolver {
    registry: Registry,
    fetcher: Fetcher,
    options: ResolverOptions,
}

impl Resolver {
    /// # Errors
    ///
    /// Returns `ConfigError::HttpClient` if the HTTP client cannot be built.
    pub fn new(registry: Registry, options: ResolverOptions) -> Result<Self, ConfigError> {
        let fetcher = Fetcher::new(&options.fetch)?;
        Ok(Self {
            registry,
            fetcher,
            options,
        })
    }

    #[must_use]
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Entries in load order.
    #[must_use]
    pub fn list(&self) -> &[SourceEntry] {
        self.registry.list()
    }

    /// Fetch and check the document of the entry called `name`.
    ///
    /// # Errors
    ///
    /// Returns `ResolveError::NotFound` for an unknown name,
    /// `ResolveError::Unreachable` when the document cannot be fetched, and
    /// `ResolveError::Parse` when it is not a valid structured document.
    pub async fn resolve(&self, name: &str) -> Result<ResolvedDocument, ResolveError> {
        let entry = self
            .registry
            .get(name)
            .ok_or_else(|| ResolveError::NotFound {
                name: name.to_owned(),
            })?;
        self.resolve_entry(entry).await
    }

    /// Fetch and check the document of `entry`, which need not belong to
    /// the registry.
    ///
    /// # Errors
    ///
    /// Same as [`Resolver::resolve`], minus `NotFound`.
    pub async fn resolve_entry(&self, entry: &SourceEntry) -> Result<ResolvedDocument, ResolveError> {
        let unreachable = |reason: String| ResolveError::Unreachable {
            name: entry.name.clone(),
            locator: entry.locator.clone(),
            reason,
        };

        let target =
            target_for(&entry.locator, &self.options.fetch).map_err(|e| unreachable(e.to_string()))?;

        let fetched = self.fetcher.fetch(&target).await.map_err(|e| {
            tracing::warn!(entry = %entry.name, target = %target, error = %e, "Fetch failed");
            unreachable(e.to_string())
        })?;

        let extension = target.extension();
        let hint = format_hint(extension.as_deref(), fetched.content_type.as_deref());
        let parsed = check_document(&fetched.bytes, hint, self.options.require_api_description)
            .map_err(|reason| {
                tracing::warn!(entry = %entry.name, %reason, "Document failed structural check");
                ResolveError::Parse {
                    name: entry.name.clone(),
                    locator: entry.locator.clone(),
                    reason,
                }
            })?;

        tracing::debug!(
            entry = %entry.name,
            bytes = fetched.bytes.len(),
            format = ?parsed.format,
            "Resolved document"
        );

        Ok(ResolvedDocument {
            entry: entry.clone(),
            content: fetched.bytes,
            format: parsed.format,
            kind: parsed.kind,
            title: parsed.title,
            api_version: parsed.api_version,
            resolved_at: Utc::now(),
        })
    }

    /// Resolve every entry concurrently and report in registry order.
    ///
    /// Never fails as a whole: each entry's outcome lands in the report.
    pub async fn resolve_all(&self) -> CatalogReport {
        let handles: Vec<_> = self
            .registry
            .iter()
            .cloned()
            .map(|entry| {
                let resolver = self.clone();
                tokio::spawn(async move { resolver.resolve_entry(&entry).await })
            })
            .collect();

        let mut outcomes = Vec::with_capacity(handles.len());
        for (entry, handle) in self.registry.iter().zip(handles) {
            let outcome = handle.await.unwrap_or_else(|join_err| {
                Err(ResolveError::Unreachable {
                    name: entry.name.clone(),
                    locator: entry.locator.clone(),
                    reason: format!("Resolution task failed: {join_err}"),
                })
            });
            outcomes.push((entry.locator.clone(), outcome));
        }

        let report = CatalogReport::from_outcomes(&outcomes);
        tracing::info!(
            total = report.total,
            resolved = report.resolved,
            failed = report.failed,
            "Catalog resolved"
        );
        report
    }
}
