//! Catalog report types.

use serde::Serialize;

use crate::document::{DocumentFormat, DocumentKind};
use crate::error::{FailureKind, ResolveError};
use crate::resolver::ResolvedDocument;

/// One successfully resolved entry, without its content.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[non_exhaustive]
pub struct DocumentSummary {
    pub name: String,
    pub locator: String,
    pub format: DocumentFormat,
    pub kind: DocumentKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,
    /// Size of the fetched document in bytes.
    pub size: usize,
}

impl From<&ResolvedDocument> for DocumentSummary {
    fn from(doc: &ResolvedDocument) -> Self {
        Self {
            name: doc.entry.name.clone(),
            locator: doc.entry.locator.clone(),
            format: doc.format,
            kind: doc.kind.clone(),
            title: doc.title.clone(),
            api_version: doc.api_version.clone(),
            size: doc.content.len(),
        }
    }
}

/// One entry that could not be resolved.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[non_exhaustive]
pub struct ResolveFailure {
    pub name: String,
    pub locator: String,
    pub kind: FailureKind,
    pub message: String,
}

impl ResolveFailure {
    #[must_use]
    pub fn new(locator: &str, error: &ResolveError) -> Self {
        Self {
            name: error.name().to_owned(),
            locator: locator.to_owned(),
            kind: error.kind(),
            message: error.to_string(),
        }
    }

    /// Format the failure for human-readable output.
    #[must_use]
    pub fn format_human_readable(&self) -> String {
        let kind = match self.kind {
            FailureKind::NotFound => "not found",
            FailureKind::Unreachable => "unreachable",
            FailureKind::Parse => "parse error",
        };
        format!("{} ({}): [{kind}] {}", self.name, self.locator, self.message)
    }
}

/// Result of resolving every entry of a registry.
///
/// Both lists follow registry order. A failure never hides the entries
/// around it.
#[derive(Debug, Clone, Serialize)]
#[non_exhaustive]
pub struct CatalogReport {
    /// Number of entries in the registry.
    pub total: usize,
    pub resolved: usize,
    pub failed: usize,
    /// Whether every entry resolved.
    pub ok: bool,
    pub documents: Vec<DocumentSummary>,
    pub failures: Vec<ResolveFailure>,
}

impl CatalogReport {
    /// Build a report from per-entry outcomes in registry order.
    #[must_use]
    pub fn from_outcomes(outcomes: &[(String, Result<ResolvedDocument, ResolveError>)]) -> Self {
        let mut documents = Vec::new();
        let mut failures = Vec::new();
        for (locator, outcome) in outcomes {
            match outcome {
                Ok(doc) => documents.push(DocumentSummary::from(doc)),
                Err(err) => failures.push(ResolveFailure::new(locator, err)),
            }
        }
        Self {
            total: outcomes.len(),
            resolved: documents.len(),
            failed: failures.len(),
            ok: failures.is_empty(),
            documents,
            failures,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_human_readable() {
        let failure = ResolveFailure::new(
            "/specs/ap-service.yaml",
            &ResolveError::Parse {
                name: "AP Service".to_owned(),
                locator: "/specs/ap-service.yaml".to_owned(),
                reason: "YAML parse error".to_owned(),
            },
        );
        let line = failure.format_human_readable();
        assert!(line.starts_with("AP Service (/specs/ap-service.yaml): [parse error]"));
    }

    #[test]
    fn test_empty_report_is_ok() {
        let report = CatalogReport::from_outcomes(&[]);
        assert!(report.ok);
        assert_eq!(report.total, 0);
    }
}
