//! Shared output formatting for the display layer and operators.
//!
//! Provides the viewer `urls` list plus JSON and plain-text formatters for
//! `CatalogReport`. Color/terminal formatting is excluded from this module;
//! that concern belongs to the CLI layer.

use std::io::Write;

use serde::Serialize;

use crate::registry::Registry;
use crate::report::CatalogReport;

/// One element of a documentation viewer's `urls` option.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ViewerUrl<'a> {
    pub url: &'a str,
    pub name: &'a str,
}

/// The registry as the `[{url, name}, ...]` list a viewer is initialized with.
#[must_use]
pub fn viewer_urls(registry: &Registry) -> Vec<ViewerUrl<'_>> {
    registry
        .iter()
        .map(|e| ViewerUrl {
            url: &e.locator,
            name: &e.name,
        })
        .collect()
}

/// Write the viewer `urls` list as pretty JSON, in registry order.
///
/// # Errors
///
/// Returns an error if serialization or writing fails.
pub fn write_viewer_urls(registry: &Registry, writer: &mut dyn Write) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(&viewer_urls(registry))?;
    writeln!(writer, "{json}")?;
    Ok(())
}

/// Format a `CatalogReport` as JSON to a writer.
///
/// # Errors
///
/// Returns an error if serialization or writing fails.
pub fn write_json(report: &CatalogReport, writer: &mut dyn Write) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    writeln!(writer, "{json}")?;
    Ok(())
}

/// Format a `CatalogReport` as human-readable plain text to a writer.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_human(report: &CatalogReport, writer: &mut dyn Write) -> anyhow::Result<()> {
    writeln!(writer)?;
    writeln!(writer, "{}", "=".repeat(80))?;
    writeln!(writer, "  API DESCRIPTION CATALOG")?;
    writeln!(writer, "{}", "=".repeat(80))?;
    writeln!(writer)?;
    writeln!(writer, "  Sources:        {}", report.total)?;
    writeln!(writer, "  Resolved:       {}", report.resolved)?;
    writeln!(writer, "  Failed:         {}", report.failed)?;
    writeln!(writer)?;

    if !report.documents.is_empty() {
        writeln!(writer, "{}", "-".repeat(80))?;
        writeln!(writer, "  DOCUMENTS")?;
        writeln!(writer, "{}", "-".repeat(80))?;
        for doc in &report.documents {
            let title = doc.title.as_deref().unwrap_or("-");
            let version = doc.api_version.as_deref().unwrap_or("-");
            writeln!(
                writer,
                "{} ({}): {title} {version} [{} bytes]",
                doc.name, doc.locator, doc.size
            )?;
        }
        writeln!(writer)?;
    }

    if !report.failures.is_empty() {
        writeln!(writer, "{}", "-".repeat(80))?;
        writeln!(writer, "  FAILURES")?;
        writeln!(writer, "{}", "-".repeat(80))?;
        for failure in &report.failures {
            writeln!(writer, "{}", failure.format_human_readable())?;
        }
        writeln!(writer)?;
    }

    writeln!(writer, "{}", "=".repeat(80))?;
    if report.ok {
        writeln!(writer, "All {} sources resolved", report.total)?;
    } else {
        writeln!(
            writer,
            "{} of {} source(s) could not be resolved",
            report.failed, report.total
        )?;
    }
    writeln!(writer, "{}", "=".repeat(80))?;

    Ok(())
}
