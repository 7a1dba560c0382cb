//! Building a source list from a directory of description documents.
//!
//! Walks a tree the way a static documentation deployment lays it out
//! (`specs/auth-service.yaml`, `specs/gl-service.yaml`, ...) and produces one
//! `SourceEntry` per document, with a label derived from the file name and
//! a locator under a URL prefix.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use glob::Pattern;
use regex::Regex;
use walkdir::WalkDir;

use crate::config::SourceEntry;
use crate::error::DiscoverError;

/// Directories to skip
pub const SKIP_DIRS: &[&str] = &["target", "node_modules", ".git", "vendor"];

static LABEL_SEPARATOR_RE: LazyLock<Regex> = LazyLock::new(|| match Regex::new(r"[-_.\s]+") {
    Ok(regex) => regex,
    Err(err) => panic!("Invalid label separator regex: {err}"),
});

/// Options for [`discover`].
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct DiscoverConfig {
    /// Directory to scan.
    pub root: PathBuf,
    /// Prefix for generated locators (default: `/specs`).
    pub url_prefix: String,
    /// Exclude patterns (glob format), matched against the relative path
    /// and the file name.
    pub exclude: Vec<String>,
    /// Maximum directory traversal depth (default: 16).
    pub max_depth: usize,
    /// Whether to follow symbolic links (default: `false`).
    pub follow_links: bool,
}

impl DiscoverConfig {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            url_prefix: "/specs".to_owned(),
            exclude: Vec::new(),
            max_depth: 16,
            follow_links: false,
        }
    }
}

/// Check if a path matches any of the exclude patterns
fn matches_exclude(relative: &Path, exclude_patterns: &[Pattern]) -> bool {
    let path_str = relative.to_string_lossy();
    exclude_patterns.iter().any(|pattern| {
        pattern.matches(&path_str)
            || relative
                .file_name()
                .is_some_and(|name| pattern.matches(&name.to_string_lossy()))
    })
}

/// Returns `true` if the entry should be **included** (i.e., is NOT a skip dir).
fn is_not_skip_dir(entry: &walkdir::DirEntry) -> bool {
    if entry.depth() > 0
        && entry.file_type().is_dir()
        && let Some(name) = entry.file_name().to_str()
    {
        return !SKIP_DIRS.contains(&name);
    }
    true
}

fn is_description_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| matches!(e.to_ascii_lowercase().as_str(), "json" | "yaml" | "yml"))
}

/// Derive a display label from a file stem.
///
/// Tokens are split on `-`, `_`, `.` and whitespace. Tokens of three
/// characters or fewer are treated as acronyms and upper-cased; longer
/// ones are capitalized. `gl-service` becomes `GL Service`.
#[must_use]
pub fn label_for_stem(stem: &str) -> String {
    LABEL_SEPARATOR_RE
        .split(stem)
        .filter(|t| !t.is_empty())
        .map(|token| {
            if token.chars().count() <= 3 {
                token.to_uppercase()
            } else {
                let mut chars = token.chars();
                chars.next().map_or_else(String::new, |first| {
                    first.to_uppercase().chain(chars).collect()
                })
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Scan `config.root` for JSON/YAML documents and build a source list.
///
/// Entries are sorted by relative path, so the same tree always yields the
/// same list. Labels that collide are left as-is; `Registry::load` reports
/// them.
///
/// # Errors
///
/// Returns `DiscoverError::MissingRoot` if the root does not exist,
/// `DiscoverError::InvalidExcludePattern` for a bad glob, and
/// `DiscoverError::Walk` if the tree cannot be traversed.
pub fn discover(config: &DiscoverConfig) -> Result<Vec<SourceEntry>, DiscoverError> {
    if !config.root.is_dir() {
        return Err(DiscoverError::MissingRoot(config.root.clone()));
    }

    let exclude_patterns = config
        .exclude
        .iter()
        .map(|pat| {
            Pattern::new(pat).map_err(|e| DiscoverError::InvalidExcludePattern {
                pattern: pat.clone(),
                reason: e.to_string(),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut relative_paths = Vec::new();
    for entry in WalkDir::new(&config.root)
        .follow_links(config.follow_links)
        .max_depth(config.max_depth)
        .into_iter()
        .filter_entry(is_not_skip_dir)
    {
        let entry = entry?;
        if !entry.file_type().is_file() || !is_description_file(entry.path()) {
            continue;
        }
        let Ok(relative) = entry.path().strip_prefix(&config.root) else {
            continue;
        };
        if matches_exclude(relative, &exclude_patterns) {
            continue;
        }
        relative_paths.push(relative.to_path_buf());
    }
    relative_paths.sort();

    let prefix = config.url_prefix.trim_end_matches('/');
    let sources: Vec<SourceEntry> = relative_paths
        .iter()
        .map(|relative| {
            let stem = relative
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            let segments: Vec<_> = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect();
            SourceEntry::new(
                label_for_stem(&stem),
                format!("{prefix}/{}", segments.join("/")),
            )
        })
        .collect();

    tracing::debug!(
        root = %config.root.display(),
        found = sources.len(),
        "Discovered description documents"
    );
    Ok(sources)
}
