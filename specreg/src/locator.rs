//! Turning a locator string into something that can be fetched.

use std::path::{Component, Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use reqwest::Url;
use thiserror::Error;

use crate::config::FetchConfig;

/// Leading `scheme://` of an absolute URL.
static SCHEME_RE: LazyLock<Regex> = LazyLock::new(|| {
    match Regex::new(r"^([A-Za-z][A-Za-z0-9+.\-]*)://") {
        Ok(regex) => regex,
        Err(err) => panic!("Invalid scheme regex: {err}"),
    }
});

/// Where a document lives once its locator has been interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// Fetched with an HTTP GET.
    Http(Url),
    /// Read from the local filesystem.
    File(PathBuf),
}

impl Target {
    /// Lower-cased file extension of the document, if any.
    #[must_use]
    pub fn extension(&self) -> Option<String> {
        let ext = match self {
            Self::Http(url) => Path::new(url.path())
                .extension()
                .and_then(|e| e.to_str())
                .map(str::to_owned),
            Self::File(path) => path
                .extension()
                .and_then(|e| e.to_str())
                .map(str::to_owned),
        };
        ext.map(|e| e.to_ascii_lowercase())
    }
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Http(url) => write!(f, "{url}"),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum LocatorError {
    #[error("Unsupported locator scheme '{0}'")]
    UnsupportedScheme(String),

    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Path escapes the document root: {0}")]
    OutsideRoot(String),
}

/// Interpret `locator` against the fetch configuration.
///
/// - `http://` and `https://` locators are fetched as-is.
/// - `file://` locators name a local file.
/// - Bare paths are joined against `base_url` when set, otherwise read from
///   under `document_root` when set, otherwise read as given.
///
/// # Errors
///
/// Returns a `LocatorError` for unknown schemes, malformed URLs, and bare
/// paths that climb out of `document_root`.
pub fn target_for(locator: &str, fetch: &FetchConfig) -> Result<Target, LocatorError> {
    let locator = locator.trim();

    if let Some(caps) = SCHEME_RE.captures(locator) {
        let scheme = caps[1].to_ascii_lowercase();
        let url = parse_url(locator)?;
        return match scheme.as_str() {
            "http" | "https" => Ok(Target::Http(url)),
            "file" => url
                .to_file_path()
                .map(Target::File)
                .map_err(|()| LocatorError::InvalidUrl {
                    url: locator.to_owned(),
                    reason: "not a local file path".to_owned(),
                }),
            _ => Err(LocatorError::UnsupportedScheme(scheme)),
        };
    }

    if let Some(base) = &fetch.base_url {
        let base_url = parse_url(base)?;
        return base_url
            .join(locator)
            .map(Target::Http)
            .map_err(|e| LocatorError::InvalidUrl {
                url: locator.to_owned(),
                reason: e.to_string(),
            });
    }

    if let Some(root) = &fetch.document_root {
        let relative = Path::new(locator.trim_start_matches('/'));
        if relative
            .components()
            .any(|c| matches!(c, Component::ParentDir | Component::Prefix(_)))
        {
            return Err(LocatorError::OutsideRoot(locator.to_owned()));
        }
        return Ok(Target::File(root.join(relative)));
    }

    Ok(Target::File(PathBuf::from(locator)))
}

fn parse_url(raw: &str) -> Result<Url, LocatorError> {
    Url::parse(raw).map_err(|e| LocatorError::InvalidUrl {
        url: raw.to_owned(),
        reason: e.to_string(),
    })
}
