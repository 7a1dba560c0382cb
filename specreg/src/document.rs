//! Minimal structural checks for API description documents.
//!
//! A document passes when it is UTF-8, parses as exactly one JSON or YAML
//! value, and that value is a mapping. The `openapi` / `swagger` version
//! key is inspected to classify the document; it is only required when the
//! caller asks for it.

use serde::Serialize;
use serde_json::{Map, Value};

/// Serialization format of a document.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DocumentFormat {
    Json,
    Yaml,
}

/// What kind of API description a document claims to be.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DocumentKind {
    /// OpenAPI 3.x (`openapi: 3.x.y`).
    OpenApi { version: String },
    /// Swagger / OpenAPI 2.0 (`swagger: "2.0"`).
    Swagger { version: String },
    /// A well-formed mapping without a recognized version key.
    Unknown,
}

/// Result of a successful structural check.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedDocument {
    pub format: DocumentFormat,
    pub kind: DocumentKind,
    /// `info.title`, when present.
    pub title: Option<String>,
    /// `info.version`, when present.
    pub api_version: Option<String>,
}

/// Pick a format from a file extension, falling back to a `Content-Type`.
#[must_use]
pub fn format_hint(extension: Option<&str>, content_type: Option<&str>) -> Option<DocumentFormat> {
    match extension {
        Some("json") => return Some(DocumentFormat::Json),
        Some("yaml" | "yml") => return Some(DocumentFormat::Yaml),
        _ => {}
    }
    let content_type = content_type?;
    if content_type.ends_with("json") {
        Some(DocumentFormat::Json)
    } else if content_type.contains("yaml") {
        Some(DocumentFormat::Yaml)
    } else {
        None
    }
}

/// Check that `bytes` hold a single structured document.
///
/// Without a hint, JSON is tried first and YAML second.
///
/// # Errors
///
/// Returns a human-readable reason when the bytes are not UTF-8, do not
/// parse, hold zero or several YAML documents, are not a mapping, or lack a
/// version key while `require_api_description` is set.
pub fn check_document(
    bytes: &[u8],
    hint: Option<DocumentFormat>,
    require_api_description: bool,
) -> Result<ParsedDocument, String> {
    let content = std::str::from_utf8(bytes).map_err(|_| "Document is not valid UTF-8".to_owned())?;

    let (format, value) = match hint {
        Some(DocumentFormat::Json) => (DocumentFormat::Json, parse_json(content)?),
        Some(DocumentFormat::Yaml) => (DocumentFormat::Yaml, parse_yaml(content)?),
        None => match parse_json(content) {
            Ok(value) => (DocumentFormat::Json, value),
            Err(json_err) => {
                let trimmed = content.trim_start();
                if trimmed.starts_with('{') || trimmed.starts_with('[') {
                    return Err(json_err);
                }
                (DocumentFormat::Yaml, parse_yaml(content)?)
            }
        },
    };

    let Value::Object(map) = value else {
        return Err(format!(
            "Top-level value must be a mapping, found {}",
            value_type_name(&value)
        ));
    };

    let kind = classify(&map);
    if require_api_description && kind == DocumentKind::Unknown {
        return Err("Missing 'openapi' or 'swagger' version key".to_owned());
    }

    let info = map.get("info").and_then(Value::as_object);
    Ok(ParsedDocument {
        format,
        kind,
        title: info.and_then(|i| scalar_string(i.get("title"))),
        api_version: info.and_then(|i| scalar_string(i.get("version"))),
    })
}

fn parse_json(content: &str) -> Result<Value, String> {
    serde_json::from_str(content).map_err(|e| format!("JSON parse error: {e}"))
}

fn parse_yaml(content: &str) -> Result<Value, String> {
    let mut documents: Vec<Value> =
        serde_saphyr::from_multiple(content).map_err(|e| format!("YAML parse error: {e}"))?;
    match documents.len() {
        0 => Err("Document is empty".to_owned()),
        1 => Ok(documents.remove(0)),
        n => Err(format!(
            "Expected a single YAML document, found a stream of {n}"
        )),
    }
}

fn classify(map: &Map<String, Value>) -> DocumentKind {
    if let Some(version) = scalar_string(map.get("openapi")) {
        DocumentKind::OpenApi { version }
    } else if let Some(version) = scalar_string(map.get("swagger")) {
        DocumentKind::Swagger { version }
    } else {
        DocumentKind::Unknown
    }
}

/// Strings as-is; numbers in their display form (YAML `swagger: 2.0`).
fn scalar_string(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn value_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "mapping",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_yaml() {
        let doc = check_document(
            b"openapi: 3.0.3\ninfo:\n  title: Auth Service\n  version: 1.2.0\npaths: {}\n",
            Some(DocumentFormat::Yaml),
            true,
        )
        .unwrap();
        assert_eq!(doc.format, DocumentFormat::Yaml);
        assert_eq!(
            doc.kind,
            DocumentKind::OpenApi {
                version: "3.0.3".to_owned()
            }
        );
        assert_eq!(doc.title.as_deref(), Some("Auth Service"));
        assert_eq!(doc.api_version.as_deref(), Some("1.2.0"));
    }

    #[test]
    fn test_swagger_json_without_hint() {
        let doc = check_document(br#"{"swagger": "2.0", "paths": {}}"#, None, true).unwrap();
        assert_eq!(doc.format, DocumentFormat::Json);
        assert_eq!(
            doc.kind,
            DocumentKind::Swagger {
                version: "2.0".to_owned()
            }
        );
        assert!(doc.title.is_none());
    }

    #[test]
    fn test_yaml_fallback_without_hint() {
        let doc = check_document(b"paths: {}\n", None, false).unwrap();
        assert_eq!(doc.format, DocumentFormat::Yaml);
        assert_eq!(doc.kind, DocumentKind::Unknown);
    }

    #[test]
    fn test_malformed_json_reports_json_error() {
        let err = check_document(b"{\"openapi\": ", None, false).unwrap_err();
        assert!(err.starts_with("JSON parse error"), "got: {err}");
    }

    #[test]
    fn test_malformed_yaml() {
        let err = check_document(b": : :\n  - [unclosed\n", Some(DocumentFormat::Yaml), false)
            .unwrap_err();
        assert!(err.starts_with("YAML parse error"), "got: {err}");
    }

    #[test]
    fn test_multi_document_yaml_rejected() {
        let err = check_document(
            b"openapi: 3.0.0\n---\nopenapi: 3.1.0\n",
            Some(DocumentFormat::Yaml),
            false,
        )
        .unwrap_err();
        assert!(err.contains("stream of 2"), "got: {err}");
    }

    #[test]
    fn test_scalar_top_level_rejected() {
        let err = check_document(b"\"just a string\"", Some(DocumentFormat::Json), false)
            .unwrap_err();
        assert!(err.contains("found string"), "got: {err}");
    }

    #[test]
    fn test_missing_version_key_only_fails_when_required() {
        let body = br#"{"info": {"title": "COA"}}"#;
        assert!(check_document(body, None, false).is_ok());
        let err = check_document(body, None, true).unwrap_err();
        assert!(err.contains("'openapi' or 'swagger'"));
    }

    #[test]
    fn test_invalid_utf8() {
        let err = check_document(&[0xff, 0xfe, 0x00], None, false).unwrap_err();
        assert!(err.contains("UTF-8"));
    }

    #[test]
    fn test_format_hint() {
        assert_eq!(format_hint(Some("json"), None), Some(DocumentFormat::Json));
        assert_eq!(
            format_hint(Some("yml"), Some("application/json")),
            Some(DocumentFormat::Yaml)
        );
        assert_eq!(
            format_hint(None, Some("application/vnd.oai.openapi+json")),
            Some(DocumentFormat::Json)
        );
        assert_eq!(
            format_hint(Some("txt"), Some("application/x-yaml")),
            Some(DocumentFormat::Yaml)
        );
        assert_eq!(format_hint(None, Some("text/plain")), None);
    }
}
