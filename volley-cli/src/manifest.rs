use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;
use volley_core::ItemId;
use volley_exec::executor::HttpRequestParts;

/// One request of a run manifest.
#[derive(Debug, Clone, Deserialize)]
pub struct ManifestEntry {
    pub id: ItemId,
    pub url: String,
    #[serde(default = "default_method")]
    pub method: String,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    /// Strings are sent as-is; any other value is sent as JSON.
    #[serde(default)]
    pub body: Option<serde_json::Value>,
}

fn default_method() -> String {
    "GET".to_string()
}

/// A bare list of entries, or the same list under `requests`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ManifestDoc {
    List(Vec<ManifestEntry>),
    Wrapped { requests: Vec<ManifestEntry> },
}

impl From<ManifestDoc> for Vec<ManifestEntry> {
    fn from(doc: ManifestDoc) -> Self {
        match doc {
            ManifestDoc::List(entries) | ManifestDoc::Wrapped { requests: entries } => entries,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("{0}")]
    Read(String),
    #[error("{0}")]
    Invalid(String),
}

pub fn load_manifest(path: &Path) -> Result<Vec<(ItemId, HttpRequestParts)>, ManifestError> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| ManifestError::Read(format!("failed to read {}: {e}", path.display())))?;
    parse_manifest(&content)
}

pub fn parse_manifest(content: &str) -> Result<Vec<(ItemId, HttpRequestParts)>, ManifestError> {
    let doc: ManifestDoc = match serde_json::from_str(content) {
        Ok(doc) => doc,
        Err(_) => serde_yaml::from_str(content).map_err(|e| {
            ManifestError::Invalid(format!("manifest is neither valid JSON nor YAML: {e}"))
        })?,
    };
    Vec::from(doc).into_iter().map(into_request).collect()
}

fn into_request(entry: ManifestEntry) -> Result<(ItemId, HttpRequestParts), ManifestError> {
    let url = url::Url::parse(&entry.url)
        .map_err(|e| ManifestError::Invalid(format!("item {}: invalid url {:?}: {e}", entry.id, entry.url)))?;

    let mut headers = entry.headers;
    let body = match entry.body {
        None | Some(serde_json::Value::Null) => Vec::new(),
        Some(serde_json::Value::String(s)) => s.into_bytes(),
        Some(value) => {
            if !headers.keys().any(|k| k.eq_ignore_ascii_case("content-type")) {
                headers.insert("content-type".to_string(), "application/json".to_string());
            }
            serde_json::to_vec(&value)
                .map_err(|e| ManifestError::Invalid(format!("item {}: {e}", entry.id)))?
        }
    };

    let req = HttpRequestParts {
        method: entry.method.to_ascii_uppercase(),
        url,
        headers,
        body,
    };
    Ok((entry.id, req))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bare_json_list() {
        let reqs = parse_manifest(r#"[{"id": 1, "url": "https://example.com/a"}]"#).unwrap();
        assert_eq!(reqs.len(), 1);
        assert_eq!(reqs[0].0, ItemId::Int(1));
        assert_eq!(reqs[0].1.method, "GET");
    }

    #[test]
    fn parses_wrapped_yaml() {
        let yaml = r#"
requests:
  - id: create
    url: https://example.com/items
    method: post
    body:
      name: widget
"#;
        let reqs = parse_manifest(yaml).unwrap();
        let (id, req) = &reqs[0];
        assert_eq!(id, &ItemId::Str("create".into()));
        assert_eq!(req.method, "POST");
        assert_eq!(req.headers.get("content-type").map(String::as_str), Some("application/json"));
        assert_eq!(req.body, br#"{"name":"widget"}"#.to_vec());
    }

    #[test]
    fn string_body_is_sent_verbatim() {
        let reqs =
            parse_manifest(r#"[{"id": "t", "url": "http://h/", "body": "plain"}]"#).unwrap();
        assert_eq!(reqs[0].1.body, b"plain".to_vec());
        assert!(reqs[0].1.headers.is_empty());
    }

    #[test]
    fn errors_display_their_message() {
        let err = parse_manifest("[1, 2").unwrap_err();
        assert!(err.to_string().starts_with("manifest is neither valid JSON nor YAML"));
        let err = load_manifest(Path::new("/nonexistent/volley.json")).unwrap_err();
        assert!(matches!(err, ManifestError::Read(_)));
        assert!(err.to_string().starts_with("failed to read /nonexistent/volley.json"));
    }

    #[test]
    fn rejects_bad_url() {
        let err = parse_manifest(r#"[{"id": 1, "url": "not a url"}]"#).unwrap_err();
        assert!(matches!(err, ManifestError::Invalid(msg) if msg.contains("item 1")));
    }
}
