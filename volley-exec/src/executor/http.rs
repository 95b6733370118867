use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::Serialize;
use volley_core::{ItemId, OperationError};

use crate::item::WorkItem;

pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_MAX_RESPONSE_BYTES: usize = 4 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequestParts {
    pub method: String,
    pub url: url::Url,
    pub headers: BTreeMap<String, String>,
    pub body: Vec<u8>,
}

impl HttpRequestParts {
    pub fn get(url: url::Url) -> Self {
        Self {
            method: "GET".to_string(),
            url,
            headers: BTreeMap::new(),
            body: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HttpResponseParts {
    pub status: u16,
    pub headers: BTreeMap<String, String>,
    #[serde(skip)]
    pub body: Vec<u8>,
}

impl HttpResponseParts {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Per-request bounds applied by an [`HttpClient`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestLimits {
    pub timeout: Duration,
    pub max_response_bytes: usize,
}

impl Default for RequestLimits {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_HTTP_TIMEOUT,
            max_response_bytes: DEFAULT_MAX_RESPONSE_BYTES,
        }
    }
}

impl RequestLimits {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum HttpError {
    #[error("request timed out after {}ms", after.as_millis())]
    TimedOut { after: Duration },
    #[error("connection failed: {0}")]
    Connect(String),
    #[error("response body exceeds {limit} bytes")]
    BodyTooLarge { limit: usize },
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("transport error: {0}")]
    Transport(String),
}

impl HttpError {
    /// Whether the request never produced an HTTP response.
    pub fn is_network(&self) -> bool {
        matches!(self, HttpError::TimedOut { .. } | HttpError::Connect(_))
    }
}

impl From<HttpError> for OperationError {
    fn from(err: HttpError) -> Self {
        if err.is_network() {
            OperationError::network(err.to_string())
        } else {
            OperationError::other(err.to_string())
        }
    }
}

#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn send(
        &self,
        req: &HttpRequestParts,
        limits: RequestLimits,
    ) -> Result<HttpResponseParts, HttpError>;
}

pub struct ReqwestHttpClient {
    client: reqwest::Client,
}

impl ReqwestHttpClient {
    pub fn new() -> Result<Self, HttpError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("volley/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| HttpError::Transport(e.to_string()))?;
        Ok(Self { client })
    }
}

fn header_map(headers: &BTreeMap<String, String>) -> Result<HeaderMap, HttpError> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| HttpError::InvalidRequest(format!("header {name:?}: {e}")))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| HttpError::InvalidRequest(format!("header {name}: {e}")))?;
        map.insert(name, value);
    }
    Ok(map)
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn send(
        &self,
        req: &HttpRequestParts,
        limits: RequestLimits,
    ) -> Result<HttpResponseParts, HttpError> {
        let method = reqwest::Method::from_bytes(req.method.as_bytes())
            .map_err(|e| HttpError::InvalidRequest(format!("method {:?}: {e}", req.method)))?;
        let mut resp = self
            .client
            .request(method, req.url.clone())
            .headers(header_map(&req.headers)?)
            .body(req.body.clone())
            .timeout(limits.timeout)
            .send()
            .await
            .map_err(|e| classify_reqwest_error(e, limits.timeout))?;

        let status = resp.status().as_u16();
        let headers = resp
            .headers()
            .iter()
            .filter_map(|(k, v)| Some((k.to_string(), v.to_str().ok()?.to_string())))
            .collect();

        // Stop reading as soon as the cap is crossed.
        let mut body = Vec::new();
        while let Some(chunk) = resp
            .chunk()
            .await
            .map_err(|e| classify_reqwest_error(e, limits.timeout))?
        {
            if body.len() + chunk.len() > limits.max_response_bytes {
                return Err(HttpError::BodyTooLarge {
                    limit: limits.max_response_bytes,
                });
            }
            body.extend_from_slice(&chunk);
        }

        Ok(HttpResponseParts {
            status,
            headers,
            body,
        })
    }
}

fn classify_reqwest_error(e: reqwest::Error, timeout: Duration) -> HttpError {
    if e.is_timeout() {
        HttpError::TimedOut { after: timeout }
    } else if e.is_connect() || e.is_request() {
        HttpError::Connect(e.to_string())
    } else if e.is_builder() {
        HttpError::InvalidRequest(e.to_string())
    } else {
        HttpError::Transport(e.to_string())
    }
}

/// A work item that sends `req` once per attempt.
///
/// Non-2xx responses fail with their status code so the retry policy can
/// classify them; requests that get no response fail as network errors.
pub fn http_work_item(
    id: impl Into<ItemId>,
    client: Arc<dyn HttpClient>,
    req: HttpRequestParts,
    limits: RequestLimits,
) -> WorkItem<HttpResponseParts> {
    let req = Arc::new(req);
    WorkItem::new(id, move || {
        let client = Arc::clone(&client);
        let req = Arc::clone(&req);
        async move {
            let resp = client.send(&req, limits).await?;
            if resp.is_success() {
                Ok(resp)
            } else {
                Err(OperationError::status(resp.status, status_reason(resp.status)))
            }
        }
    })
}

fn status_reason(status: u16) -> String {
    let reason = reqwest::StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason());
    match reason {
        Some(reason) => format!("HTTP {status} {reason}"),
        None => format!("HTTP {status}"),
    }
}
