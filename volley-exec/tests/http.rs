use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use volley_core::{BatchConfig, ItemId, OperationError};
use volley_exec::executor::{
    http_work_item, HttpClient, HttpError, HttpRequestParts, HttpResponseParts,
    ReqwestHttpClient, RequestLimits,
};
use volley_exec::BatchRunner;

/// Answers by URL path: `/status/<code>`, `/network`, `/timeout`.
struct MockHttpClient;

#[async_trait]
impl HttpClient for MockHttpClient {
    async fn send(
        &self,
        req: &HttpRequestParts,
        limits: RequestLimits,
    ) -> Result<HttpResponseParts, HttpError> {
        let path = req.url.path().to_string();
        if path == "/network" {
            return Err(HttpError::Connect("connection refused".to_string()));
        }
        if path == "/timeout" {
            return Err(HttpError::TimedOut {
                after: limits.timeout,
            });
        }
        let status = path
            .strip_prefix("/status/")
            .and_then(|s| s.parse().ok())
            .unwrap_or(200);
        Ok(HttpResponseParts {
            status,
            headers: BTreeMap::new(),
            body: b"{}".to_vec(),
        })
    }
}

fn get(path: &str) -> HttpRequestParts {
    HttpRequestParts::get(url::Url::parse(&format!("https://api.example.com{path}")).unwrap())
}

#[test]
fn http_errors_map_to_operation_errors() {
    let timeout: OperationError = HttpError::TimedOut {
        after: Duration::from_millis(1500),
    }
    .into();
    assert!(timeout.network);
    assert_eq!(timeout.status, None);
    assert_eq!(timeout.message, "request timed out after 1500ms");

    let net: OperationError = HttpError::Connect("dns".to_string()).into();
    assert!(net.network);

    let big: OperationError = HttpError::BodyTooLarge { limit: 10 }.into();
    assert!(!big.network);
    assert_eq!(big.message, "response body exceeds 10 bytes");

    let bad: OperationError = HttpError::InvalidRequest("method".to_string()).into();
    assert!(!bad.network);
}

#[tokio::test]
async fn work_item_maps_status_codes() {
    let client: Arc<dyn HttpClient> = Arc::new(MockHttpClient);
    let timeout = RequestLimits::default();

    let ok = http_work_item(1i64, client.clone(), get("/status/204"), timeout)
        .invoke()
        .await
        .unwrap();
    assert_eq!(ok.status, 204);

    let forbidden = http_work_item(2i64, client.clone(), get("/status/403"), timeout)
        .invoke()
        .await
        .unwrap_err();
    assert_eq!(forbidden.status, Some(403));
    assert!(!forbidden.network);
    assert_eq!(forbidden.message, "HTTP 403 Forbidden");

    let refused = http_work_item(3i64, client, get("/network"), timeout)
        .invoke()
        .await
        .unwrap_err();
    assert!(refused.network);
}

#[tokio::test]
async fn invalid_header_is_rejected_before_sending() {
    let client = ReqwestHttpClient::new().unwrap();
    let mut req = HttpRequestParts::get(url::Url::parse("http://127.0.0.1:1/").unwrap());
    req.headers.insert("bad header".to_string(), "x".to_string());
    let err = client.send(&req, RequestLimits::default()).await.unwrap_err();
    assert!(matches!(err, HttpError::InvalidRequest(_)), "{err:?}");
    assert!(!err.is_network());
}

#[tokio::test(start_paused = true)]
async fn http_items_run_through_the_engine() {
    let client: Arc<dyn HttpClient> = Arc::new(MockHttpClient);
    let timeout = RequestLimits::default().with_timeout(Duration::from_secs(5));
    let items = vec![
        http_work_item("ok", client.clone(), get("/status/200"), timeout),
        http_work_item("gone", client.clone(), get("/status/404"), timeout),
        http_work_item("slow", client.clone(), get("/timeout"), timeout),
    ];

    let result = BatchRunner::new(BatchConfig::default().with_inter_chunk_delay(Duration::ZERO))
        .run(&items)
        .await
        .unwrap();

    assert_eq!(result.successful.len(), 1);
    assert_eq!(result.successful[0].id, ItemId::from("ok"));
    assert_eq!(result.failed.len(), 2);
    assert_eq!(result.rounds, 0);
    let slow = result.failed.iter().find(|f| f.id == ItemId::from("slow")).unwrap();
    assert!(slow.is_network_error);
}

#[tokio::test]
async fn reqwest_client_reports_refused_connections_as_network_errors() {
    let client = ReqwestHttpClient::new().unwrap();
    let req = HttpRequestParts::get(url::Url::parse("http://127.0.0.1:1/").unwrap());
    let limits = RequestLimits::default().with_timeout(Duration::from_secs(2));
    let err = client.send(&req, limits).await.unwrap_err();
    assert!(err.is_network(), "{err:?}");
    assert!(OperationError::from(err).network);
}
