//! REST client integration tests against a scripted HTTP server.
//!
//! Covers the retry loop, the orderQuery not-found sentinel, and auth
//! header attachment, without touching the real exchange.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use bpgrid_exchange::{
    ApiResponse, ClientConfig, ExchangeClient, ExchangeError, Instruction, RequestSigner,
};
use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::Mutex;

/// One canned HTTP response.
#[derive(Clone)]
struct CannedResponse {
    status: u16,
    content_type: &'static str,
    body: String,
}

impl CannedResponse {
    fn json(status: u16, body: &str) -> Self {
        Self {
            status,
            content_type: "application/json",
            body: body.to_string(),
        }
    }

    fn text(status: u16, body: &str) -> Self {
        Self {
            status,
            content_type: "text/plain",
            body: body.to_string(),
        }
    }

    fn to_http(&self) -> String {
        format!(
            "HTTP/1.1 {} X\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            self.status,
            self.content_type,
            self.body.len(),
            self.body
        )
    }
}

/// Scripted HTTP server: each accepted connection consumes the next
/// canned response (the last one repeats). Records request heads and a
/// hit counter.
struct MockHttpServer {
    addr: SocketAddr,
    hits: Arc<AtomicUsize>,
    requests: Arc<Mutex<Vec<String>>>,
}

impl MockHttpServer {
    async fn start(responses: Vec<CannedResponse>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let hits = Arc::new(AtomicUsize::new(0));
        let requests: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));

        let hits_task = hits.clone();
        let requests_task = requests.clone();
        tokio::spawn(async move {
            let mut remaining = responses;
            loop {
                let Ok((mut stream, _)) = listener.accept().await else {
                    break;
                };
                hits_task.fetch_add(1, Ordering::SeqCst);

                let response = if remaining.len() > 1 {
                    remaining.remove(0)
                } else {
                    remaining[0].clone()
                };

                let mut buf = vec![0u8; 8192];
                let n = stream.read(&mut buf).await.unwrap_or(0);
                requests_task
                    .lock()
                    .await
                    .push(String::from_utf8_lossy(&buf[..n]).into_owned());

                let _ = stream.write_all(response.to_http().as_bytes()).await;
                let _ = stream.shutdown().await;
            }
        });

        Self {
            addr,
            hits,
            requests,
        }
    }

    fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    fn hit_count(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    async fn requests(&self) -> Vec<String> {
        self.requests.lock().await.clone()
    }
}

fn test_client(base_url: String, max_retries: u32) -> ExchangeClient {
    let signer = RequestSigner::new("test-api-key", &BASE64.encode([9u8; 32])).unwrap();
    let config = ClientConfig {
        base_url,
        window_ms: 5_000,
        max_retries,
        backoff_base_ms: 10,
    };
    ExchangeClient::new(signer, config).unwrap()
}

#[tokio::test]
async fn test_order_query_404_yields_not_found_without_retry() {
    let server = MockHttpServer::start(vec![CannedResponse::json(
        404,
        r#"{"error":["ERESOURCE_NOT_FOUND: Order not found"]}"#,
    )])
    .await;

    let client = test_client(server.base_url(), 3);
    let order = client.order_query("SOL_USDC", 3).await.unwrap();

    assert!(order.is_none());
    // Sentinel, not a failure: exactly one request, no retries.
    assert_eq!(server.hit_count(), 1);
}

#[tokio::test]
async fn test_call_retries_until_success() {
    let server = MockHttpServer::start(vec![
        CannedResponse::json(500, r#"{"oops":true}"#),
        CannedResponse::json(500, r#"{"oops":true}"#),
        CannedResponse::json(500, r#"{"oops":true}"#),
        CannedResponse::json(200, r#"{"symbol":"SOL_USDC","lastPrice":"101.5"}"#),
    ])
    .await;

    let client = test_client(server.base_url(), 3);
    let ticker = client.ticker("SOL_USDC").await.unwrap();

    assert_eq!(ticker.last_price.to_string(), "101.5");
    // 1 initial attempt + 3 retries.
    assert_eq!(server.hit_count(), 4);
}

#[tokio::test]
async fn test_call_fails_after_retry_budget() {
    let server =
        MockHttpServer::start(vec![CannedResponse::json(500, r#"{"oops":true}"#)]).await;

    let client = test_client(server.base_url(), 3);
    let err = client.ticker("SOL_USDC").await.unwrap_err();

    match err {
        ExchangeError::RequestFailed {
            instruction,
            attempts,
            source,
        } => {
            assert_eq!(instruction, "ticker");
            assert_eq!(attempts, 4);
            assert!(matches!(*source, ExchangeError::Http { status: 500, .. }));
        }
        other => panic!("expected RequestFailed, got {other}"),
    }
    assert_eq!(server.hit_count(), 4);
}

#[tokio::test]
async fn test_rejection_surfaces_exchange_messages() {
    let server = MockHttpServer::start(vec![CannedResponse::json(
        200,
        r#"{"error":["EINVALID_ORDER: quantity too small"]}"#,
    )])
    .await;

    let client = test_client(server.base_url(), 0);
    let mut params = BTreeMap::new();
    params.insert("symbol".to_string(), "SOL_USDC".to_string());
    let err = client
        .call_with_retries(Instruction::OrderExecute, &params, 0)
        .await
        .unwrap_err();

    match err {
        ExchangeError::RequestFailed { source, .. } => match *source {
            ExchangeError::Rejected { messages, body, .. } => {
                assert_eq!(messages, "INVALID_ORDER: quantity too small");
                assert!(body.contains("SOL_USDC"));
            }
            other => panic!("expected Rejected, got {other}"),
        },
        other => panic!("expected RequestFailed, got {other}"),
    }
}

#[tokio::test]
async fn test_plain_text_response_passes_through() {
    let server = MockHttpServer::start(vec![CannedResponse::text(200, "pong")]).await;

    let client = test_client(server.base_url(), 0);
    let response = client
        .call(Instruction::Ping, &BTreeMap::new())
        .await
        .unwrap();

    assert!(matches!(response, ApiResponse::Text(body) if body == "pong"));
}

#[tokio::test]
async fn test_private_call_attaches_auth_headers() {
    let server = MockHttpServer::start(vec![CannedResponse::json(
        200,
        r#"{"clientId":3,"side":"Bid","price":"95000","quantity":"0.01","status":"New"}"#,
    )])
    .await;

    let client = test_client(server.base_url(), 0);
    let order = client.order_query("SOL_USDC", 3).await.unwrap().unwrap();
    assert_eq!(order.client_id, Some(3));

    // hyper writes header names in lowercase on the wire.
    let requests = server.requests().await;
    let head = requests[0].to_ascii_lowercase();
    assert!(head.contains("x-timestamp:"));
    assert!(head.contains("x-window: 5000"));
    assert!(head.contains("x-api-key: test-api-key"));
    assert!(head.contains("x-signature:"));
    assert!(requests[0].contains("GET /api/v1/order?clientId=3&symbol=SOL_USDC"));
}

#[tokio::test]
async fn test_public_call_skips_auth_headers() {
    let server = MockHttpServer::start(vec![CannedResponse::json(
        200,
        r#"{"symbol":"SOL_USDC","lastPrice":"100"}"#,
    )])
    .await;

    let client = test_client(server.base_url(), 0);
    client.ticker("SOL_USDC").await.unwrap();

    let head = server.requests().await[0].to_ascii_lowercase();
    assert!(!head.contains("x-signature:"));
    assert!(!head.contains("x-api-key:"));
}
