//! The exchange REST client.
//!
//! `call` is the sole network primitive: it resolves an instruction to its
//! method and path, attaches freshly signed auth headers on private calls,
//! classifies the response, and retries failures with jittered backoff in
//! a bounded loop. Typed helpers are thin instruction/parameter selections
//! on top of it.

use crate::error::{ExchangeError, ExchangeResult};
use crate::instruction::Instruction;
use crate::signer::RequestSigner;
use crate::types::{OpenOrder, OrderRequest, Ticker};
use chrono::Utc;
use rand::Rng;
use reqwest::Method;
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, warn};

const DEFAULT_BASE_URL: &str = "https://api.backpack.exchange";
const DEFAULT_WINDOW_MS: u64 = 5_000;
const DEFAULT_MAX_RETRIES: u32 = 3;
const DEFAULT_BACKOFF_BASE_MS: u64 = 5_000;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const USER_AGENT: &str = "Backpack Client";

/// Error-code marker: envelope entries carrying a machine-readable code
/// start with this prefix, which is stripped before reporting.
const ERROR_CODE_MARKER: &str = "E";

/// REST client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// REST base URL.
    pub base_url: String,
    /// Signature validity window in milliseconds.
    pub window_ms: u64,
    /// Retries after the initial attempt.
    pub max_retries: u32,
    /// Base backoff delay; actual delay is jittered to 1x-2x this.
    pub backoff_base_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            window_ms: DEFAULT_WINDOW_MS,
            max_retries: DEFAULT_MAX_RETRIES,
            backoff_base_ms: DEFAULT_BACKOFF_BASE_MS,
        }
    }
}

/// Classified response of a REST call.
#[derive(Debug, Clone)]
pub enum ApiResponse {
    /// JSON payload that passed the error-envelope check.
    Json(Value),
    /// Verbatim `text/plain` payload.
    Text(String),
    /// Any other content type: the full envelope for the caller to
    /// interpret.
    Raw {
        status: u16,
        headers: Vec<(String, String)>,
        body: String,
    },
    /// `orderQuery` answered 404: the order does not exist. An answer,
    /// not an error.
    NotFound,
}

impl ApiResponse {
    /// Unwrap the JSON payload or fail with `InvalidResponse`.
    pub fn into_json(self) -> ExchangeResult<Value> {
        match self {
            Self::Json(value) => Ok(value),
            other => Err(ExchangeError::InvalidResponse(format!(
                "expected JSON payload, got {other:?}"
            ))),
        }
    }
}

/// Signed REST client for the exchange.
///
/// Stateless between calls; safe to share behind an `Arc`.
pub struct ExchangeClient {
    http: reqwest::Client,
    signer: RequestSigner,
    config: ClientConfig,
}

impl ExchangeClient {
    pub fn new(signer: RequestSigner, config: ClientConfig) -> ExchangeResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            http,
            signer,
            config,
        })
    }

    /// Issue an instruction with the configured retry budget.
    pub async fn call(
        &self,
        instruction: Instruction,
        params: &BTreeMap<String, String>,
    ) -> ExchangeResult<ApiResponse> {
        self.call_with_retries(instruction, params, self.config.max_retries)
            .await
    }

    /// Issue an instruction; `max_retries` counts retries after the
    /// initial attempt. Each attempt recomputes timestamp and signature.
    pub async fn call_with_retries(
        &self,
        instruction: Instruction,
        params: &BTreeMap<String, String>,
        max_retries: u32,
    ) -> ExchangeResult<ApiResponse> {
        let mut attempt: u32 = 0;
        loop {
            match self.dispatch(instruction, params).await {
                Ok(response) => return Ok(response),
                Err(err) if instruction == Instruction::OrderQuery && err.is_not_found() => {
                    debug!(params = ?params, "Order not found");
                    return Ok(ApiResponse::NotFound);
                }
                Err(err) => {
                    if attempt >= max_retries {
                        return Err(ExchangeError::RequestFailed {
                            instruction: instruction.name(),
                            attempts: attempt + 1,
                            source: Box::new(err),
                        });
                    }
                    attempt += 1;
                    let delay = self.backoff_delay();
                    warn!(
                        instruction = %instruction,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "Request failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }

    /// Last traded price for a symbol.
    pub async fn ticker(&self, symbol: &str) -> ExchangeResult<Ticker> {
        let params = symbol_params(symbol);
        let value = self.call(Instruction::Ticker, &params).await?.into_json()?;
        Ok(serde_json::from_value(value)?)
    }

    /// Look up a resting order by client id. `None` means the exchange
    /// does not know the order.
    pub async fn order_query(
        &self,
        symbol: &str,
        client_id: i64,
    ) -> ExchangeResult<Option<OpenOrder>> {
        let mut params = symbol_params(symbol);
        params.insert("clientId".to_string(), client_id.to_string());

        match self.call(Instruction::OrderQuery, &params).await? {
            ApiResponse::NotFound => Ok(None),
            response => Ok(Some(serde_json::from_value(response.into_json()?)?)),
        }
    }

    /// Place a limit order.
    pub async fn order_execute(&self, order: &OrderRequest) -> ExchangeResult<Value> {
        let params = order.to_params();
        self.call(Instruction::OrderExecute, &params)
            .await?
            .into_json()
    }

    /// Cancel every resting order on a symbol. Idempotent: succeeds even
    /// when there is nothing to cancel.
    pub async fn order_cancel_all(&self, symbol: &str) -> ExchangeResult<()> {
        let params = symbol_params(symbol);
        self.call(Instruction::OrderCancelAll, &params).await?;
        Ok(())
    }

    /// All resting orders on a symbol.
    pub async fn order_query_all(&self, symbol: &str) -> ExchangeResult<Vec<OpenOrder>> {
        let params = symbol_params(symbol);
        let value = self
            .call(Instruction::OrderQueryAll, &params)
            .await?
            .into_json()?;
        Ok(serde_json::from_value(value)?)
    }

    async fn dispatch(
        &self,
        instruction: Instruction,
        params: &BTreeMap<String, String>,
    ) -> ExchangeResult<ApiResponse> {
        let url = format!("{}{}", self.config.base_url, instruction.path());
        let method = instruction.method();

        let mut request = self.http.request(method.clone(), &url);
        request = if method == Method::GET {
            request.query(params)
        } else {
            request.json(params)
        };

        if instruction.is_private() {
            // The timestamp moves every attempt, so the signature is
            // recomputed per try rather than cached.
            let timestamp = Utc::now().timestamp_millis();
            let signature =
                self.signer
                    .sign(instruction.name(), params, timestamp, self.config.window_ms);
            request = request
                .header("X-Timestamp", timestamp.to_string())
                .header("X-Window", self.config.window_ms.to_string())
                .header("X-API-Key", self.signer.api_key())
                .header("X-Signature", signature);
        }

        let response = request.send().await?;
        let status = response.status().as_u16();
        let headers: Vec<(String, String)> = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();
        let body = response.text().await?;

        let request_body = serde_json::to_string(params).unwrap_or_default();
        classify_response(status, headers, body, &url, &request_body)
    }

    /// Jittered 1x-2x base delay so concurrent callers do not retry in
    /// lockstep.
    fn backoff_delay(&self) -> Duration {
        let factor = rand::thread_rng().gen::<f64>() + 1.0;
        Duration::from_millis((self.config.backoff_base_ms as f64 * factor) as u64)
    }
}

fn symbol_params(symbol: &str) -> BTreeMap<String, String> {
    let mut params = BTreeMap::new();
    params.insert("symbol".to_string(), symbol.to_string());
    params
}

/// Classify a raw HTTP response into a typed result.
///
/// JSON payloads are checked for the exchange error envelope first: an
/// `error` array whose entries carry the code marker fails the call with
/// the joined messages; an envelope with no marked entry is an unknown
/// error. `text/plain` passes through verbatim; any other content type is
/// handed back whole.
fn classify_response(
    status: u16,
    headers: Vec<(String, String)>,
    body: String,
    url: &str,
    request_body: &str,
) -> ExchangeResult<ApiResponse> {
    let content_type = headers
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case("content-type"))
        .map(|(_, value)| value.as_str())
        .unwrap_or_default();
    let success = (200..300).contains(&status);

    if content_type.contains("application/json") {
        let parsed: Value = serde_json::from_str(&body)?;
        if let Some(errors) = parsed.get("error").and_then(|e| e.as_array()) {
            if !errors.is_empty() {
                let messages: Vec<String> = errors
                    .iter()
                    .filter_map(|entry| entry.as_str())
                    .filter(|entry| entry.starts_with(ERROR_CODE_MARKER))
                    .map(|entry| entry[ERROR_CODE_MARKER.len()..].to_string())
                    .collect();
                if messages.is_empty() {
                    return Err(ExchangeError::Unknown {
                        url: url.to_string(),
                    });
                }
                return Err(ExchangeError::Rejected {
                    status,
                    messages: messages.join(", "),
                    url: url.to_string(),
                    body: request_body.to_string(),
                });
            }
        }
        if !success {
            return Err(ExchangeError::Http { status, body });
        }
        Ok(ApiResponse::Json(parsed))
    } else if content_type.contains("text/plain") {
        if !success {
            return Err(ExchangeError::Http { status, body });
        }
        Ok(ApiResponse::Text(body))
    } else {
        if !success {
            return Err(ExchangeError::Http { status, body });
        }
        Ok(ApiResponse::Raw {
            status,
            headers,
            body,
        })
    }
}
