//! Upstream gateway - the single path for all outbound HTTP calls.
//!
//! Every tool delegates its network I/O here. The gateway issues one request
//! with a fresh client, parses the body as JSON, normalizes HTTP 402
//! "payment required" responses into a flat payment-option shape, and passes
//! every other status through verbatim. Any fault (connect, decode, missing
//! field) is converted into the uniform [`ErrorEnvelope`]; no error ever
//! escapes a tool call.

use reqwest::{Client, Method, StatusCode, header::CONTENT_TYPE};
use serde::Deserialize;
use serde_json::{Value, json};
use thiserror::Error;
use tracing::{debug, warn};

/// Header carrying the optional on-chain transaction hash for verification.
pub const TRANSACTION_HASH_HEADER: &str = "X-Transaction-Hash";

/// Result type for raw gateway calls, before envelope conversion.
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Faults that can occur while talking to an upstream service.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Transport-level failure (connect, send, read).
    #[error("{0}")]
    Http(#[from] reqwest::Error),

    /// The response body was not the JSON shape we expected.
    #[error("{0}")]
    Decode(#[from] serde_json::Error),

    /// A 402 response carried an empty `paymentOptions` array.
    #[error("402 response carried no payment options")]
    MissingPaymentOption,

    /// The upstream returned a JSON value where an object was required.
    #[error("upstream response was not a JSON object")]
    NotAnObject,
}

// ============================================================================
// Error envelope
// ============================================================================

/// The uniform failure shape every tool returns: `{error, details}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorEnvelope {
    pub error: String,
    pub details: String,
}

impl ErrorEnvelope {
    pub fn new(error: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: details.into(),
        }
    }

    /// Generic fault during a network call.
    pub fn internal(details: impl std::fmt::Display) -> Self {
        Self::new("Internal server error", details.to_string())
    }

    /// A required base URL is absent from the environment.
    pub fn not_configured(service: &str, env_var: &str) -> Self {
        Self::new(
            format!("{service} not configured"),
            format!("{env_var} environment variable is not set"),
        )
    }

    /// Serialize to the JSON string handed back to the MCP client.
    pub fn render(&self) -> String {
        json!({ "error": self.error, "details": self.details }).to_string()
    }
}

// ============================================================================
// 402 payment-required envelope
// ============================================================================

/// Body shape of an upstream 402 response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PaymentRequiredBody {
    payment_request: PaymentRequest,
    payment_token: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PaymentRequest {
    payment_options: Vec<PaymentOption>,
}

/// One machine-readable way to pay for the requested resource.
#[derive(Debug, Deserialize)]
struct PaymentOption {
    recipient: String,
    /// Raw amount in the token's smallest unit.
    amount: i64,
    /// Decimal exponent; display amount is `amount / 10^decimals`.
    decimals: i32,
    id: String,
}

// ============================================================================
// Calls
// ============================================================================

/// Issue one 402-aware call and return the JSON string for the tool result.
///
/// Used by the logistics tools (delivery estimate, warranty check). The
/// transaction hash is attached as `X-Transaction-Hash` only when it is a
/// non-empty, non-whitespace string, and is sent verbatim (untrimmed).
pub async fn call_and_normalize(
    url: &str,
    method: Method,
    body: Option<Value>,
    transaction_hash: Option<&str>,
) -> String {
    match try_call(url, method, body, transaction_hash).await {
        Ok(rendered) => rendered,
        Err(e) => {
            warn!("upstream call to {url} failed: {e}");
            ErrorEnvelope::internal(e).render()
        }
    }
}

async fn try_call(
    url: &str,
    method: Method,
    body: Option<Value>,
    transaction_hash: Option<&str>,
) -> GatewayResult<String> {
    let (status, data) = send_request(url, method, body, transaction_hash).await?;
    if status == StatusCode::PAYMENT_REQUIRED {
        normalize_payment_required(url, data)
    } else {
        // Any other status, error or not, passes through untouched.
        Ok(data.to_string())
    }
}

/// Issue one plain call and return the parsed body, whatever the status.
///
/// Used by the tools that never reshape the upstream body (`get_watches`,
/// `make_payment`, `get_receipt`).
pub async fn call_json(url: &str, method: Method, body: Option<Value>) -> GatewayResult<Value> {
    let (_, data) = send_request(url, method, body, None).await?;
    Ok(data)
}

/// Fetch a session record from the sessions service. Never cached.
pub async fn fetch_session(sessions_base: &str, session_id: &str) -> GatewayResult<Value> {
    let url = format!("{sessions_base}/api/sessions/{session_id}");
    call_json(&url, Method::GET, None).await
}

async fn send_request(
    url: &str,
    method: Method,
    body: Option<Value>,
    transaction_hash: Option<&str>,
) -> GatewayResult<(StatusCode, Value)> {
    debug!("{method} {url}");

    // Fresh client per call: every invocation is fully independent.
    // Title-case header serialization so the wire matches TRANSACTION_HASH_HEADER.
    let client = Client::builder().http1_title_case_headers().build()?;
    let mut request = client
        .request(method, url)
        .header(CONTENT_TYPE, "application/json");

    if let Some(hash) = transaction_hash.filter(|h| !h.trim().is_empty()) {
        request = request.header(TRANSACTION_HASH_HEADER, hash);
    }

    if let Some(body) = body {
        request = request.json(&body);
    }

    let response = request.send().await?;
    let status = response.status();
    let data: Value = response.json().await?;
    Ok((status, data))
}

/// Reshape a 402 body into the flat payment-option form.
///
/// Takes the first entry of `paymentRequest.paymentOptions` and scales the
/// raw amount by its decimal exponent. Missing or mismatched fields are a
/// decode fault, not a guess.
fn normalize_payment_required(url: &str, data: Value) -> GatewayResult<String> {
    let body: PaymentRequiredBody = serde_json::from_value(data)?;
    let option = body
        .payment_request
        .payment_options
        .into_iter()
        .next()
        .ok_or(GatewayError::MissingPaymentOption)?;

    Ok(json!({
        "status": 402,
        "message": format!("Successfully called {url}"),
        "recipient": option.recipient,
        "amount": option.amount as f64 / 10f64.powi(option.decimals),
        "paymentOptionId": option.id,
        "paymentToken": body.payment_token,
    })
    .to_string())
}

// ============================================================================
// Test support
// ============================================================================


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_render() {
        let envelope = ErrorEnvelope::not_configured("Payment service", "PAYMENT_SERVICE");
        let value: Value = serde_json::from_str(&envelope.render()).unwrap();
        assert_eq!(value["error"], "Payment service not configured");
        assert_eq!(
            value["details"],
            "PAYMENT_SERVICE environment variable is not set"
        );
    }

    #[test]
    fn test_normalize_payment_required() {
        let body = json!({
            "paymentRequest": {
                "paymentOptions": [
                    { "recipient": "0xABC", "amount": 150000, "decimals": 4, "id": "opt1" }
                ]
            },
            "paymentToken": "tok1"
        });

        let rendered =
            normalize_payment_required("http://pay.example/logistics/quote/7", body).unwrap();
        let value: Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(value["status"], 402);
        assert_eq!(
            value["message"],
            "Successfully called http://pay.example/logistics/quote/7"
        );
        assert_eq!(value["recipient"], "0xABC");
        assert_eq!(value["amount"], 15.0);
        assert_eq!(value["paymentOptionId"], "opt1");
        assert_eq!(value["paymentToken"], "tok1");
    }

    #[test]
    fn test_normalize_uses_first_option() {
        let body = json!({
            "paymentRequest": {
                "paymentOptions": [
                    { "recipient": "0xAAA", "amount": 100, "decimals": 2, "id": "first" },
                    { "recipient": "0xBBB", "amount": 200, "decimals": 2, "id": "second" }
                ]
            },
            "paymentToken": "tok"
        });

        let rendered = normalize_payment_required("http://x", body).unwrap();
        let value: Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(value["paymentOptionId"], "first");
        assert_eq!(value["amount"], 1.0);
    }

    #[test]
    fn test_normalize_missing_fields_is_fault() {
        // paymentToken absent
        let body = json!({
            "paymentRequest": {
                "paymentOptions": [
                    { "recipient": "0xABC", "amount": 1, "decimals": 0, "id": "opt1" }
                ]
            }
        });
        assert!(normalize_payment_required("http://x", body).is_err());

        // empty options array
        let body = json!({
            "paymentRequest": { "paymentOptions": [] },
            "paymentToken": "tok"
        });
        assert!(matches!(
            normalize_payment_required("http://x", body),
            Err(GatewayError::MissingPaymentOption)
        ));
    }

    #[tokio::test]
    async fn test_call_passes_non_402_through_verbatim() {
        let body = r#"{"watches":[{"id":1,"name":"Chronograph"}],"count":1}"#;
        let (base, _req) = test_http::one_shot(200, body).await;

        let rendered = call_and_normalize(&base, Method::POST, None, None).await;
        let got: Value = serde_json::from_str(&rendered).unwrap();
        let expected: Value = serde_json::from_str(body).unwrap();
        assert_eq!(got, expected);
    }

    #[tokio::test]
    async fn test_call_passes_error_statuses_through() {
        let body = r#"{"message":"watch not found"}"#;
        let (base, _req) = test_http::one_shot(404, body).await;

        let rendered = call_and_normalize(&base, Method::POST, None, None).await;
        let got: Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(got["message"], "watch not found");
        assert!(got.get("error").is_none());
    }

    #[tokio::test]
    async fn test_call_normalizes_402_on_the_wire() {
        let body = r#"{
            "paymentRequest": {
                "paymentOptions": [
                    { "recipient": "0xABC", "amount": 150000, "decimals": 4, "id": "opt1" }
                ]
            },
            "paymentToken": "tok1"
        }"#;
        let (base, _req) = test_http::one_shot(402, body).await;
        let url = format!("{base}/logistics/quote/7");

        let rendered = call_and_normalize(&url, Method::POST, None, None).await;
        let value: Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(value["status"], 402);
        assert_eq!(value["amount"], 15.0);
        assert_eq!(value["message"], format!("Successfully called {url}"));
    }

    #[tokio::test]
    async fn test_malformed_402_becomes_error_envelope() {
        let (base, _req) = test_http::one_shot(402, r#"{"unexpected":"shape"}"#).await;

        let rendered = call_and_normalize(&base, Method::POST, None, None).await;
        let value: Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(value["error"], "Internal server error");
        assert!(value["details"].is_string());
    }

    #[tokio::test]
    async fn test_connection_refused_becomes_error_envelope() {
        let base = test_http::refused_addr().await;

        let rendered = call_and_normalize(&base, Method::POST, None, None).await;
        let value: Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(value["error"], "Internal server error");
    }

    #[tokio::test]
    async fn test_transaction_hash_header_sent_verbatim() {
        let (base, req) = test_http::one_shot(200, "{}").await;
        call_and_normalize(&base, Method::POST, None, Some("0xdeadbeef")).await;

        let raw = req.await.unwrap();
        assert!(raw.contains("X-Transaction-Hash: 0xdeadbeef"));
    }

    #[tokio::test]
    async fn test_blank_transaction_hash_omits_header() {
        for hash in [None, Some(""), Some("   "), Some("\t\n")] {
            let (base, req) = test_http::one_shot(200, "{}").await;
            call_and_normalize(&base, Method::POST, None, hash).await;

            let raw = req.await.unwrap();
            assert!(
                !raw.to_lowercase().contains("x-transaction-hash"),
                "header should be omitted for {hash:?}"
            );
        }
    }

    #[tokio::test]
    async fn test_fetch_session_builds_url() {
        let (base, req) = test_http::one_shot(200, r#"{"sessionPrivateKey":"0xkey"}"#).await;

        let session = fetch_session(&base, "sess-42").await.unwrap();
        assert_eq!(session["sessionPrivateKey"], "0xkey");

        let raw = req.await.unwrap();
        assert!(raw.starts_with("GET /api/sessions/sess-42 "));
    }
}
