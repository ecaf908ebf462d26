//! Receipt retrieval tool.
//!
//! Two-stage call: first fetch the session record from the sessions service
//! to obtain the session-scoped private key, then `POST
//! {PAYMENT_SERVICE}/get-receipt` with the payment token, settlement
//! transaction hash, that key, and the payment option ID. The payment-service
//! body is returned verbatim.
//!
//! The two stages fail distinctly: a session-lookup failure short-circuits
//! with its own envelope before the payment service is contacted, while
//! faults in the receipt call itself use the generic envelope.

use futures::FutureExt;
use reqwest::Method;
use rmcp::{
    ErrorData as McpError,
    handler::server::tool::{ToolCallContext, ToolRoute, cached_schema_for_type},
    model::{CallToolResult, Content, Tool},
};
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::{info, warn};

use crate::core::config::{Config, PAYMENT_SERVICE_VAR};
use crate::domains::tools::gateway::{self, ErrorEnvelope};

/// JSON field of the session record carrying the client signing key.
const SESSION_PRIVATE_KEY_FIELD: &str = "sessionPrivateKey";

/// Parameters for the receipt retrieval tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GetReceiptParams {
    /// Session whose private key signs the receipt request.
    #[schemars(description = "Session ID")]
    pub session_id: String,

    /// Opaque token from the original 402 response.
    #[schemars(description = "Payment token from the 402 response")]
    pub payment_token: String,

    /// Hash of the settlement transaction.
    #[schemars(description = "On-chain settlement transaction hash")]
    pub transaction_hash: String,

    /// Identifier of the payment option that was settled.
    #[schemars(description = "Payment option ID that was paid")]
    pub payment_option_id: String,
}

/// Receipt retrieval tool implementation.
#[derive(Debug, Clone)]
pub struct GetReceiptTool;

impl GetReceiptTool {
    /// Tool name as registered in MCP.
    pub const NAME: &'static str = "get_receipt";

    /// Tool description shown to clients.
    pub const DESCRIPTION: &'static str =
        "Retrieves a payment receipt after settlement. Looks up the session's private \
         key from the sessions service, then requests the receipt from the payment \
         service using the payment token and settlement transaction hash.";

    /// Execute the tool logic. Always returns a JSON string.
    pub async fn execute(params: &GetReceiptParams, config: &Config) -> String {
        info!("Receipt requested for session {}", params.session_id);

        let Some(payment_base) = config.upstream.payment_service() else {
            return ErrorEnvelope::not_configured("Payment service", PAYMENT_SERVICE_VAR).render();
        };

        // Stage 1: session lookup. Failures here never reach the payment
        // service and carry their own envelope so callers can tell the
        // stages apart.
        let session = match Self::session_record(config, &params.session_id).await {
            Ok(session) => session,
            Err(details) => {
                warn!("session lookup failed for {}: {details}", params.session_id);
                return ErrorEnvelope::new("Internal server error getting session data", details)
                    .render();
            }
        };

        // A record without the key field folds into the generic fault path.
        let Some(private_key) = session
            .get(SESSION_PRIVATE_KEY_FIELD)
            .and_then(Value::as_str)
        else {
            return ErrorEnvelope::internal(format!(
                "session record is missing the {SESSION_PRIVATE_KEY_FIELD} field"
            ))
            .render();
        };

        // Stage 2: the receipt call proper.
        let url = format!("{payment_base}/get-receipt");
        let body = json!({
            "paymentToken": params.payment_token,
            "settlementTxnHash": params.transaction_hash,
            "clientPrivateKey": private_key,
            "paymentOptionId": params.payment_option_id,
        });

        match gateway::call_json(&url, Method::POST, Some(body)).await {
            Ok(data) => data.to_string(),
            Err(e) => ErrorEnvelope::internal(e).render(),
        }
    }

    /// Fetch the session record, mapping every failure (unconfigured
    /// sessions service included) to a fault description string.
    async fn session_record(config: &Config, session_id: &str) -> Result<Value, String> {
        let base = config
            .upstream
            .transfer_service()
            .ok_or_else(|| "TRANSFER_SERVICE environment variable is not set".to_string())?;

        gateway::fetch_session(base, session_id)
            .await
            .map_err(|e| e.to_string())
    }

    /// HTTP handler for this tool (for HTTP transport).
    #[cfg(feature = "http")]
    pub async fn http_handler(
        arguments: serde_json::Value,
        config: Arc<Config>,
    ) -> Result<serde_json::Value, String> {
        let params: GetReceiptParams =
            serde_json::from_value(arguments).map_err(|e| e.to_string())?;
        let out = Self::execute(&params, &config).await;
        Ok(serde_json::json!({
            "content": [Content::text(out)],
            "isError": false
        }))
    }

    /// Create a Tool model for this tool (metadata).
    pub fn to_tool() -> Tool {
        Tool {
            name: Self::NAME.into(),
            description: Some(Self::DESCRIPTION.into()),
            input_schema: cached_schema_for_type::<GetReceiptParams>(),
            annotations: None,
            output_schema: None,
            icons: None,
            meta: None,
            title: None,
        }
    }

    /// Create a ToolRoute for STDIO/TCP transport.
    pub fn create_route<S>(config: Arc<Config>) -> ToolRoute<S>
    where
        S: Send + Sync + 'static,
    {
        ToolRoute::new_dyn(Self::to_tool(), move |ctx: ToolCallContext<'_, S>| {
            let args = ctx.arguments.clone().unwrap_or_default();
            let config = config.clone();
            async move {
                let params: GetReceiptParams =
                    serde_json::from_value(serde_json::Value::Object(args))
                        .map_err(|e| McpError::invalid_params(e.to_string(), None))?;

                let out = Self::execute(&params, &config).await;
                Ok(CallToolResult::success(vec![Content::text(out)]))
            }
            .boxed()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::tools::gateway::test_http;

    fn params() -> GetReceiptParams {
        GetReceiptParams {
            session_id: "sess-1".to_string(),
            payment_token: "tok1".to_string(),
            transaction_hash: "0xsettled".to_string(),
            payment_option_id: "opt1".to_string(),
        }
    }

    #[tokio::test]
    async fn test_unconfigured_payment_service_short_circuits() {
        let out = GetReceiptTool::execute(&params(), &Config::default()).await;
        let value: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["error"], "Payment service not configured");
    }

    #[tokio::test]
    async fn test_session_lookup_failure_short_circuits() {
        // The sessions service refuses connections; the payment service must
        // never be contacted, which the one-shot responder would observe.
        let (payment_base, mut payment_req) = test_http::one_shot(200, "{}").await;

        let mut config = Config::default();
        config.upstream.payment_service = Some(payment_base);
        config.upstream.transfer_service = Some(test_http::refused_addr().await);

        let out = GetReceiptTool::execute(&params(), &config).await;
        let value: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["error"], "Internal server error getting session data");

        assert!(
            payment_req.try_recv().is_err(),
            "payment service must not be called when the session lookup fails"
        );
    }

    #[tokio::test]
    async fn test_missing_private_key_is_generic_fault() {
        let (sessions_base, _req) = test_http::one_shot(200, r#"{"owner":"0xABC"}"#).await;
        let (payment_base, _preq) = test_http::one_shot(200, "{}").await;

        let mut config = Config::default();
        config.upstream.payment_service = Some(payment_base);
        config.upstream.transfer_service = Some(sessions_base);

        let out = GetReceiptTool::execute(&params(), &config).await;
        let value: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["error"], "Internal server error");
    }

    #[tokio::test]
    async fn test_receipt_body_and_passthrough() {
        let (sessions_base, _sreq) =
            test_http::one_shot(200, r#"{"sessionPrivateKey":"0xkey"}"#).await;
        let (payment_base, preq) =
            test_http::one_shot(200, r#"{"receipt":{"id":"r-9","verified":true}}"#).await;

        let mut config = Config::default();
        config.upstream.payment_service = Some(payment_base);
        config.upstream.transfer_service = Some(sessions_base);

        let out = GetReceiptTool::execute(&params(), &config).await;
        let value: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["receipt"]["id"], "r-9");
        assert_eq!(value["receipt"]["verified"], true);

        let raw = preq.await.unwrap();
        assert!(raw.starts_with("POST /get-receipt "));
        let body_start = raw.find("\r\n\r\n").unwrap() + 4;
        let sent: Value = serde_json::from_str(&raw[body_start..]).unwrap();
        assert_eq!(sent["paymentToken"], "tok1");
        assert_eq!(sent["settlementTxnHash"], "0xsettled");
        assert_eq!(sent["clientPrivateKey"], "0xkey");
        assert_eq!(sent["paymentOptionId"], "opt1");
    }
}
