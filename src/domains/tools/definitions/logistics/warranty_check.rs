//! Warranty check tool.
//!
//! Forwards to `POST {PAYMENT_SERVICE}/warranty/check/{watchId}`. Same
//! paywall contract as the delivery estimate: 402 answers are normalized,
//! everything else passes through.

use futures::FutureExt;
use reqwest::Method;
use rmcp::{
    ErrorData as McpError,
    handler::server::tool::{ToolCallContext, ToolRoute, cached_schema_for_type},
    model::{CallToolResult, Content, Tool},
};
use schemars::JsonSchema;
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

use crate::core::config::{Config, PAYMENT_SERVICE_VAR};
use crate::domains::tools::gateway::{self, ErrorEnvelope};

/// Parameters for the warranty check tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct WarrantyCheckParams {
    /// The watch to check warranty coverage for.
    #[schemars(description = "Watch ID to check warranty for")]
    pub watch_id: u64,

    /// On-chain transaction hash proving payment, if one was made.
    #[serde(default)]
    #[schemars(description = "On-chain transaction hash for payment verification")]
    pub transaction_hash: Option<String>,
}

/// Warranty check tool implementation.
#[derive(Debug, Clone)]
pub struct WarrantyCheckTool;

impl WarrantyCheckTool {
    /// Tool name as registered in MCP.
    pub const NAME: &'static str = "get_warranty_check";

    /// Tool description shown to clients.
    pub const DESCRIPTION: &'static str =
        "Provides a warranty check for the given watch ID. The endpoint is paywalled: \
         without a valid transaction hash it returns a 402 payment option describing how \
         to pay for the check.";

    /// Execute the tool logic. Always returns a JSON string.
    pub async fn execute(params: &WarrantyCheckParams, config: &Config) -> String {
        info!("Warranty check requested for watch {}", params.watch_id);

        let Some(base) = config.upstream.payment_service() else {
            return ErrorEnvelope::not_configured("Payment service", PAYMENT_SERVICE_VAR).render();
        };

        let url = format!("{base}/warranty/check/{}", params.watch_id);
        gateway::call_and_normalize(
            &url,
            Method::POST,
            None,
            params.transaction_hash.as_deref(),
        )
        .await
    }

    /// HTTP handler for this tool (for HTTP transport).
    #[cfg(feature = "http")]
    pub async fn http_handler(
        arguments: serde_json::Value,
        config: Arc<Config>,
    ) -> Result<serde_json::Value, String> {
        let params: WarrantyCheckParams =
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
            input_schema: cached_schema_for_type::<WarrantyCheckParams>(),
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
                let params: WarrantyCheckParams =
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
    use serde_json::Value;

    #[tokio::test]
    async fn test_unconfigured_service_short_circuits() {
        let params = WarrantyCheckParams {
            watch_id: 1,
            transaction_hash: None,
        };

        let out = WarrantyCheckTool::execute(&params, &Config::default()).await;
        let value: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["error"], "Payment service not configured");
    }

    #[tokio::test]
    async fn test_402_is_normalized() {
        let body = r#"{
            "paymentRequest": {
                "paymentOptions": [
                    { "recipient": "0xABC", "amount": 150000, "decimals": 4, "id": "opt1" }
                ]
            },
            "paymentToken": "tok1"
        }"#;
        let (base, req) = test_http::one_shot(402, body).await;

        let mut config = Config::default();
        config.upstream.payment_service = Some(base.clone());

        let params = WarrantyCheckParams {
            watch_id: 9,
            transaction_hash: None,
        };
        let out = WarrantyCheckTool::execute(&params, &config).await;
        let value: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["status"], 402);
        assert_eq!(value["amount"], 15.0);
        assert_eq!(value["paymentOptionId"], "opt1");
        assert_eq!(value["paymentToken"], "tok1");
        assert_eq!(
            value["message"],
            format!("Successfully called {base}/warranty/check/9")
        );

        let raw = req.await.unwrap();
        assert!(raw.starts_with("POST /warranty/check/9 "));
    }
}
