//! Delivery estimate tool.
//!
//! Forwards to `POST {PAYMENT_SERVICE}/logistics/quote/{watchId}` on the
//! payment service. The quote endpoint is paywalled: a 402 answer is
//! normalized into the flat payment-option shape so the client can pay and
//! retry with a transaction hash.

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

/// Parameters for the delivery estimate tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryEstimateParams {
    /// The watch to quote delivery for.
    #[schemars(description = "Watch ID to get a delivery estimate for")]
    pub watch_id: u64,

    /// On-chain transaction hash proving payment, if one was made.
    #[serde(default)]
    #[schemars(description = "On-chain transaction hash for payment verification")]
    pub transaction_hash: Option<String>,
}

/// Delivery estimate tool implementation.
#[derive(Debug, Clone)]
pub struct DeliveryEstimateTool;

impl DeliveryEstimateTool {
    /// Tool name as registered in MCP.
    pub const NAME: &'static str = "get_delivery_estimate";

    /// Tool description shown to clients.
    pub const DESCRIPTION: &'static str =
        "Provides a delivery estimate for the given watch ID. The endpoint is paywalled: \
         without a valid transaction hash it returns a 402 payment option describing how \
         to pay for the quote.";

    /// Execute the tool logic. Always returns a JSON string.
    pub async fn execute(params: &DeliveryEstimateParams, config: &Config) -> String {
        info!("Delivery estimate requested for watch {}", params.watch_id);

        let Some(base) = config.upstream.payment_service() else {
            return ErrorEnvelope::not_configured("Payment service", PAYMENT_SERVICE_VAR).render();
        };

        let url = format!("{base}/logistics/quote/{}", params.watch_id);
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
        let params: DeliveryEstimateParams =
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
            input_schema: cached_schema_for_type::<DeliveryEstimateParams>(),
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
                let params: DeliveryEstimateParams =
                    serde_json::from_value(serde_json::Value::Object(args))
                        .map_err(|e| McpError::invalid_params(e.to_string(), None))?;

                let out = Self::execute(&params, &config).await;
                Ok(CallToolResult::success(vec![Content::text(out)]))
            }
            .boxed()
        })
    }
}
