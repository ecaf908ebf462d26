//! Payment initiation tool.
//!
//! Forwards to `POST {TRANSFER_SERVICE}/api/sessions/transfer` with the
//! sender/session/amount/recipient body and returns the upstream response
//! with the chosen `paymentOptionId` injected, so the client can hand both
//! straight to the receipt tool.

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
use tracing::info;

use crate::core::config::{Config, TRANSFER_SERVICE_VAR};
use crate::domains::tools::gateway::{self, ErrorEnvelope, GatewayError};

/// Path of the transfer endpoint on the sessions service.
const TRANSFER_ENDPOINT: &str = "api/sessions/transfer";

/// Parameters for the payment initiation tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct MakePaymentParams {
    /// Identifier of the 402 payment option being settled.
    #[schemars(description = "Payment option ID from a prior 402 response")]
    pub payment_option_id: String,

    /// Address the payment is sent from.
    #[schemars(description = "Sender account address")]
    pub sender_address: String,

    /// Session authorizing the transfer.
    #[schemars(description = "Session ID")]
    pub session_id: String,

    /// Address the payment is sent to.
    #[schemars(description = "Recipient address from the 402 payment option")]
    pub recipient_address: String,

    /// Display-scale amount, as normalized from the 402 payment option.
    #[schemars(description = "Amount to transfer")]
    pub amount: f64,
}

/// Payment initiation tool implementation.
#[derive(Debug, Clone)]
pub struct MakePaymentTool;

impl MakePaymentTool {
    /// Tool name as registered in MCP.
    pub const NAME: &'static str = "make_payment";

    /// Tool description shown to clients.
    pub const DESCRIPTION: &'static str =
        "Makes a payment through the sessions transfer endpoint. Returns the transfer \
         result with the paymentOptionId attached for the follow-up receipt request.";

    /// Execute the tool logic. Always returns a JSON string.
    pub async fn execute(params: &MakePaymentParams, config: &Config) -> String {
        info!(
            "Payment of {} requested for session {}",
            params.amount, params.session_id
        );

        let Some(base) = config.upstream.transfer_service() else {
            return ErrorEnvelope::not_configured("Transfer Service", TRANSFER_SERVICE_VAR)
                .render();
        };

        let url = format!("{base}/{TRANSFER_ENDPOINT}");
        let body = json!({
            "accountAddress": params.sender_address,
            "sessionId": params.session_id,
            "amount": params.amount,
            "recipient": params.recipient_address,
        });

        match gateway::call_json(&url, Method::POST, Some(body)).await {
            // The paymentOptionId rides along on whatever the upstream said.
            Ok(Value::Object(mut map)) => {
                map.insert(
                    "paymentOptionId".to_string(),
                    Value::String(params.payment_option_id.clone()),
                );
                Value::Object(map).to_string()
            }
            Ok(_) => ErrorEnvelope::internal(GatewayError::NotAnObject).render(),
            Err(e) => ErrorEnvelope::internal(e).render(),
        }
    }

    /// HTTP handler for this tool (for HTTP transport).
    #[cfg(feature = "http")]
    pub async fn http_handler(
        arguments: serde_json::Value,
        config: Arc<Config>,
    ) -> Result<serde_json::Value, String> {
        let params: MakePaymentParams =
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
            input_schema: cached_schema_for_type::<MakePaymentParams>(),
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
                let params: MakePaymentParams =
                    serde_json::from_value(serde_json::Value::Object(args))
                        .map_err(|e| McpError::invalid_params(e.to_string(), None))?;

                let out = Self::execute(&params, &config).await;
                Ok(CallToolResult::success(vec![Content::text(out)]))
            }
            .boxed()
        })
    }
}
