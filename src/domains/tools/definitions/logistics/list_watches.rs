//! Inventory listing tool.
//!
//! Forwards to `GET {PAYMENT_SERVICE}/get-watches` and returns the upstream
//! body verbatim. The inventory endpoint is not paywalled, so no 402
//! normalization applies; whatever status comes back, the parsed body is
//! passed through for the client to interpret.

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

/// Parameters for the inventory listing tool. Takes no arguments.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct ListWatchesParams {}

/// Inventory listing tool implementation.
#[derive(Debug, Clone)]
pub struct ListWatchesTool;

impl ListWatchesTool {
    /// Tool name as registered in MCP.
    pub const NAME: &'static str = "get_watches";

    /// Tool description shown to clients.
    pub const DESCRIPTION: &'static str =
        "Returns a list of all watches available in inventory.";

    /// Execute the tool logic. Always returns a JSON string.
    pub async fn execute(_params: &ListWatchesParams, config: &Config) -> String {
        info!("Inventory listing requested");

        let Some(base) = config.upstream.payment_service() else {
            return ErrorEnvelope::not_configured("Payment service", PAYMENT_SERVICE_VAR).render();
        };

        let url = format!("{base}/get-watches");
        match gateway::call_json(&url, Method::GET, None).await {
            Ok(data) => data.to_string(),
            Err(e) => ErrorEnvelope::internal(e).render(),
        }
    }

    /// HTTP handler for this tool (for HTTP transport).
    #[cfg(feature = "http")]
    pub async fn http_handler(
        arguments: serde_json::Value,
        config: Arc<Config>,
    ) -> Result<serde_json::Value, String> {
        let params: ListWatchesParams =
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
            input_schema: cached_schema_for_type::<ListWatchesParams>(),
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
                let params: ListWatchesParams =
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
        let out = ListWatchesTool::execute(&ListWatchesParams {}, &Config::default()).await;
        let value: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["error"], "Payment service not configured");
        assert_eq!(
            value["details"],
            "PAYMENT_SERVICE environment variable is not set"
        );
    }

    #[tokio::test]
    async fn test_inventory_passes_through_verbatim() {
        let body = r#"{"watches":[{"id":1,"model":"Submariner"},{"id":2,"model":"Speedmaster"}]}"#;
        let (base, req) = test_http::one_shot(200, body).await;

        let mut config = Config::default();
        config.upstream.payment_service = Some(base);

        let out = ListWatchesTool::execute(&ListWatchesParams {}, &config).await;
        let got: Value = serde_json::from_str(&out).unwrap();
        let expected: Value = serde_json::from_str(body).unwrap();
        assert_eq!(got, expected);

        let raw = req.await.unwrap();
        assert!(raw.starts_with("GET /get-watches "));
    }

    #[tokio::test]
    async fn test_network_failure_becomes_error_envelope() {
        let mut config = Config::default();
        config.upstream.payment_service = Some(test_http::refused_addr().await);

        let out = ListWatchesTool::execute(&ListWatchesParams {}, &config).await;
        let value: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["error"], "Internal server error");
    }
}
