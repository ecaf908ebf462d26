//! Tool Registry - central registration and dispatch for all tools.
//!
//! Provides the canonical tool list and, with the `http` feature, the
//! dispatch path the HTTP transport uses to call tools by name.

use std::sync::Arc;
#[cfg(feature = "http")]
use tracing::warn;

use rmcp::model::Tool;

use crate::core::config::Config;

#[cfg(feature = "http")]
use super::error::ToolError;

use super::definitions::{
    DeliveryEstimateTool, GetReceiptTool, ListWatchesTool, MakePaymentTool, WarrantyCheckTool,
};

/// Tool registry - manages all available tools.
pub struct ToolRegistry {
    #[cfg_attr(not(feature = "http"), allow(dead_code))]
    config: Arc<Config>,
}

impl ToolRegistry {
    /// Create a new tool registry.
    pub fn new(config: Arc<Config>) -> Self {
        Self { config }
    }

    /// Get all tool names.
    pub fn tool_names(&self) -> Vec<&'static str> {
        vec![
            DeliveryEstimateTool::NAME,
            WarrantyCheckTool::NAME,
            ListWatchesTool::NAME,
            MakePaymentTool::NAME,
            GetReceiptTool::NAME,
        ]
    }

    /// Get all tools as Tool models (metadata).
    ///
    /// The single source of truth for the exposed tool set; both HTTP and
    /// STDIO/TCP transports derive their listings from it.
    pub fn get_all_tools() -> Vec<Tool> {
        vec![
            DeliveryEstimateTool::to_tool(),
            WarrantyCheckTool::to_tool(),
            ListWatchesTool::to_tool(),
            MakePaymentTool::to_tool(),
            GetReceiptTool::to_tool(),
        ]
    }

    /// Dispatch an HTTP tool call to the appropriate handler.
    #[cfg(feature = "http")]
    pub async fn call_tool(
        &self,
        name: &str,
        arguments: serde_json::Value,
    ) -> Result<serde_json::Value, String> {
        let config = self.config.clone();
        match name {
            DeliveryEstimateTool::NAME => {
                DeliveryEstimateTool::http_handler(arguments, config).await
            }
            WarrantyCheckTool::NAME => WarrantyCheckTool::http_handler(arguments, config).await,
            ListWatchesTool::NAME => ListWatchesTool::http_handler(arguments, config).await,
            MakePaymentTool::NAME => MakePaymentTool::http_handler(arguments, config).await,
            GetReceiptTool::NAME => GetReceiptTool::http_handler(arguments, config).await,
            _ => {
                warn!("Unknown tool requested: {}", name);
                Err(ToolError::not_found(name).to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> Arc<Config> {
        Arc::new(Config::default())
    }

    #[test]
    fn test_registry_tool_names() {
        let registry = ToolRegistry::new(test_config());
        let names = registry.tool_names();
        assert_eq!(names.len(), 5);
        assert!(names.contains(&"get_delivery_estimate"));
        assert!(names.contains(&"get_warranty_check"));
        assert!(names.contains(&"get_watches"));
        assert!(names.contains(&"make_payment"));
        assert!(names.contains(&"get_receipt"));
    }

    #[test]
    fn test_get_all_tools_have_schemas() {
        let tools = ToolRegistry::get_all_tools();
        assert_eq!(tools.len(), 5);
        for tool in tools {
            assert!(tool.description.is_some());
        }
    }

    #[cfg(feature = "http")]
    #[tokio::test]
    async fn test_registry_call_unknown() {
        let registry = ToolRegistry::new(test_config());
        let result = registry.call_tool("unknown", serde_json::json!({})).await;
        assert!(result.is_err());
    }

    #[cfg(feature = "http")]
    #[tokio::test]
    async fn test_registry_call_unconfigured_tool() {
        // With no upstream configured the tool still answers with its
        // error envelope rather than a dispatch error.
        let registry = ToolRegistry::new(test_config());
        let result = registry
            .call_tool("get_watches", serde_json::json!({}))
            .await
            .unwrap();
        assert_eq!(result["isError"], false);
    }
}
