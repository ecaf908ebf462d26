//! MCP server implementation and lifecycle management.
//!
//! The handler is deliberately thin: all behavior lives in the tool
//! definitions, and the `#[tool_handler]` macro routes `tools/list` and
//! `tools/call` through the [`ToolRouter`] built in
//! `domains/tools/router.rs`. Adding a tool never touches this file.

use rmcp::{
    ErrorData as McpError, RoleServer, ServerHandler, handler::server::tool::ToolRouter, model::*,
    service::RequestContext, tool_handler,
};
use std::sync::Arc;

use super::config::Config;
use crate::domains::tools::build_tool_router;

#[cfg(feature = "http")]
use crate::domains::tools::ToolRegistry;

/// The main MCP server handler for the logistics tool surface.
#[derive(Clone)]
pub struct LogisticsServer {
    /// Server configuration, shared with every tool route.
    config: Arc<Config>,

    /// Tool router for handling tool calls.
    tool_router: ToolRouter<Self>,
}

impl LogisticsServer {
    /// Create a new server with the given configuration.
    pub fn new(config: Config) -> Self {
        let config = Arc::new(config);

        Self {
            tool_router: build_tool_router::<Self>(config.clone()),
            config,
        }
    }

    /// Get the server name.
    pub fn name(&self) -> &str {
        &self.config.server.name
    }

    /// Get the server version.
    pub fn version(&self) -> &str {
        &self.config.server.version
    }

    /// Get the server configuration.
    pub fn config(&self) -> &Arc<Config> {
        &self.config
    }

    // ========================================================================
    // HTTP transport support
    // ========================================================================

    /// List all available tools (for HTTP transport).
    #[cfg(feature = "http")]
    pub fn list_tools(&self) -> Vec<serde_json::Value> {
        self.tool_router
            .list_all()
            .into_iter()
            .map(|t| {
                serde_json::json!({
                    "name": t.name,
                    "description": t.description,
                    "inputSchema": t.input_schema
                })
            })
            .collect()
    }

    /// Call a tool by name (for HTTP transport).
    #[cfg(feature = "http")]
    pub async fn call_tool(
        &self,
        name: &str,
        arguments: serde_json::Value,
    ) -> Result<serde_json::Value, String> {
        let registry = ToolRegistry::new(self.config.clone());
        registry.call_tool(name, arguments).await
    }
}

/// ServerHandler implementation with tool_handler macro for automatic tool routing.
#[tool_handler]
impl ServerHandler for LogisticsServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Watch-store logistics server. Provides delivery estimates, warranty \
                 checks, inventory listing, payment initiation and receipt retrieval. \
                 Quote and warranty endpoints may answer with a 402 payment option; \
                 pay it with make_payment and retry with the transaction hash."
                    .to_string(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_exposes_all_tools() {
        let server = LogisticsServer::new(Config::default());
        let tools = server.tool_router.list_all();
        assert_eq!(tools.len(), 5);
    }

    #[test]
    fn test_server_info_is_tools_only() {
        let server = LogisticsServer::new(Config::default());
        let info = server.get_info();
        assert!(info.capabilities.tools.is_some());
        assert!(info.capabilities.resources.is_none());
        assert!(info.capabilities.prompts.is_none());
    }
}
