//! Tool Router - builds the rmcp ToolRouter from the tool definitions.
//!
//! Each tool knows how to create its own route; this module only wires them
//! together for the STDIO/TCP transports.

use std::sync::Arc;

use rmcp::handler::server::tool::ToolRouter;

use crate::core::config::Config;

use super::definitions::{
    DeliveryEstimateTool, GetReceiptTool, ListWatchesTool, MakePaymentTool, WarrantyCheckTool,
};

/// Build the tool router with all registered tools.
pub fn build_tool_router<S>(config: Arc<Config>) -> ToolRouter<S>
where
    S: Send + Sync + 'static,
{
    ToolRouter::new()
        .with_route(DeliveryEstimateTool::create_route(config.clone()))
        .with_route(WarrantyCheckTool::create_route(config.clone()))
        .with_route(ListWatchesTool::create_route(config.clone()))
        .with_route(MakePaymentTool::create_route(config.clone()))
        .with_route(GetReceiptTool::create_route(config))
}
