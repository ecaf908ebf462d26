//! Logistics MCP Server Library
//!
//! An MCP (Model Context Protocol) server for a watch store, exposing five
//! forwarding tools: delivery estimate, warranty check, inventory listing,
//! payment initiation, and receipt retrieval. Each tool validates its input,
//! issues one HTTP call to an upstream service, and reshapes the JSON
//! response - including normalizing HTTP 402 "payment required" answers into
//! a flat payment-option shape.
//!
//! # Architecture
//!
//! - **core**: configuration, error handling, the server handler, and the
//!   transport layer (stdio by default, tcp/http behind features)
//! - **domains::tools**: the tool definitions and the upstream gateway they
//!   all delegate their network I/O to
//!
//! # Upstream services
//!
//! Two base URLs are read from the environment at startup:
//! - `PAYMENT_SERVICE`: logistics quotes, warranty checks, inventory, receipts
//! - `TRANSFER_SERVICE`: session lookup and token transfers
//!
//! A tool whose service is not configured reports that in its JSON result
//! instead of failing the MCP call.
//!
//! # Example
//!
//! ```rust,no_run
//! use logistics_mcp_server::core::{Config, LogisticsServer};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env();
//!     let server = LogisticsServer::new(config);
//!     // Start the server...
//!     Ok(())
//! }
//! ```

pub mod core;
pub mod domains;

// Re-export commonly used types for convenience
pub use core::{Config, Error, LogisticsServer, Result};
