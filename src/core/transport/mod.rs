//! Transport layer for the MCP server.
//!
//! Three interchangeable transports, selected at compile time by feature
//! and at runtime by `MCP_TRANSPORT`:
//! - **STDIO** (`stdio`, default): standard MCP mode over stdin/stdout
//! - **TCP** (`tcp`): line-delimited JSON-RPC over a raw socket
//! - **HTTP** (`http`): JSON-RPC over POST requests via axum
//!
//! Each transport owns the connection lifecycle and hands message
//! processing to the server handler.

mod config;
mod error;
mod service;

#[cfg(feature = "http")]
pub mod http;

#[cfg(feature = "tcp")]
pub mod tcp;

#[cfg(feature = "stdio")]
pub mod stdio;

pub use config::TransportConfig;
pub use error::{TransportError, TransportResult};
pub use service::TransportService;

#[cfg(feature = "tcp")]
pub use config::TcpConfig;

#[cfg(feature = "http")]
pub use config::HttpConfig;
