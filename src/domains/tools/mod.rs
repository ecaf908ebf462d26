//! Tools domain module.
//!
//! Everything the server exposes lives here: five forwarding tools, the
//! upstream gateway they share, and the router/registry pair that wires
//! them into the transports.
//!
//! - `definitions/` - individual tool implementations (one file per tool)
//! - `gateway.rs` - the shared upstream HTTP call and normalization path
//! - `router.rs` - dynamic ToolRouter builder for STDIO/TCP transport
//! - `registry.rs` - central tool registry and HTTP dispatch
//! - `error.rs` - dispatch error types

pub mod definitions;
mod error;
pub mod gateway;
mod registry;
pub mod router;

pub use error::ToolError;
pub use registry::ToolRegistry;
pub use router::build_tool_router;
