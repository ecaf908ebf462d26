//! Configuration management for the logistics MCP server.
//!
//! All configuration is read once at startup and held immutably for the
//! process lifetime. The two upstream base URLs come straight from the
//! environment; an absent or blank value is a valid "not configured" state
//! that each tool must report instead of attempting I/O.

use super::transport::TransportConfig;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Environment variable holding the payment/logistics service base URL.
pub const PAYMENT_SERVICE_VAR: &str = "PAYMENT_SERVICE";

/// Environment variable holding the sessions/transfer service base URL.
pub const TRANSFER_SERVICE_VAR: &str = "TRANSFER_SERVICE";

/// Main configuration structure for the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server identification and metadata.
    pub server: ServerConfig,

    /// Upstream service endpoints.
    pub upstream: UpstreamConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,

    /// Transport configuration.
    pub transport: TransportConfig,
}

/// Server identification configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// The name of the server as reported to clients.
    pub name: String,

    /// The version of the server.
    pub version: String,
}

/// Base URLs of the two upstream services.
///
/// `None` means the service was never configured. Blank strings from the
/// environment are treated as unset so a stray `PAYMENT_SERVICE=""` does not
/// produce requests against relative URLs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// Payment/logistics/receipt service base URL.
    pub payment_service: Option<String>,

    /// Sessions/transfer service base URL.
    pub transfer_service: Option<String>,
}

impl UpstreamConfig {
    pub fn payment_service(&self) -> Option<&str> {
        Self::non_blank(self.payment_service.as_deref())
    }

    pub fn transfer_service(&self) -> Option<&str> {
        Self::non_blank(self.transfer_service.as_deref())
    }

    fn non_blank(value: Option<&str>) -> Option<&str> {
        value.filter(|v| !v.trim().is_empty())
    }

    /// Log which upstream services are configured. Called once at startup,
    /// after the logging subsystem is up.
    pub fn log_status(&self) {
        match self.payment_service() {
            Some(url) => info!("Payment service: {url}"),
            None => warn!(
                "{PAYMENT_SERVICE_VAR} not set - logistics, inventory and receipt \
                 tools will report the service as not configured"
            ),
        }

        match self.transfer_service() {
            Some(url) => info!("Transfer service: {url}"),
            None => warn!(
                "{TRANSFER_SERVICE_VAR} not set - payment and receipt tools will \
                 report the service as not configured"
            ),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "trace").
    pub level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                name: "logistics-mcp-server".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            upstream: UpstreamConfig::default(),
            logging: LoggingConfig {
                level: "info".to_string(),
            },
            transport: TransportConfig::default(),
        }
    }
}

impl Config {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let mut config = Self::default();

        if let Ok(name) = std::env::var("MCP_SERVER_NAME") {
            config.server.name = name;
        }

        if let Ok(level) = std::env::var("MCP_LOG_LEVEL") {
            config.logging.level = level;
        }

        config.transport = TransportConfig::from_env();

        config.upstream.payment_service = std::env::var(PAYMENT_SERVICE_VAR).ok();
        config.upstream.transfer_service = std::env::var(TRANSFER_SERVICE_VAR).ok();

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Mutex to ensure env var tests run serially
    static ENV_TEST_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn test_upstream_from_env() {
        let _lock = ENV_TEST_LOCK.lock().unwrap();
        unsafe {
            std::env::set_var(PAYMENT_SERVICE_VAR, "http://pay.example");
            std::env::set_var(TRANSFER_SERVICE_VAR, "http://sessions.example");
        }
        let config = Config::from_env();
        assert_eq!(
            config.upstream.payment_service(),
            Some("http://pay.example")
        );
        assert_eq!(
            config.upstream.transfer_service(),
            Some("http://sessions.example")
        );
        unsafe {
            std::env::remove_var(PAYMENT_SERVICE_VAR);
            std::env::remove_var(TRANSFER_SERVICE_VAR);
        }
    }

    #[test]
    fn test_unset_upstream_is_none() {
        let _lock = ENV_TEST_LOCK.lock().unwrap();
        unsafe {
            std::env::remove_var(PAYMENT_SERVICE_VAR);
            std::env::remove_var(TRANSFER_SERVICE_VAR);
        }
        let config = Config::from_env();
        assert_eq!(config.upstream.payment_service(), None);
        assert_eq!(config.upstream.transfer_service(), None);
    }

    #[test]
    fn test_blank_upstream_is_treated_as_unset() {
        let upstream = UpstreamConfig {
            payment_service: Some("   ".to_string()),
            transfer_service: Some(String::new()),
        };
        assert_eq!(upstream.payment_service(), None);
        assert_eq!(upstream.transfer_service(), None);
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.name, "logistics-mcp-server");
        assert_eq!(config.upstream.payment_service(), None);
    }
}
