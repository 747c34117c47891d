//! Configuration Module
//!
//! Handles loading and managing store configuration from environment variables.

use std::env;
use std::path::PathBuf;

/// Store configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the remote backend
    pub backend_url: String,
    /// Per-request timeout in seconds for remote calls
    pub request_timeout: u64,
    /// Directory for durable session storage
    pub storage_dir: PathBuf,
    /// Interval in seconds between background reconciliation runs
    pub reconcile_interval: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `BACKEND_URL` - Base URL of the remote backend (default: http://localhost:3000)
    /// - `REQUEST_TIMEOUT` - Remote call timeout in seconds (default: 10)
    /// - `STORAGE_DIR` - Durable storage directory (default: .realty_store)
    /// - `RECONCILE_INTERVAL` - Reconciliation frequency in seconds (default: 300)
    pub fn from_env() -> Self {
        Self {
            backend_url: env::var("BACKEND_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            request_timeout: env::var("REQUEST_TIMEOUT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10),
            storage_dir: env::var("STORAGE_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(".realty_store")),
            reconcile_interval: env::var("RECONCILE_INTERVAL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(300),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend_url: "http://localhost:3000".to_string(),
            request_timeout: 10,
            storage_dir: PathBuf::from(".realty_store"),
            reconcile_interval: 300,
        }
    }
}
