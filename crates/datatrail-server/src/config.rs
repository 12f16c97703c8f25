//! Server Configuration
//!
//! Configuration is resolved once at startup and passed explicitly to the
//! components that need it; the request path never reads the environment.
//!
//! ## Environment Variables
//!
//! - `DATATRAIL_AUTH_URL`: base URL of the credential check endpoint (required)
//! - `DATATRAIL_DATA_DIR`: root directory for log file pairs (default: ./data)
//! - `DATATRAIL_LISTEN_ADDR`: bind address (default: 0.0.0.0:8080)
//! - `DATATRAIL_AUTH_TIMEOUT_SECS`: credential round-trip timeout (default: 30)

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address for the ingestion endpoint (default: 0.0.0.0:8080)
    #[serde(default = "default_listen_addr")]
    pub listen_addr: SocketAddr,

    /// Root directory holding per-identity file pairs (default: ./data)
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Base URL of the remote credential check endpoint
    pub auth_url: String,

    /// Timeout for the credential round trip in seconds (default: 30)
    #[serde(default = "default_auth_timeout_secs")]
    pub auth_timeout_secs: u64,
}

impl ServerConfig {
    /// Build configuration from `DATATRAIL_*` environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        let auth_url = std::env::var("DATATRAIL_AUTH_URL")
            .map_err(|_| anyhow::anyhow!("missing required env var DATATRAIL_AUTH_URL"))?;

        let listen_addr = match std::env::var("DATATRAIL_LISTEN_ADDR") {
            Ok(v) => v.parse()?,
            Err(_) => default_listen_addr(),
        };

        let data_dir = std::env::var("DATATRAIL_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_data_dir());

        let auth_timeout_secs = match std::env::var("DATATRAIL_AUTH_TIMEOUT_SECS") {
            Ok(v) => v.parse()?,
            Err(_) => default_auth_timeout_secs(),
        };

        Ok(Self {
            listen_addr,
            data_dir,
            auth_url,
            auth_timeout_secs,
        })
    }

    pub fn auth_timeout(&self) -> Duration {
        Duration::from_secs(self.auth_timeout_secs)
    }
}

fn default_listen_addr() -> SocketAddr {
    "0.0.0.0:8080".parse().expect("valid default bind address")
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

fn default_auth_timeout_secs() -> u64 {
    30
}
