use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

/// Backend connection settings.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Scheme and authority of the platform. Default: "http://127.0.0.1:8888".
    #[serde(default = "default_server_url")]
    pub url: String,
    /// Path prefix of every API route. Default: "/api".
    #[serde(default = "default_base_path")]
    pub base_path: String,
    /// Per-request deadline in milliseconds. Default: 5000.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_server_url() -> String {
    "http://127.0.0.1:8888".into()
}
fn default_base_path() -> String {
    "/api".into()
}
fn default_timeout_ms() -> u64 {
    5000
}

impl ServerConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Absolute API root, e.g. `http://127.0.0.1:8888/api`.
    pub fn api_root(&self) -> String {
        format!(
            "{}/{}",
            self.url.trim_end_matches('/'),
            self.base_path.trim_matches('/')
        )
        .trim_end_matches('/')
        .to_string()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            url: default_server_url(),
            base_path: default_base_path(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

/// Verdict poller settings.
#[derive(Debug, Deserialize, Clone)]
pub struct PollerConfig {
    /// Interval between poll cycles in milliseconds. Default: 2000.
    #[serde(default = "default_cadence_ms")]
    pub cadence_ms: u64,
}

fn default_cadence_ms() -> u64 {
    2000
}

impl PollerConfig {
    pub fn cadence(&self) -> Duration {
        Duration::from_millis(self.cadence_ms)
    }
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            cadence_ms: default_cadence_ms(),
        }
    }
}

/// Session persistence settings.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct SessionConfig {
    /// File the session is persisted to. `None` keeps it in memory.
    #[serde(default)]
    pub path: Option<PathBuf>,
}
