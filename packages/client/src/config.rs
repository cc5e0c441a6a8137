use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

pub use common::config::{PollerConfig, ServerConfig, SessionConfig};

/// Client application configuration.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct ClientConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub poller: PollerConfig,
    #[serde(default)]
    pub session: SessionConfig,
}

impl ClientConfig {
    /// Load from `CDSCTF_CONFIG` (default `config/client`), then the
    /// environment (e.g. `CDSCTF__SERVER__URL`).
    pub fn load() -> Result<Self, ConfigError> {
        let config_path =
            std::env::var("CDSCTF_CONFIG").unwrap_or_else(|_| "config/client".to_string());
        Self::load_from(&config_path)
    }

    pub fn load_from(config_path: &str) -> Result<Self, ConfigError> {
        let s = Config::builder()
            .set_default("server.url", "http://127.0.0.1:8888")?
            .set_default("server.base_path", "/api")?
            .set_default("server.timeout_ms", 5000_i64)?
            .set_default("poller.cadence_ms", 2000_i64)?
            .add_source(File::with_name(config_path).required(false))
            .add_source(Environment::with_prefix("CDSCTF").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
