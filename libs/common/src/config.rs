//! HTTP server settings loaded from prefixed environment variables

use anyhow::Result;
use config::{Config, Environment};
use serde::Deserialize;

/// Listener settings for a service
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    /// Load settings for the service owning `prefix`
    ///
    /// With prefix `API` this reads `API_HOST` (default: "0.0.0.0") and
    /// `API_PORT` (default: `default_port`).
    pub fn from_env(prefix: &str, default_port: u16) -> Result<Self> {
        let settings = Config::builder()
            .set_default("host", "0.0.0.0")?
            .set_default("port", i64::from(default_port))?
            .add_source(Environment::with_prefix(prefix).try_parsing(true))
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// Address to bind the TCP listener to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_defaults_apply_without_environment() {
        unsafe {
            std::env::remove_var("TESTSVC_HOST");
            std::env::remove_var("TESTSVC_PORT");
        }

        let config = ServerConfig::from_env("TESTSVC", 3001).unwrap();
        assert_eq!(config.bind_address(), "0.0.0.0:3001");
    }

    #[test]
    #[serial]
    fn test_environment_overrides_defaults() {
        unsafe {
            std::env::set_var("TESTSVC_HOST", "127.0.0.1");
            std::env::set_var("TESTSVC_PORT", "8088");
        }

        let config = ServerConfig::from_env("TESTSVC", 3001).unwrap();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 8088);

        unsafe {
            std::env::remove_var("TESTSVC_HOST");
            std::env::remove_var("TESTSVC_PORT");
        }
    }
}
