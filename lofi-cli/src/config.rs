//! Configuration module
//!
//! Connection settings for the processing service and controller tuning.

use anyhow::{Context, Result};
use lofi_controller::ControllerConfig;

/// CLI configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the processing service
    pub api_url: String,
    /// Bearer token attached to every request
    pub token: String,
    /// Polling and timeout settings
    pub controller: ControllerConfig,
}

impl Config {
    /// Combines command-line settings with controller settings from the environment
    pub fn load(api_url: String, token: String) -> Result<Self> {
        let controller =
            ControllerConfig::from_env().context("Invalid controller settings in environment")?;

        let config = Self {
            api_url,
            token,
            controller,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration
    pub fn validate(&self) -> Result<()> {
        if self.token.trim().is_empty() {
            anyhow::bail!("API token cannot be empty");
        }

        if !self.api_url.starts_with("http://") && !self.api_url.starts_with("https://") {
            anyhow::bail!("API URL must start with http:// or https://");
        }

        self.controller.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(api_url: &str, token: &str) -> Config {
        Config {
            api_url: api_url.to_string(),
            token: token.to_string(),
            controller: ControllerConfig::default(),
        }
    }

    #[test]
    fn test_config_validation() {
        assert!(config("http://localhost:8000", "secret").validate().is_ok());
        assert!(config("localhost:8000", "secret").validate().is_err());
        assert!(config("https://lofi.example.com", " ").validate().is_err());
    }
}
