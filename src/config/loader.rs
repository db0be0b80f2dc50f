//! Configuration loading from disk and the environment.

use std::fmt;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::Config;
use crate::config::validation::ValidationError;

/// Environment variable prefix for configuration overrides.
pub const ENV_PREFIX: &str = "GNO_FAUCET";

/// A collection of validation failures, formatted as one message.
#[derive(Debug)]
pub struct ValidationErrors(pub Vec<ValidationError>);

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid configuration: ")?;

        for (i, err) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{err}")?;
        }

        Ok(())
    }
}

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unable to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("unable to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid environment override {name}={value}")]
    Env { name: String, value: String },

    #[error("{0}")]
    Validation(ValidationErrors),
}

/// Reads a configuration from a TOML file.
pub fn read_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;

    Ok(config)
}

/// Applies `GNO_FAUCET_*` environment overrides on top of the config.
pub fn apply_env_overrides(config: &mut Config) -> Result<(), ConfigError> {
    if let Some(value) = env_override("LISTEN_ADDRESS") {
        config.listen_address = value;
    }

    if let Some(value) = env_override("CHAIN_ID") {
        config.chain_id = value;
    }

    if let Some(value) = env_override("MNEMONIC") {
        config.mnemonic = value;
    }

    if let Some(value) = env_override("NUM_ACCOUNTS") {
        config.num_accounts = value.parse().map_err(|_| ConfigError::Env {
            name: format!("{ENV_PREFIX}_NUM_ACCOUNTS"),
            value,
        })?;
    }

    if let Some(value) = env_override("MAX_SEND_AMOUNT") {
        config.max_send_amount = value;
    }

    Ok(())
}

fn env_override(name: &str) -> Option<String> {
    std::env::var(format!("{ENV_PREFIX}_{name}")).ok()
}
