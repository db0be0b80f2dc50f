//! Configuration validation logic.

use std::net::SocketAddr;

use bip39::{Language, Mnemonic};

use crate::config::schema::Config;

/// A single configuration validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError(pub String);

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "validation error: {}", self.0)
    }
}

/// Validates a [`Config`] for semantic correctness, collecting every
/// failure instead of stopping at the first.
pub fn validate_config(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listen_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError(format!(
            "listen_address {:?} is not a valid <IP>:<PORT> address",
            config.listen_address,
        )));
    }

    if config.chain_id.is_empty() {
        errors.push(ValidationError("chain_id must not be empty".to_string()));
    }

    if Mnemonic::parse_in(Language::English, &config.mnemonic).is_err() {
        errors.push(ValidationError(
            "mnemonic is not a valid BIP-39 phrase".to_string(),
        ));
    }

    if config.num_accounts == 0 {
        errors.push(ValidationError("num_accounts must be at least 1".to_string()));
    }

    if let Err(err) = config.max_send_coins() {
        errors.push(ValidationError(format!(
            "max_send_amount {:?} is not a valid coin amount: {err}",
            config.max_send_amount,
        )));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
