//! Faucet configuration: schema, disk/env loading and validation.

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{apply_env_overrides, read_config, ConfigError, ValidationErrors, ENV_PREFIX};
pub use schema::{Config, CorsConfig};
pub use validation::{validate_config, ValidationError};
