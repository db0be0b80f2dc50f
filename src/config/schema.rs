//! Configuration schema definitions.
//!
//! All types derive Serde traits for (de)serialization from TOML config
//! files; field names match the on-disk keys.

use serde::{Deserialize, Serialize};

use crate::chain::coins::{CoinError, Coins};

pub const DEFAULT_LISTEN_ADDRESS: &str = "0.0.0.0:8545";
pub const DEFAULT_CHAIN_ID: &str = "dev";
pub const DEFAULT_NUM_ACCOUNTS: u64 = 1;
pub const DEFAULT_MAX_SEND_AMOUNT: &str = "1000000ugnot";

/// Root faucet configuration. Validated once at faucet construction and
/// immutable afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// The `<IP>:<PORT>` address the faucet listens on.
    pub listen_address: String,

    /// The chain ID of the remote chain, committed to by every signature.
    pub chain_id: String,

    /// The BIP-39 mnemonic the faucet keys are derived from.
    pub mnemonic: String,

    /// How many accounts to derive from the mnemonic.
    pub num_accounts: u64,

    /// The maximum amount a single drip may transfer, `<AMOUNT>ugnot` form.
    pub max_send_amount: String,

    /// The associated CORS policy, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cors_config: Option<CorsConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_address: DEFAULT_LISTEN_ADDRESS.to_string(),
            chain_id: DEFAULT_CHAIN_ID.to_string(),
            mnemonic: String::new(),
            num_accounts: DEFAULT_NUM_ACCOUNTS,
            max_send_amount: DEFAULT_MAX_SEND_AMOUNT.to_string(),
            cors_config: None,
        }
    }
}

impl Config {
    /// The max send amount as parsed coins.
    pub fn max_send_coins(&self) -> Result<Coins, CoinError> {
        self.max_send_amount.parse()
    }
}

/// CORS policy for the faucet endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    /// Origins cross-domain requests may come from. The special `*` value
    /// allows any origin.
    pub cors_allowed_origins: Vec<String>,

    /// Non-simple headers clients may use in cross-domain requests.
    pub cors_allowed_headers: Vec<String>,

    /// Methods clients may use in cross-domain requests.
    pub cors_allowed_methods: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            cors_allowed_origins: vec!["*".to_string()],
            cors_allowed_headers: [
                "Origin",
                "Accept",
                "Content-Type",
                "X-Requested-With",
                "X-Server-Time",
            ]
            .map(str::to_string)
            .to_vec(),
            cors_allowed_methods: ["HEAD", "GET", "POST", "OPTIONS"]
                .map(str::to_string)
                .to_vec(),
        }
    }
}
