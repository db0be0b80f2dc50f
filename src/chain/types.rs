//! Chain-level types: addresses, keys, transactions and error definitions.
//!
//! Wire shapes follow the TM2 canonical JSON forms: numbers ride as strings,
//! binary fields as base64, addresses in bech32.

use std::fmt;
use std::str::FromStr;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use bech32::{Bech32, Hrp};
use ripemd::Ripemd160;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::chain::coins::{Coin, Coins};

/// Human-readable part of the chain's bech32 addresses.
const ADDRESS_HRP: Hrp = Hrp::parse_unchecked("g");

/// Raw address width, a 160-bit account identifier.
pub const ADDRESS_SIZE: usize = 20;

/// Errors raised while decoding a bech32 address.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    #[error("invalid bech32 encoding: {0}")]
    Encoding(String),

    #[error("invalid address prefix {0:?}")]
    Prefix(String),

    #[error("invalid address length {0}")]
    Length(usize),
}

/// A 20-byte account identifier, displayed in bech32 (`g1...`) form.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Address([u8; ADDRESS_SIZE]);

impl Address {
    pub fn new(bytes: [u8; ADDRESS_SIZE]) -> Self {
        Self(bytes)
    }

    /// Derives the address of a compressed secp256k1 public key,
    /// `RIPEMD160(SHA256(pubkey))`.
    pub fn from_public_key(key: &PublicKey) -> Self {
        let sha = Sha256::digest(key.as_bytes());
        let ripe = Ripemd160::digest(sha);

        let mut bytes = [0u8; ADDRESS_SIZE];
        bytes.copy_from_slice(&ripe);

        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; ADDRESS_SIZE] {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let encoded = bech32::encode::<Bech32>(ADDRESS_HRP, &self.0).map_err(|_| fmt::Error)?;

        f.write_str(&encoded)
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (hrp, data) = bech32::decode(s).map_err(|e| AddressError::Encoding(e.to_string()))?;

        if hrp != ADDRESS_HRP {
            return Err(AddressError::Prefix(hrp.to_string()));
        }

        let bytes: [u8; ADDRESS_SIZE] = data
            .as_slice()
            .try_into()
            .map_err(|_| AddressError::Length(data.len()))?;

        Ok(Self(bytes))
    }
}

impl Serialize for Address {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;

        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// A compressed secp256k1 public key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKey(Vec<u8>);

impl PublicKey {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn address(&self) -> Address {
        Address::from_public_key(self)
    }
}

impl Serialize for PublicKey {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Wire<'a> {
            #[serde(rename = "@type")]
            type_url: &'a str,
            value: String,
        }

        Wire {
            type_url: "/tm.PubKeySecp256k1",
            value: BASE64.encode(&self.0),
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for PublicKey {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct Wire {
            value: String,
        }

        let wire = Wire::deserialize(deserializer)?;
        let bytes = BASE64
            .decode(wire.value)
            .map_err(serde::de::Error::custom)?;

        Ok(Self(bytes))
    }
}

/// A single `(pubkey, signature)` pair appended to a signed transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signature {
    pub pub_key: PublicKey,
    #[serde(with = "base64_bytes")]
    pub signature: Vec<u8>,
}

/// Transaction fee: a gas limit and an absolute gas fee.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fee {
    #[serde(with = "string_i64")]
    pub gas_wanted: i64,
    #[serde(with = "coin_string")]
    pub gas_fee: Coin,
}

impl Fee {
    pub fn new(gas_wanted: i64, gas_fee: Coin) -> Self {
        Self {
            gas_wanted,
            gas_fee,
        }
    }
}

/// Native currency transfer message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MsgSend {
    pub from_address: Address,
    pub to_address: Address,
    pub amount: Coins,
}

/// Contract call message, optionally carrying coins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MsgCall {
    pub caller: Address,
    pub send: Coins,
    pub pkg_path: String,
    pub func: String,
    pub args: Vec<String>,
}

/// The message kinds a faucet transaction may carry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "@type")]
pub enum TxMessage {
    #[serde(rename = "/bank.MsgSend")]
    Send(MsgSend),

    #[serde(rename = "/vm.m_call")]
    Call(MsgCall),
}

/// A chain transaction: unsigned while `signatures` is empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tx {
    #[serde(rename = "msg")]
    pub msgs: Vec<TxMessage>,
    pub fee: Fee,
    pub signatures: Vec<Signature>,
    pub memo: String,
}

/// Read-only snapshot of an on-chain account, fetched per transfer.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Account {
    pub address: Address,
    #[serde(with = "string_u64")]
    pub account_number: u64,
    #[serde(with = "string_u64")]
    pub sequence: u64,
    #[serde(default)]
    pub coins: Coins,
}

/// Outcome of a single broadcast phase (check or deliver).
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TxResult {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub log: String,
}

impl TxResult {
    pub fn is_err(&self) -> bool {
        self.error.is_some()
    }
}

/// Result of a commit broadcast: the admission and execution phases,
/// either of which may carry an error.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct BroadcastResult {
    pub check_tx: TxResult,
    pub deliver_tx: TxResult,
    #[serde(default)]
    pub hash: String,
}

/// Errors raised by chain client operations.
#[derive(Debug, Error)]
pub enum ChainError {
    /// Transport-level failure reaching the remote node.
    #[error("RPC transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The remote node answered with a JSON-RPC error.
    #[error("RPC error: {0}")]
    Rpc(String),

    /// The queried account has not been initialized on chain.
    #[error("account {0} does not exist on chain")]
    AccountNotFound(Address),

    /// The remote answered with a payload the client cannot decode.
    #[error("unable to decode chain response: {0}")]
    Decode(String),

    /// The configured remote URL is not usable.
    #[error("invalid remote URL {0:?}")]
    InvalidRemote(String),
}

pub type ChainResult<T> = Result<T, ChainError>;

mod base64_bytes {
    use base64::Engine as _;
    use serde::{Deserialize, Deserializer, Serializer};

    use super::BASE64;

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&BASE64.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let raw = String::deserialize(deserializer)?;

        BASE64.decode(raw).map_err(serde::de::Error::custom)
    }
}

mod string_u64 {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &u64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(value)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
        let raw = String::deserialize(deserializer)?;

        raw.parse().map_err(serde::de::Error::custom)
    }
}

mod string_i64 {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &i64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(value)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
        let raw = String::deserialize(deserializer)?;

        raw.parse().map_err(serde::de::Error::custom)
    }
}

mod coin_string {
    use super::Coin;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(coin: &Coin, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(coin)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Coin, D::Error> {
        let raw = String::deserialize(deserializer)?;

        raw.parse().map_err(serde::de::Error::custom)
    }
}
