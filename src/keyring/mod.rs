//! Faucet signing keys.
//!
//! The [`Keyring`] hands out addresses in derivation order and resolves
//! each address back to its signing key. The only shipped implementation
//! is the deterministic in-memory keyring in [`memory`].

pub mod memory;

use thiserror::Error;

use crate::chain::types::{Address, PublicKey};

pub use memory::MemoryKeyring;

/// Errors raised while building or using a keyring.
#[derive(Debug, Error)]
pub enum KeyringError {
    #[error("invalid mnemonic: {0}")]
    InvalidMnemonic(String),

    #[error("key derivation failed: {0}")]
    Derivation(String),

    #[error("signing failed: {0}")]
    Signing(String),
}

/// A private key able to sign transaction sign-bytes.
pub trait TxSigner: Send + Sync {
    /// The compressed public key matching this signer.
    fn public_key(&self) -> PublicKey;

    /// Signs the canonical sign-bytes, returning the raw signature.
    fn sign(&self, sign_bytes: &[u8]) -> Result<Vec<u8>, KeyringError>;
}

/// The faucet keyring: an ordered address list with key lookup.
pub trait Keyring: Send + Sync {
    /// The keyring addresses, in derivation index order.
    fn addresses(&self) -> &[Address];

    /// The signing key for the given address, if the keyring holds it.
    fn key(&self, address: &Address) -> Option<&dyn TxSigner>;
}
