//! Deterministic in-memory keyring.
//!
//! Keys are derived from a BIP-39 mnemonic along the fundraiser HD path
//! `m/44'/<coin>'/0'/0/<index>` over distinct indices, so every replica
//! configured with the same mnemonic serves the same addresses.

use std::collections::HashMap;

use bip32::{DerivationPath, XPrv};
use bip39::{Language, Mnemonic};
use k256::ecdsa::signature::Signer as _;
use k256::ecdsa::{Signature as EcdsaSignature, SigningKey};
use k256::elliptic_curve::sec1::ToEncodedPoint as _;

use crate::chain::types::{Address, PublicKey};
use crate::keyring::{Keyring, KeyringError, TxSigner};

/// The chain's registered BIP-44 coin type.
pub const COIN_TYPE: u32 = 118;

/// A derived secp256k1 account key with its cached public material.
pub struct AccountKey {
    signing_key: SigningKey,
    public_key: PublicKey,
    address: Address,
}

impl AccountKey {
    fn new(signing_key: SigningKey) -> Self {
        let point = signing_key.verifying_key().to_encoded_point(true);
        let public_key = PublicKey::new(point.as_bytes().to_vec());
        let address = public_key.address();

        Self {
            signing_key,
            public_key,
            address,
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }
}

impl TxSigner for AccountKey {
    fn public_key(&self) -> PublicKey {
        self.public_key.clone()
    }

    fn sign(&self, sign_bytes: &[u8]) -> Result<Vec<u8>, KeyringError> {
        let signature: EcdsaSignature = self
            .signing_key
            .try_sign(sign_bytes)
            .map_err(|e| KeyringError::Signing(e.to_string()))?;

        // Chain admission requires the low-S form
        let signature = signature.normalize_s().unwrap_or(signature);

        Ok(signature.to_bytes().to_vec())
    }
}

/// In-memory keyring over mnemonic-derived keys. Built once at startup,
/// never mutated.
pub struct MemoryKeyring {
    addresses: Vec<Address>,
    keys: HashMap<Address, AccountKey>,
}

impl MemoryKeyring {
    /// Derives `num_accounts` keys from the given mnemonic.
    /// Fails if the mnemonic is not BIP-39 valid.
    pub fn new(mnemonic: &str, num_accounts: u64) -> Result<Self, KeyringError> {
        let mnemonic = Mnemonic::parse_in(Language::English, mnemonic)
            .map_err(|e| KeyringError::InvalidMnemonic(e.to_string()))?;

        let seed = mnemonic.to_seed("");

        let mut addresses = Vec::with_capacity(num_accounts as usize);
        let mut keys = HashMap::with_capacity(num_accounts as usize);

        for index in 0..num_accounts as u32 {
            let key = derive_account_key(&seed, index)?;
            let address = key.address();

            addresses.push(address);
            keys.insert(address, key);
        }

        Ok(Self {
            addresses,
            keys,
        })
    }
}

impl Keyring for MemoryKeyring {
    fn addresses(&self) -> &[Address] {
        &self.addresses
    }

    fn key(&self, address: &Address) -> Option<&dyn TxSigner> {
        self.keys.get(address).map(|key| key as &dyn TxSigner)
    }
}

/// Derives the account key at the fundraiser path for the given index.
fn derive_account_key(seed: &[u8], index: u32) -> Result<AccountKey, KeyringError> {
    let path: DerivationPath = format!("m/44'/{COIN_TYPE}'/0'/0/{index}")
        .parse()
        .map_err(|e: bip32::Error| KeyringError::Derivation(e.to_string()))?;

    let extended = XPrv::derive_from_path(seed, &path)
        .map_err(|e| KeyringError::Derivation(e.to_string()))?;

    Ok(AccountKey::new(extended.private_key().clone()))
}
