//! Transaction signing.

use serde::Serialize;
use thiserror::Error;

use crate::chain::types::{Fee, Signature, Tx, TxMessage};
use crate::keyring::{KeyringError, TxSigner};

/// Errors raised while signing a transaction.
#[derive(Debug, Error)]
pub enum SignError {
    #[error("unable to encode sign bytes: {0}")]
    Encode(String),

    #[error("unable to sign transaction: {0}")]
    Key(#[from] KeyringError),
}

/// Chain context the signature commits to.
#[derive(Debug, Clone)]
pub struct SignCfg {
    pub chain_id: String,
    pub account_number: u64,
    pub sequence: u64,
}

/// The canonical document the signature is computed over. Field order
/// follows the chain's sign-doc layout; numbers ride as strings.
#[derive(Serialize)]
struct SignDoc<'a> {
    chain_id: &'a str,
    account_number: String,
    sequence: String,
    fee: &'a Fee,
    msgs: &'a [TxMessage],
    memo: &'a str,
}

/// Computes the canonical sign-bytes for the transaction.
pub fn sign_bytes(tx: &Tx, cfg: &SignCfg) -> Result<Vec<u8>, SignError> {
    let doc = SignDoc {
        chain_id: &cfg.chain_id,
        account_number: cfg.account_number.to_string(),
        sequence: cfg.sequence.to_string(),
        fee: &tx.fee,
        msgs: &tx.msgs,
        memo: &tx.memo,
    };

    serde_json::to_vec(&doc).map_err(|e| SignError::Encode(e.to_string()))
}

/// Signs the transaction, appending exactly one `(pubkey, signature)` pair.
///
/// Nothing else on the transaction is touched; on failure the signature
/// list is left unchanged.
pub fn sign_transaction(tx: &mut Tx, key: &dyn TxSigner, cfg: &SignCfg) -> Result<(), SignError> {
    let bytes = sign_bytes(tx, cfg)?;
    let signature = key.sign(&bytes)?;

    tx.signatures.push(Signature {
        pub_key: key.public_key(),
        signature,
    });

    Ok(())
}
