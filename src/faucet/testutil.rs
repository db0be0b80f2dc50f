//! Delegate-closure test doubles for the drip pipeline.

use async_trait::async_trait;

use crate::chain::client::Client;
use crate::chain::coins::Coin;
use crate::chain::estimate::Estimator;
use crate::chain::types::{
    Account, Address, BroadcastResult, ChainError, ChainResult, PublicKey, Tx, TxResult,
};
use crate::keyring::{Keyring, KeyringError, TxSigner};

type GetAccountFn = Box<dyn Fn(&Address) -> ChainResult<Account> + Send + Sync>;
type BroadcastCommitFn = Box<dyn Fn(&Tx) -> ChainResult<BroadcastResult> + Send + Sync>;

/// A chain client driven by per-call delegates.
#[derive(Default)]
pub struct MockClient {
    pub get_account_fn: Option<GetAccountFn>,
    pub broadcast_commit_fn: Option<BroadcastCommitFn>,
}

#[async_trait]
impl Client for MockClient {
    async fn get_account(&self, address: &Address) -> ChainResult<Account> {
        match &self.get_account_fn {
            Some(delegate) => delegate(address),
            None => Err(ChainError::AccountNotFound(*address)),
        }
    }

    async fn broadcast_tx_commit(&self, tx: &Tx) -> ChainResult<BroadcastResult> {
        match &self.broadcast_commit_fn {
            Some(delegate) => delegate(tx),
            None => Ok(BroadcastResult::default()),
        }
    }

    async fn broadcast_tx_sync(&self, _tx: &Tx) -> ChainResult<TxResult> {
        Ok(TxResult::default())
    }

    async fn ping(&self) -> ChainResult<()> {
        Ok(())
    }
}

/// An estimator with fixed delegate-controlled values.
pub struct MockEstimator {
    pub gas_fee: Coin,
    pub gas_wanted: i64,
}

impl Default for MockEstimator {
    fn default() -> Self {
        Self {
            gas_fee: Coin::new("ugnot", 0),
            gas_wanted: 100_000,
        }
    }
}

impl Estimator for MockEstimator {
    fn estimate_gas_fee(&self) -> Coin {
        self.gas_fee.clone()
    }

    fn estimate_gas_wanted(&self, _tx: &Tx) -> i64 {
        self.gas_wanted
    }
}

type SignFn = Box<dyn Fn(&[u8]) -> Result<Vec<u8>, KeyringError> + Send + Sync>;

/// A signer driven by a delegate.
pub struct MockSigner {
    pub sign_fn: Option<SignFn>,
}

impl TxSigner for MockSigner {
    fn public_key(&self) -> PublicKey {
        PublicKey::new(vec![0x02; 33])
    }

    fn sign(&self, sign_bytes: &[u8]) -> Result<Vec<u8>, KeyringError> {
        match &self.sign_fn {
            Some(delegate) => delegate(sign_bytes),
            None => Ok(sign_bytes.to_vec()),
        }
    }
}

/// A keyring over a fixed address list with one shared signer.
pub struct MockKeyring {
    pub addresses: Vec<Address>,
    pub signer: MockSigner,
}

impl MockKeyring {
    pub fn single(address: Address) -> Self {
        Self {
            addresses: vec![address],
            signer: MockSigner { sign_fn: None },
        }
    }
}

impl Keyring for MockKeyring {
    fn addresses(&self) -> &[Address] {
        &self.addresses
    }

    fn key(&self, address: &Address) -> Option<&dyn TxSigner> {
        self.addresses
            .contains(address)
            .then_some(&self.signer as &dyn TxSigner)
    }
}
