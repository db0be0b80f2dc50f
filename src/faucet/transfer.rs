//! Fund transfers: funded-account selection and the build → sign →
//! broadcast sequence for a single drip.

use thiserror::Error;

use crate::chain::coins::Coins;
use crate::chain::types::{Account, Address};
use crate::faucet::broadcast::{broadcast_transaction, BroadcastError};
use crate::faucet::prepare::{prepare_transaction, PrepareCfg};
use crate::faucet::sign::{sign_transaction, SignCfg, SignError};
use crate::faucet::FaucetInner;

/// Errors raised while executing a transfer.
#[derive(Debug, Error)]
pub enum TransferError {
    /// No keyring account can cover the transfer and its fee.
    #[error("no funded account found")]
    NoFundedAccount,

    /// The funded account has no key in the keyring. Derivation
    /// guarantees this never fires for keyring-owned addresses.
    #[error("no signing key for account {0}")]
    MissingKey(Address),

    #[error(transparent)]
    Sign(#[from] SignError),

    #[error(transparent)]
    Broadcast(#[from] BroadcastError),
}

impl FaucetInner {
    /// Transfers `amount` to the given address from the first faucet
    /// account able to cover it.
    pub(crate) async fn transfer_funds(
        &self,
        to: Address,
        amount: Coins,
    ) -> Result<(), TransferError> {
        // The funding account pays the gas fee on top of the send amount
        let required = amount.add(&Coins::from(self.estimator.estimate_gas_fee()));

        let account = self.find_funded_account(&required).await?;

        let msg = (self.prepare_tx_msg_fn)(PrepareCfg {
            from_address: account.address,
            to_address: to,
            send_amount: amount,
        });

        let mut tx = prepare_transaction(self.estimator.as_ref(), msg);

        let key = self
            .keyring
            .key(&account.address)
            .ok_or(TransferError::MissingKey(account.address))?;

        sign_transaction(
            &mut tx,
            key,
            &SignCfg {
                chain_id: self.chain_id.clone(),
                account_number: account.account_number,
                sequence: account.sequence,
            },
        )?;

        broadcast_transaction(self.client.as_ref(), &tx).await?;

        Ok(())
    }

    /// Walks the keyring addresses in derivation order and returns the
    /// first account whose balance covers `required`. Fetch failures and
    /// under-funded accounts are logged and skipped.
    async fn find_funded_account(&self, required: &Coins) -> Result<Account, TransferError> {
        for address in self.keyring.addresses() {
            let account = match self.client.get_account(address).await {
                Ok(account) => account,
                Err(err) => {
                    tracing::error!(
                        address = %address,
                        error = %err,
                        "unable to fetch account",
                    );

                    continue;
                }
            };

            if account.coins.is_all_lt(required) {
                tracing::error!(
                    address = %address,
                    balance = %account.coins,
                    required = %required,
                    "account cannot serve requests",
                );

                continue;
            }

            return Ok(account);
        }

        Err(TransferError::NoFundedAccount)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;
    use crate::chain::coins::Coin;
    use crate::chain::types::{BroadcastResult, ChainError, TxResult, ADDRESS_SIZE};
    use crate::faucet::prepare::default_prepare_tx_message;
    use crate::faucet::testutil::{MockClient, MockEstimator, MockKeyring, MockSigner};
    use crate::keyring::KeyringError;

    fn account_with(address: Address, coins: &str) -> Account {
        Account {
            address,
            account_number: 0,
            sequence: 0,
            coins: coins.parse().unwrap(),
        }
    }

    fn inner_with(client: MockClient, keyring: MockKeyring) -> FaucetInner {
        FaucetInner {
            estimator: Arc::new(MockEstimator::default()),
            client: Arc::new(client),
            keyring: Arc::new(keyring),
            chain_id: "dev".to_string(),
            max_send_amount: "1000000ugnot".parse().unwrap(),
            prepare_tx_msg_fn: Arc::new(default_prepare_tx_message),
        }
    }

    #[tokio::test]
    async fn fetch_failures_surface_as_no_funded_account() {
        let client = MockClient {
            get_account_fn: Some(Box::new(|address| {
                Err(ChainError::AccountNotFound(*address))
            })),
            ..Default::default()
        };

        let inner = inner_with(client, MockKeyring::single(Address::default()));

        let result = inner
            .transfer_funds(Address::default(), "1ugnot".parse().unwrap())
            .await;

        assert!(matches!(result, Err(TransferError::NoFundedAccount)));
    }

    #[tokio::test]
    async fn underfunded_accounts_are_skipped() {
        let client = MockClient {
            get_account_fn: Some(Box::new(|address| {
                // Balance below the requested 10ugnot
                Ok(account_with(*address, "5ugnot"))
            })),
            ..Default::default()
        };

        let inner = inner_with(client, MockKeyring::single(Address::default()));

        let result = inner
            .transfer_funds(Address::default(), "10ugnot".parse().unwrap())
            .await;

        assert!(matches!(result, Err(TransferError::NoFundedAccount)));
    }

    #[tokio::test]
    async fn first_funded_account_wins() {
        let addresses: Vec<Address> = (1..=3u8)
            .map(|tag| Address::new([tag; ADDRESS_SIZE]))
            .collect();

        let funded = addresses[2];
        let broadcasts = Arc::new(AtomicUsize::new(0));
        let broadcasts_seen = broadcasts.clone();

        let client = MockClient {
            get_account_fn: Some(Box::new(move |address| {
                if *address == funded {
                    Ok(account_with(*address, "100ugnot"))
                } else {
                    Err(ChainError::AccountNotFound(*address))
                }
            })),
            broadcast_commit_fn: Some(Box::new(move |tx| {
                broadcasts_seen.fetch_add(1, Ordering::SeqCst);
                assert_eq!(tx.signatures.len(), 1);

                Ok(BroadcastResult::default())
            })),
        };

        let keyring = MockKeyring {
            addresses,
            signer: MockSigner { sign_fn: None },
        };

        let inner = inner_with(client, keyring);

        inner
            .transfer_funds(Address::default(), "10ugnot".parse().unwrap())
            .await
            .unwrap();

        assert_eq!(broadcasts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn required_funds_include_the_gas_fee() {
        // Balance exactly covers the send amount but not the fee
        let client = MockClient {
            get_account_fn: Some(Box::new(|address| Ok(account_with(*address, "10ugnot")))),
            ..Default::default()
        };

        let mut inner = inner_with(client, MockKeyring::single(Address::default()));
        inner.estimator = Arc::new(MockEstimator {
            gas_fee: Coin::new("ugnot", 1),
            gas_wanted: 100_000,
        });

        let result = inner
            .transfer_funds(Address::default(), "10ugnot".parse().unwrap())
            .await;

        assert!(matches!(result, Err(TransferError::NoFundedAccount)));
    }

    #[tokio::test]
    async fn signing_failures_propagate() {
        let client = MockClient {
            get_account_fn: Some(Box::new(|address| Ok(account_with(*address, "100ugnot")))),
            ..Default::default()
        };

        let keyring = MockKeyring {
            addresses: vec![Address::default()],
            signer: MockSigner {
                sign_fn: Some(Box::new(|_| {
                    Err(KeyringError::Signing("key unavailable".to_string()))
                })),
            },
        };

        let inner = inner_with(client, keyring);

        let result = inner
            .transfer_funds(Address::default(), "10ugnot".parse().unwrap())
            .await;

        assert!(matches!(result, Err(TransferError::Sign(_))));
    }

    #[tokio::test]
    async fn broadcast_rejections_propagate() {
        let client = MockClient {
            get_account_fn: Some(Box::new(|address| Ok(account_with(*address, "100ugnot")))),
            broadcast_commit_fn: Some(Box::new(|_| {
                Ok(BroadcastResult {
                    check_tx: TxResult {
                        error: Some("bad nonce".to_string()),
                        log: String::new(),
                    },
                    ..Default::default()
                })
            })),
        };

        let inner = inner_with(client, MockKeyring::single(Address::default()));

        let result = inner
            .transfer_funds(Address::default(), "10ugnot".parse().unwrap())
            .await;

        match result {
            Err(TransferError::Broadcast(BroadcastError::CheckTx(err))) => {
                assert_eq!(err, "bad nonce");
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }
}
