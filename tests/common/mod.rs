//! Shared harness for pipeline tests: delegate-closure doubles over the
//! public client/estimator seams, plus helpers for driving the router
//! in-process.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request as HttpRequest};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use gno_faucet::chain::{
    Account, Address, BroadcastResult, ChainError, ChainResult, Client, Coin, Coins, Estimator,
    Tx, TxResult,
};
use gno_faucet::config::Config;
use gno_faucet::Faucet;

pub const TEST_MNEMONIC: &str =
    "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

type GetAccountFn = Box<dyn Fn(&Address) -> ChainResult<Account> + Send + Sync>;

/// A chain client with scripted account balances, counting broadcasts and
/// capturing every broadcast transaction.
pub struct ScriptedClient {
    pub get_account_fn: GetAccountFn,
    pub broadcasts: Arc<AtomicUsize>,
    pub sent: Arc<Mutex<Vec<Tx>>>,
}

impl ScriptedClient {
    /// A client where every keyring account holds the given balance.
    pub fn with_balance(balance: &str) -> Self {
        let coins: Coins = balance.parse().unwrap();

        Self {
            get_account_fn: Box::new(move |address| {
                Ok(Account {
                    address: *address,
                    account_number: 0,
                    sequence: 0,
                    coins: coins.clone(),
                })
            }),
            broadcasts: Arc::new(AtomicUsize::new(0)),
            sent: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// A client where every account fetch fails.
    pub fn unreachable() -> Self {
        Self {
            get_account_fn: Box::new(|address| Err(ChainError::AccountNotFound(*address))),
            broadcasts: Arc::new(AtomicUsize::new(0)),
            sent: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Handles observing the broadcast count and payloads after the
    /// client itself has been moved into the faucet.
    pub fn observers(&self) -> (Arc<AtomicUsize>, Arc<Mutex<Vec<Tx>>>) {
        (self.broadcasts.clone(), self.sent.clone())
    }
}

#[async_trait]
impl Client for ScriptedClient {
    async fn get_account(&self, address: &Address) -> ChainResult<Account> {
        (self.get_account_fn)(address)
    }

    async fn broadcast_tx_commit(&self, tx: &Tx) -> ChainResult<BroadcastResult> {
        self.broadcasts.fetch_add(1, Ordering::SeqCst);
        self.sent.lock().unwrap().push(tx.clone());

        Ok(BroadcastResult::default())
    }

    async fn broadcast_tx_sync(&self, _tx: &Tx) -> ChainResult<TxResult> {
        Ok(TxResult::default())
    }

    async fn ping(&self) -> ChainResult<()> {
        Ok(())
    }
}

/// A static estimator for tests.
pub struct TestEstimator {
    pub gas_fee: Coin,
}

impl Estimator for TestEstimator {
    fn estimate_gas_fee(&self) -> Coin {
        self.gas_fee.clone()
    }

    fn estimate_gas_wanted(&self, _tx: &Tx) -> i64 {
        100_000
    }
}

/// Builds a single-account faucet router around the given client, with
/// `max_send_amount = 1000000ugnot` and a 1ugnot gas fee.
pub fn test_router(client: ScriptedClient) -> Router {
    let faucet = Faucet::builder(
        TestEstimator {
            gas_fee: Coin::new("ugnot", 1),
        },
        client,
    )
    .with_config(Config {
        mnemonic: TEST_MNEMONIC.to_string(),
        ..Config::default()
    })
    .build()
    .unwrap();

    faucet.router()
}

/// POSTs a JSON-RPC payload at `/` and returns `(status, body)`.
pub async fn post_rpc(router: Router, payload: &str) -> (u16, serde_json::Value) {
    post_rpc_at(router, "/", payload).await
}

/// POSTs a JSON-RPC payload at the given path and returns `(status, body)`.
pub async fn post_rpc_at(router: Router, path: &str, payload: &str) -> (u16, serde_json::Value) {
    let request = HttpRequest::builder()
        .method("POST")
        .uri(path)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(payload.to_string()))
        .unwrap();

    let response = router.oneshot(request).await.unwrap();
    let status = response.status().as_u16();
    let body = response.into_body().collect().await.unwrap().to_bytes();

    let value = serde_json::from_slice(&body)
        .unwrap_or_else(|_| serde_json::Value::String(String::from_utf8_lossy(&body).to_string()));

    (status, value)
}

/// A deterministic beneficiary address in bech32 form.
pub fn beneficiary() -> String {
    Address::new([0x42; 20]).to_string()
}
