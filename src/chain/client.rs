//! TM2 chain client.
//!
//! [`Client`] is the seam the drip pipeline suspends on: account lookups and
//! transaction broadcasts. [`HttpClient`] implements it over the remote
//! node's JSON-RPC endpoint.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::chain::types::{
    Account, Address, BroadcastResult, ChainError, ChainResult, Tx, TxResult,
};

/// Chain operations consumed by the faucet. All methods may block on
/// network I/O; implementations must be safe for concurrent use.
#[async_trait]
pub trait Client: Send + Sync {
    /// Fetches the account if it has been initialized on chain.
    async fn get_account(&self, address: &Address) -> ChainResult<Account>;

    /// Broadcasts the transaction and waits for it to be committed,
    /// returning both the check-phase and deliver-phase outcomes.
    async fn broadcast_tx_commit(&self, tx: &Tx) -> ChainResult<BroadcastResult>;

    /// Broadcasts the transaction without waiting for commitment,
    /// returning the check-phase outcome only.
    async fn broadcast_tx_sync(&self, tx: &Tx) -> ChainResult<TxResult>;

    /// Cheapest liveness probe the remote supports.
    async fn ping(&self) -> ChainResult<()>;
}

/// JSON-RPC client for a remote TM2 node.
#[derive(Debug, Clone)]
pub struct HttpClient {
    http: reqwest::Client,
    remote: reqwest::Url,
}

impl HttpClient {
    /// Creates a client for the given remote URL. The URL must be
    /// `http` or `https`.
    pub fn new(remote: &str) -> ChainResult<Self> {
        let url: reqwest::Url = remote
            .parse()
            .map_err(|_| ChainError::InvalidRemote(remote.to_string()))?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(ChainError::InvalidRemote(remote.to_string()));
        }

        Ok(Self {
            http: reqwest::Client::new(),
            remote: url,
        })
    }

    async fn call<P: Serialize, R: DeserializeOwned>(
        &self,
        method: &str,
        params: P,
    ) -> ChainResult<R> {
        #[derive(Serialize)]
        struct RpcRequest<'a, P> {
            jsonrpc: &'static str,
            id: u64,
            method: &'a str,
            params: P,
        }

        #[derive(Deserialize)]
        struct RpcResponse<R> {
            result: Option<R>,
            error: Option<RpcErrorBody>,
        }

        #[derive(Deserialize)]
        struct RpcErrorBody {
            code: i64,
            message: String,
        }

        let response = self
            .http
            .post(self.remote.clone())
            .json(&RpcRequest {
                jsonrpc: "2.0",
                id: 1,
                method,
                params,
            })
            .send()
            .await?
            .error_for_status()?;

        let body: RpcResponse<R> = response.json().await?;

        if let Some(err) = body.error {
            return Err(ChainError::Rpc(format!("{} ({})", err.message, err.code)));
        }

        body.result
            .ok_or_else(|| ChainError::Decode("missing result field".to_string()))
    }
}

#[async_trait]
impl Client for HttpClient {
    async fn get_account(&self, address: &Address) -> ChainResult<Account> {
        #[derive(Serialize)]
        struct QueryParams {
            path: String,
            data: String,
        }

        let result: AbciQueryResult = self
            .call(
                "abci_query",
                QueryParams {
                    path: format!("auth/accounts/{address}"),
                    data: String::new(),
                },
            )
            .await?;

        let base = result.response.base;
        if let Some(error) = base.error {
            return Err(ChainError::Rpc(stringify_abci_error(&error)));
        }

        let data = match base.data {
            Some(data) if !data.is_empty() => data,
            _ => return Err(ChainError::AccountNotFound(*address)),
        };

        let raw = BASE64
            .decode(data)
            .map_err(|e| ChainError::Decode(e.to_string()))?;

        #[derive(Deserialize)]
        struct QueryData {
            #[serde(rename = "BaseAccount")]
            base_account: Account,
        }

        let decoded: QueryData =
            serde_json::from_slice(&raw).map_err(|e| ChainError::Decode(e.to_string()))?;

        Ok(decoded.base_account)
    }

    async fn broadcast_tx_commit(&self, tx: &Tx) -> ChainResult<BroadcastResult> {
        let result: BroadcastCommitResult = self
            .call("broadcast_tx_commit", BroadcastParams { tx: encode_tx(tx)? })
            .await?;

        Ok(BroadcastResult {
            check_tx: result.check_tx.into_tx_result(),
            deliver_tx: result.deliver_tx.into_tx_result(),
            hash: result.hash.unwrap_or_default(),
        })
    }

    async fn broadcast_tx_sync(&self, tx: &Tx) -> ChainResult<TxResult> {
        let result: AbciTxResponse = self
            .call("broadcast_tx_sync", BroadcastParams { tx: encode_tx(tx)? })
            .await?;

        Ok(result.into_tx_result())
    }

    async fn ping(&self) -> ChainResult<()> {
        let _: Value = self.call("status", Vec::<String>::new()).await?;

        Ok(())
    }
}

/// Encodes the signed transaction for broadcast. This is the wire codec
/// boundary: the canonical JSON form rides base64-encoded, and swapping in
/// a different codec touches only this function.
fn encode_tx(tx: &Tx) -> ChainResult<String> {
    let raw = serde_json::to_vec(tx).map_err(|e| ChainError::Decode(e.to_string()))?;

    Ok(BASE64.encode(raw))
}

#[derive(Serialize)]
struct BroadcastParams {
    tx: String,
}

#[derive(Deserialize)]
struct AbciQueryResult {
    response: AbciTxResponse,
}

#[derive(Deserialize)]
struct AbciTxResponse {
    #[serde(rename = "ResponseBase")]
    base: AbciResponseBase,
}

#[derive(Deserialize)]
struct AbciResponseBase {
    #[serde(rename = "Error")]
    error: Option<Value>,
    #[serde(rename = "Data")]
    data: Option<String>,
    #[serde(rename = "Log", default)]
    log: String,
}

#[derive(Deserialize)]
struct BroadcastCommitResult {
    check_tx: AbciTxResponse,
    deliver_tx: AbciTxResponse,
    hash: Option<String>,
}

impl AbciTxResponse {
    fn into_tx_result(self) -> TxResult {
        TxResult {
            error: self.base.error.as_ref().map(stringify_abci_error),
            log: self.base.log,
        }
    }
}

/// TM2 reports ABCI errors as typed objects; collapse them to a
/// human-readable string, preferring the bare string form when present.
fn stringify_abci_error(error: &Value) -> String {
    match error {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
