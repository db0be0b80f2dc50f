//! Transaction broadcasting.

use thiserror::Error;

use crate::chain::client::Client;
use crate::chain::types::{ChainError, Tx};

/// Errors raised while broadcasting, discriminated by the phase at which
/// the chain rejected the transaction.
#[derive(Debug, Error)]
pub enum BroadcastError {
    /// The broadcast never reached a verdict.
    #[error("unable to send transaction: {0}")]
    Send(#[from] ChainError),

    /// Rejected at admission: bad signature, bad nonce, unauthorized.
    #[error("transaction failed initial validation: {0}")]
    CheckTx(String),

    /// Rejected during execution: insufficient funds, handler error.
    #[error("transaction failed during execution: {0}")]
    DeliverTx(String),
}

/// Broadcasts the transaction with a commit send and reports the two
/// rejection phases distinctly, check-phase first.
///
/// NOTE: commit sends are temporary. Once there is support for event
/// indexing, this will change to a sync send followed by an event wait,
/// producing the same discriminated outcome.
pub async fn broadcast_transaction(client: &dyn Client, tx: &Tx) -> Result<(), BroadcastError> {
    let result = client.broadcast_tx_commit(tx).await?;

    if let Some(err) = result.check_tx.error {
        return Err(BroadcastError::CheckTx(err));
    }

    if let Some(err) = result.deliver_tx.error {
        return Err(BroadcastError::DeliverTx(err));
    }

    Ok(())
}
