//! Transaction preparation.
//!
//! The message put into a faucet transaction is pluggable: the default
//! factory builds a native-currency bank send, while custom factories may
//! build contract calls carrying the drip amount.

use std::sync::Arc;

use crate::chain::coins::Coins;
use crate::chain::estimate::Estimator;
use crate::chain::types::{Address, Fee, MsgSend, Tx, TxMessage};

/// Inputs for constructing the faucet transfer message.
#[derive(Debug, Clone)]
pub struct PrepareCfg {
    /// The faucet account funding the transfer.
    pub from_address: Address,
    /// The beneficiary.
    pub to_address: Address,
    /// The amount to be sent.
    pub send_amount: Coins,
}

/// Constructs the single message carried by a faucet transaction.
pub type PrepareTxMessageFn = Arc<dyn Fn(PrepareCfg) -> TxMessage + Send + Sync>;

/// The default message factory: a plain bank send.
pub fn default_prepare_tx_message(cfg: PrepareCfg) -> TxMessage {
    TxMessage::Send(MsgSend {
        from_address: cfg.from_address,
        to_address: cfg.to_address,
        amount: cfg.send_amount,
    })
}

/// Assembles the unsigned transaction for the given message.
///
/// The fee is attached after the message so the estimator can inspect the
/// transaction contents when sizing the gas limit.
pub fn prepare_transaction(estimator: &dyn Estimator, msg: TxMessage) -> Tx {
    let mut tx = Tx {
        msgs: vec![msg],
        fee: Fee::new(0, estimator.estimate_gas_fee()),
        signatures: Vec::new(),
        memo: String::new(),
    };

    tx.fee.gas_wanted = estimator.estimate_gas_wanted(&tx);

    tx
}
