//! Gas estimation for prospective transactions.

use crate::chain::coins::Coin;
use crate::chain::types::Tx;

/// Supplies the gas parameters for a prospective transaction.
///
/// Implementations must be callable concurrently without coordination:
/// every in-flight drip consults the estimator.
pub trait Estimator: Send + Sync {
    /// The absolute fee the transaction pays.
    fn estimate_gas_fee(&self) -> Coin;

    /// The gas limit for the given transaction. Invoked after the messages
    /// are attached, so implementations may inspect them.
    fn estimate_gas_wanted(&self, tx: &Tx) -> i64;
}

/// An estimator returning fixed values supplied at construction.
#[derive(Debug, Clone)]
pub struct StaticEstimator {
    gas_fee: Coin,
    gas_wanted: i64,
}

impl StaticEstimator {
    pub fn new(gas_fee: Coin, gas_wanted: i64) -> Self {
        Self {
            gas_fee,
            gas_wanted,
        }
    }
}

impl Estimator for StaticEstimator {
    fn estimate_gas_fee(&self) -> Coin {
        self.gas_fee.clone()
    }

    fn estimate_gas_wanted(&self, _tx: &Tx) -> i64 {
        self.gas_wanted
    }
}
