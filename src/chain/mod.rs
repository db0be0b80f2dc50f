//! Chain integration: currency values, wire types, the remote node client
//! and gas estimation.

pub mod client;
pub mod coins;
pub mod estimate;
pub mod types;

pub use client::{Client, HttpClient};
pub use coins::{Coin, CoinError, Coins};
pub use estimate::{Estimator, StaticEstimator};
pub use types::{
    Account, Address, AddressError, BroadcastResult, ChainError, ChainResult, Fee, MsgCall,
    MsgSend, PublicKey, Signature, Tx, TxMessage, TxResult,
};
