//! Native-currency faucet service for Tendermint2-family chains.
//!
//! The faucet accepts JSON-RPC 2.0 `drip` requests over HTTP, selects a
//! funded account from a mnemonic-derived keyring, builds and signs a
//! bank-send transaction, and broadcasts it to a remote node with a
//! commit send.
//!
//! # Architecture Overview
//!
//! ```text
//!   POST /            ┌──────────────────────────────────────────────┐
//!   ────────────────▶ │ dispatcher: envelope parse → middlewares →   │
//!                     │ drip handler (param + cap admission)         │
//!                     └──────────────────┬───────────────────────────┘
//!                                        ▼
//!                     ┌──────────────────────────────────────────────┐
//!                     │ transfer: funded-account scan (keyring +     │
//!                     │ client) → prepare (estimator) → sign → commit│
//!                     │ broadcast (check / deliver discrimination)   │
//!                     └──────────────────┬───────────────────────────┘
//!                                        ▼
//!                              remote TM2 JSON-RPC node
//! ```
//!
//! Cross-cutting concerns live beside the pipeline: `config` (TOML + env
//! schema, validation), `lifecycle` (shutdown coordination, signals) and
//! the `rpc` envelope types shared by server and client.

// Pipeline subsystems
pub mod chain;
pub mod faucet;
pub mod keyring;
pub mod rpc;

// Cross-cutting concerns
pub mod config;
pub mod lifecycle;

pub use chain::{HttpClient, StaticEstimator};
pub use config::Config;
pub use faucet::{Faucet, FaucetBuilder, FaucetError};
pub use lifecycle::Shutdown;
