//! The faucet service.
//!
//! A [`Faucet`] owns the full drip pipeline: the JSON-RPC dispatcher, the
//! funded-account selector, transaction preparation, signing and the
//! commit broadcast. It is assembled from an [`Estimator`], a [`Client`]
//! and a validated [`Config`], and served over HTTP until shut down.

pub mod broadcast;
pub mod handler;
pub mod prepare;
pub mod sign;
pub mod transfer;

#[cfg(test)]
pub(crate) mod testutil;

use std::sync::Arc;
use std::time::Duration;

use axum::http::{HeaderName, HeaderValue, Method, StatusCode};
use axum::routing::get;
use axum::Router;
use thiserror::Error;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::chain::client::Client;
use crate::chain::coins::Coins;
use crate::chain::estimate::Estimator;
use crate::config::schema::{Config, CorsConfig};
use crate::config::validation::{validate_config, ValidationError};
use crate::config::{ConfigError, ValidationErrors};
use crate::faucet::handler::{
    chain_middlewares, drip_handler, rpc_route, RpcEndpoint, RpcMiddleware,
};
use crate::faucet::prepare::{default_prepare_tx_message, PrepareTxMessageFn};
use crate::keyring::memory::MemoryKeyring;
use crate::keyring::{Keyring, KeyringError};
use crate::lifecycle::Shutdown;

/// The JSON-RPC method served on the default endpoint.
pub const DRIP_METHOD: &str = "drip";

/// The result string of a successful drip.
pub const FAUCET_SUCCESS: &str = "successfully executed faucet transfer";

/// How long in-flight requests get to finish once shutdown is triggered.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors raised while building or serving the faucet.
#[derive(Debug, Error)]
pub enum FaucetError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Keyring(#[from] KeyringError),

    #[error("unable to bind listener: {0}")]
    Bind(std::io::Error),

    #[error("server error: {0}")]
    Serve(std::io::Error),

    #[error("in-flight requests did not drain before the shutdown deadline")]
    DrainTimeout,
}

/// Shared, read-only pipeline state. Everything here is constructed once
/// and only read afterwards, so concurrent drips need no coordination.
pub(crate) struct FaucetInner {
    pub(crate) estimator: Arc<dyn Estimator>,
    pub(crate) client: Arc<dyn Client>,
    pub(crate) keyring: Arc<dyn Keyring>,
    pub(crate) chain_id: String,
    pub(crate) max_send_amount: Coins,
    pub(crate) prepare_tx_msg_fn: PrepareTxMessageFn,
}

/// The assembled faucet server.
pub struct Faucet {
    config: Config,
    router: Router,
}

impl Faucet {
    /// Starts assembling a faucet around the given estimator and client.
    pub fn builder(
        estimator: impl Estimator + 'static,
        client: impl Client + 'static,
    ) -> FaucetBuilder {
        FaucetBuilder {
            estimator: Arc::new(estimator),
            client: Arc::new(client),
            config: Config::default(),
            middlewares: Vec::new(),
            endpoints: Vec::new(),
            prepare_tx_msg_fn: Arc::new(default_prepare_tx_message),
        }
    }

    /// The faucet's router, for embedding into a larger application or
    /// driving requests through it in-process.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Serves the faucet until the shutdown signal fires, then drains
    /// in-flight requests for up to 30 seconds. [BLOCKING]
    pub async fn serve(self, shutdown: Shutdown) -> Result<(), FaucetError> {
        let listener = TcpListener::bind(&self.config.listen_address)
            .await
            .map_err(FaucetError::Bind)?;
        let address = listener.local_addr().map_err(FaucetError::Bind)?;

        tracing::info!(address = %address, "faucet started");

        let mut drain_rx = shutdown.subscribe();
        let mut stop_rx = shutdown.subscribe();

        let server = axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(async move {
                let _ = drain_rx.recv().await;
            });

        let mut serving = tokio::spawn(async move { server.await });

        tokio::select! {
            // Accept-loop failure before any shutdown was requested
            result = &mut serving => return flatten_serve(result),
            _ = stop_rx.recv() => {}
        }

        tracing::info!("faucet draining in-flight requests");

        match tokio::time::timeout(DRAIN_TIMEOUT, &mut serving).await {
            Ok(result) => {
                tracing::info!("faucet shut down");

                flatten_serve(result)
            }
            Err(_) => {
                serving.abort();

                Err(FaucetError::DrainTimeout)
            }
        }
    }
}

fn flatten_serve(
    result: Result<std::io::Result<()>, tokio::task::JoinError>,
) -> Result<(), FaucetError> {
    match result {
        Ok(Ok(())) => Ok(()),
        Ok(Err(err)) => Err(FaucetError::Serve(err)),
        Err(err) => Err(FaucetError::Serve(std::io::Error::other(err))),
    }
}

/// Step-by-step faucet assembly.
pub struct FaucetBuilder {
    estimator: Arc<dyn Estimator>,
    client: Arc<dyn Client>,
    config: Config,
    middlewares: Vec<RpcMiddleware>,
    endpoints: Vec<RpcEndpoint>,
    prepare_tx_msg_fn: PrepareTxMessageFn,
}

impl FaucetBuilder {
    /// Replaces the default configuration.
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Appends JSON-RPC request middlewares. The first appended middleware
    /// runs outermost.
    pub fn with_middlewares(mut self, middlewares: Vec<RpcMiddleware>) -> Self {
        self.middlewares.extend(middlewares);
        self
    }

    /// Mounts additional JSON-RPC endpoints beside the default drip
    /// endpoint. Each runs behind the same middleware chain.
    pub fn with_handlers(mut self, endpoints: Vec<RpcEndpoint>) -> Self {
        self.endpoints.extend(endpoints);
        self
    }

    /// Replaces the transaction message factory.
    pub fn with_prepare_tx_message_fn(mut self, prepare_fn: PrepareTxMessageFn) -> Self {
        self.prepare_tx_msg_fn = prepare_fn;
        self
    }

    /// Validates the configuration, derives the keyring and assembles the
    /// HTTP router.
    pub fn build(self) -> Result<Faucet, FaucetError> {
        validate_config(&self.config)
            .map_err(|errors| ConfigError::Validation(ValidationErrors(errors)))?;

        let max_send_amount = self.config.max_send_coins().map_err(|err| {
            ConfigError::Validation(ValidationErrors(vec![ValidationError(err.to_string())]))
        })?;

        let keyring = MemoryKeyring::new(&self.config.mnemonic, self.config.num_accounts)?;

        let inner = Arc::new(FaucetInner {
            estimator: self.estimator,
            client: self.client,
            keyring: Arc::new(keyring),
            chain_id: self.config.chain_id.clone(),
            max_send_amount,
            prepare_tx_msg_fn: self.prepare_tx_msg_fn,
        });

        let mut router = Router::new().route(
            "/",
            rpc_route(chain_middlewares(
                &self.middlewares,
                drip_handler(inner.clone()),
            )),
        );

        for endpoint in self.endpoints {
            router = router.route(
                &endpoint.path,
                rpc_route(chain_middlewares(&self.middlewares, endpoint.handler)),
            );
        }

        router = router.route("/healthcheck", get(|| async { StatusCode::OK }));

        if let Some(cors) = &self.config.cors_config {
            router = router.layer(cors_layer(cors));
        }

        Ok(Faucet {
            config: self.config,
            router,
        })
    }
}

fn cors_layer(cfg: &CorsConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = cfg
        .cors_allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    let methods: Vec<Method> = cfg
        .cors_allowed_methods
        .iter()
        .filter_map(|method| method.parse().ok())
        .collect();

    let headers: Vec<HeaderName> = cfg
        .cors_allowed_headers
        .iter()
        .filter_map(|header| header.parse().ok())
        .collect();

    let layer = if cfg.cors_allowed_origins.iter().any(|origin| origin == "*") {
        CorsLayer::new().allow_origin(Any)
    } else {
        CorsLayer::new().allow_origin(AllowOrigin::list(origins))
    };

    layer.allow_methods(methods).allow_headers(headers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::faucet::testutil::{MockClient, MockEstimator};

    const TEST_MNEMONIC: &str =
        "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

    #[test]
    fn build_rejects_invalid_configuration() {
        let result = Faucet::builder(MockEstimator::default(), MockClient::default())
            .with_config(Config {
                mnemonic: "not a mnemonic".to_string(),
                ..Config::default()
            })
            .build();

        assert!(matches!(result, Err(FaucetError::Config(_))));
    }

    #[test]
    fn build_accepts_the_default_configuration_with_a_mnemonic() {
        let result = Faucet::builder(MockEstimator::default(), MockClient::default())
            .with_config(Config {
                mnemonic: TEST_MNEMONIC.to_string(),
                ..Config::default()
            })
            .build();

        assert!(result.is_ok());
    }
}
