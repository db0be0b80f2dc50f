//! JSON-RPC dispatch: body parsing, the per-request middleware chain and
//! the drip handler itself.

use std::sync::Arc;

use axum::body::Bytes;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response as HttpResponse};
use axum::routing::MethodRouter;
use futures::future::BoxFuture;
use serde_json::{json, Value};
use thiserror::Error;

use crate::chain::coins::{Coins, UGNOT_DENOM};
use crate::chain::types::Address;
use crate::faucet::{FaucetInner, DRIP_METHOD, FAUCET_SUCCESS};
use crate::rpc::{codes, parse_requests, Request, Response, RpcError};

/// A terminal JSON-RPC request handler.
pub type RpcHandler = Arc<dyn Fn(Request) -> BoxFuture<'static, Response> + Send + Sync>;

/// A middleware wrapping an [`RpcHandler`]. Middlewares may short-circuit
/// by returning a response without invoking the wrapped handler.
pub type RpcMiddleware = Arc<dyn Fn(RpcHandler) -> RpcHandler + Send + Sync>;

/// An extra JSON-RPC endpoint mounted beside the default drip endpoint.
pub struct RpcEndpoint {
    pub path: String,
    pub handler: RpcHandler,
}

/// Composes the middleware chain around a terminal handler. The
/// first-declared middleware runs outermost.
pub fn chain_middlewares(middlewares: &[RpcMiddleware], terminal: RpcHandler) -> RpcHandler {
    middlewares
        .iter()
        .rev()
        .fold(terminal, |next, middleware| middleware(next))
}

/// Builds the HTTP route for a composed JSON-RPC handler chain.
pub(crate) fn rpc_route(chain: RpcHandler) -> MethodRouter {
    axum::routing::post(move |body: Bytes| {
        let chain = chain.clone();

        async move { dispatch(chain, &body).await }
    })
}

/// Runs one HTTP body through the pipeline: parse, validate, execute each
/// request in order, and mirror the input shape in the output.
async fn dispatch(chain: RpcHandler, body: &[u8]) -> HttpResponse {
    let parsed = match parse_requests(body) {
        Ok(parsed) => parsed,
        Err(err) => {
            // The caller did not send a JSON-RPC envelope, so none is returned
            return (StatusCode::BAD_REQUEST, format!("unable to read request: {err}"))
                .into_response();
        }
    };

    let mut responses = Vec::with_capacity(parsed.requests.len());

    for request in parsed.requests {
        if !request.is_valid() {
            responses.push(Response::error(
                request.id,
                RpcError::new(codes::INVALID_REQUEST, "invalid JSON-RPC 2.0 request"),
            ));

            continue;
        }

        responses.push(chain(request).await);
    }

    let payload = if parsed.batch {
        json!(responses)
    } else {
        json!(responses[0])
    };

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/json")],
        payload.to_string(),
    )
        .into_response()
}

/// Builds the terminal drip handler over the shared faucet state.
pub(crate) fn drip_handler(faucet: Arc<FaucetInner>) -> RpcHandler {
    Arc::new(move |request: Request| {
        let faucet = faucet.clone();

        Box::pin(async move { faucet.handle_drip(request).await })
    })
}

/// A parsed drip request.
#[derive(Debug, Clone, PartialEq)]
struct DripRequest {
    to: Address,
    amount: Coins,
}

/// Errors raised while extracting drip params.
#[derive(Debug, Error)]
enum DripParamError {
    #[error("invalid beneficiary address")]
    MissingBeneficiary,

    #[error("invalid beneficiary address: {0}")]
    InvalidBeneficiary(String),

    #[error("invalid send amount")]
    InvalidSendAmount,
}

impl FaucetInner {
    async fn handle_drip(&self, request: Request) -> Response {
        // The default endpoint serves a single method
        if request.method != DRIP_METHOD {
            return Response::error(
                request.id,
                RpcError::new(codes::METHOD_NOT_FOUND, "unknown RPC method call"),
            );
        }

        let drip = match extract_drip_request(&request.params) {
            Ok(drip) => drip,
            Err(err) => {
                return Response::error(
                    request.id,
                    RpcError::new(codes::INVALID_PARAMS, err.to_string()),
                );
            }
        };

        // An unset amount means the max drip amount
        let amount = if drip.amount.is_zero() {
            self.max_send_amount.clone()
        } else {
            drip.amount
        };

        // Admission: requested denoms must be a subset of the cap's denoms,
        // with no per-denom excess
        if !amount.fits_within(&self.max_send_amount) {
            return Response::error(
                request.id,
                RpcError::new(codes::INVALID_REQUEST, "invalid send amount"),
            );
        }

        if let Err(err) = self.transfer_funds(drip.to, amount).await {
            tracing::debug!(id = request.id, error = %err, "unable to handle drip");

            return Response::error(request.id, RpcError::server_error(err));
        }

        Response::success(request.id, json!(FAUCET_SUCCESS))
    }
}

/// Extracts the drip params: a bech32 beneficiary, optionally followed by
/// an `<n>ugnot` amount.
fn extract_drip_request(params: &[Value]) -> Result<DripRequest, DripParamError> {
    let beneficiary = params.first().ok_or(DripParamError::MissingBeneficiary)?;

    let beneficiary = beneficiary
        .as_str()
        .ok_or_else(|| DripParamError::InvalidBeneficiary("beneficiary must be a string".to_string()))?;

    let to: Address = beneficiary
        .parse()
        .map_err(|err: crate::chain::types::AddressError| {
            DripParamError::InvalidBeneficiary(err.to_string())
        })?;

    let Some(amount) = params.get(1) else {
        return Ok(DripRequest {
            to,
            amount: Coins::default(),
        });
    };

    let amount = amount
        .as_str()
        .filter(|raw| is_drip_amount(raw))
        .ok_or(DripParamError::InvalidSendAmount)?;

    let amount: Coins = amount
        .parse()
        .map_err(|_| DripParamError::InvalidSendAmount)?;

    Ok(DripRequest {
        to,
        amount,
    })
}

/// The accepted drip amount form: one or more digits followed by the
/// native denomination, nothing else.
fn is_drip_amount(raw: &str) -> bool {
    raw.strip_suffix(UGNOT_DENOM)
        .is_some_and(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
}
