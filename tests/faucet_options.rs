//! Faucet assembly options: custom message factories, request
//! middlewares and extra JSON-RPC endpoints.

mod common;

use std::sync::Arc;

use serde_json::json;

use gno_faucet::chain::{Coin, MsgCall, TxMessage};
use gno_faucet::config::Config;
use gno_faucet::faucet::handler::{RpcEndpoint, RpcHandler, RpcMiddleware};
use gno_faucet::faucet::prepare::PrepareCfg;
use gno_faucet::rpc::{codes, Request, Response, RpcError};
use gno_faucet::Faucet;

use common::{beneficiary, post_rpc, post_rpc_at, ScriptedClient, TestEstimator, TEST_MNEMONIC};

fn test_config() -> Config {
    Config {
        mnemonic: TEST_MNEMONIC.to_string(),
        ..Config::default()
    }
}

fn test_estimator() -> TestEstimator {
    TestEstimator {
        gas_fee: Coin::new("ugnot", 1),
    }
}

#[tokio::test]
async fn custom_message_factories_are_used_verbatim() {
    let client = ScriptedClient::with_balance("1000001ugnot");
    let (broadcasts, sent) = client.observers();

    let faucet = Faucet::builder(test_estimator(), client)
        .with_config(test_config())
        .with_prepare_tx_message_fn(Arc::new(|cfg: PrepareCfg| {
            TxMessage::Call(MsgCall {
                caller: cfg.from_address,
                send: cfg.send_amount,
                pkg_path: "gno.land/r/faucet".to_string(),
                func: "Claim".to_string(),
                args: vec![cfg.to_address.to_string()],
            })
        }))
        .build()
        .unwrap();

    let payload = json!({
        "jsonrpc": "2.0",
        "id": 1,
        "method": "drip",
        "params": [beneficiary()],
    });

    let (_, body) = post_rpc(faucet.router(), &payload.to_string()).await;
    assert_eq!(body["result"], "successfully executed faucet transfer");
    assert_eq!(broadcasts.load(std::sync::atomic::Ordering::SeqCst), 1);

    let sent = sent.lock().unwrap();
    match &sent[0].msgs[..] {
        [TxMessage::Call(msg)] => {
            assert_eq!(msg.func, "Claim");
            assert_eq!(msg.send, "1000000ugnot".parse().unwrap());
            assert_eq!(msg.args, vec![beneficiary()]);
        }
        other => panic!("unexpected messages: {other:?}"),
    }
}

#[tokio::test]
async fn middlewares_wrap_every_endpoint() {
    // Short-circuits any request carrying non-null meta
    let meta_guard: RpcMiddleware = Arc::new(|next: RpcHandler| {
        Arc::new(move |request: Request| {
            let next = next.clone();

            Box::pin(async move {
                if !request.meta.is_null() {
                    return Response::error(
                        request.id,
                        RpcError::new(codes::SERVER_ERROR, "meta not allowed"),
                    );
                }

                next(request).await
            })
        })
    });

    let client = ScriptedClient::with_balance("1000001ugnot");
    let (broadcasts, _) = client.observers();

    let faucet = Faucet::builder(test_estimator(), client)
        .with_config(test_config())
        .with_middlewares(vec![meta_guard])
        .build()
        .unwrap();
    let router = faucet.router();

    // A request with meta set is short-circuited before the drip handler
    let blocked = json!({
        "jsonrpc": "2.0",
        "id": 1,
        "method": "drip",
        "params": [beneficiary()],
        "meta": {"origin": "test"},
    });

    let (_, body) = post_rpc(router.clone(), &blocked.to_string()).await;
    assert_eq!(body["error"]["message"], "meta not allowed");
    assert_eq!(broadcasts.load(std::sync::atomic::Ordering::SeqCst), 0);

    // Without meta the drip goes through
    let allowed = json!({
        "jsonrpc": "2.0",
        "id": 2,
        "method": "drip",
        "params": [beneficiary()],
    });

    let (_, body) = post_rpc(router, &allowed.to_string()).await;
    assert_eq!(body["result"], "successfully executed faucet transfer");
    assert_eq!(broadcasts.load(std::sync::atomic::Ordering::SeqCst), 1);
}

#[tokio::test]
async fn extra_endpoints_mount_beside_the_drip_endpoint() {
    let ping: RpcHandler = Arc::new(|request: Request| {
        Box::pin(async move { Response::success(request.id, json!("pong")) })
    });

    let client = ScriptedClient::with_balance("1000001ugnot");

    let faucet = Faucet::builder(test_estimator(), client)
        .with_config(test_config())
        .with_handlers(vec![RpcEndpoint {
            path: "/status".to_string(),
            handler: ping,
        }])
        .build()
        .unwrap();
    let router = faucet.router();

    let payload = json!({"jsonrpc": "2.0", "id": 1, "method": "ping"});
    let (status, body) = post_rpc_at(router.clone(), "/status", &payload.to_string()).await;

    assert_eq!(status, 200);
    assert_eq!(body["result"], "pong");

    // The default drip endpoint still serves
    let drip = json!({
        "jsonrpc": "2.0",
        "id": 2,
        "method": "drip",
        "params": [beneficiary()],
    });

    let (_, body) = post_rpc(router, &drip.to_string()).await;
    assert_eq!(body["result"], "successfully executed faucet transfer");
}
