// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![allow(clippy::uninlined_format_args)] // Test code readability over pedantic
#![allow(clippy::cast_possible_truncation)] // Test parameters
#![allow(clippy::doc_markdown)] // Test documentation

//! msgId correlation through the in-process transport.
//!
//! # Test Coverage
//!
//! - Concurrent calls answered out of order each get their own responses
//! - Foreign msgIds never leak into an exchange
//! - Multi-response calls collected until the final wave
//! - Timeout bound on silent exchanges
//! - Validation failures never reach the wire, typed or untyped

use iqrf_api::hdp::{HdpRequest, HdpResponse};
use iqrf_api::message::iqmesh::{AutoNetwork, AutoNetworkRequest};
use iqrf_api::message::raw::RawHdp;
use iqrf_api::peripheral::{led, os};
use iqrf_api::{ApiError, MType, Outcome, Request, Response};
use iqrf_client::{CallOptions, ChannelTransport, ClientError, Collect, DaemonClient, PeripheralReply};
use serde_json::{json, Value};
use std::time::{Duration, Instant};

fn msg_id_of(text: &str) -> String {
    let v: Value = serde_json::from_str(text).unwrap();
    v["data"]["msgId"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_concurrent_calls_answered_out_of_order() {
    let (transport, mut loopback) = ChannelTransport::pair();
    let client = DaemonClient::with_transport(transport).with_default_wait(Duration::from_secs(5));

    const CALLS: usize = 16;
    let daemon = tokio::spawn(async move {
        let mut requests = Vec::new();
        while requests.len() < CALLS {
            requests.push(loopback.recv().await.unwrap());
        }
        // Noise for an exchange nobody is waiting on.
        loopback
            .reply(json!({"mType": "iqrfRawHdp", "data": {"msgId": "stranger", "status": -1}}).to_string())
            .unwrap();
        for text in requests.iter().rev() {
            let request: Request<HdpRequest> = Request::decode(text).unwrap();
            let frame = &request.data.req;
            let rsp = HdpResponse::answering(frame, vec![frame.n_adr as u8]);
            loopback
                .reply(Response::success(MType::IqrfRawHdp, request.msg_id(), rsp).encode().unwrap())
                .unwrap();
        }
        loopback
    });

    let calls = (1..=CALLS as u16).map(|n_adr| {
        let client = &client;
        async move {
            let request = Request::of::<RawHdp>(format!("call-{}", n_adr), HdpRequest::new(n_adr, 0x06, 0x03));
            let rsp = client.call_one::<RawHdp>(request, CallOptions::default()).await.unwrap();
            (n_adr, rsp)
        }
    });
    let results = futures::future::join_all(calls).await;
    let _loopback = daemon.await.unwrap();

    for (n_adr, rsp) in results {
        assert_eq!(rsp.msg_id, format!("call-{}", n_adr));
        match rsp.outcome {
            Outcome::Success(frame) => {
                assert_eq!(frame.n_adr, n_adr);
                assert_eq!(frame.p_data, vec![n_adr as u8]);
            }
            Outcome::Failure(e) => panic!("unexpected failure {}", e.status),
        }
    }
    assert_eq!(client.transport().pending(), 0);
}

#[tokio::test]
async fn test_auto_network_collects_until_last_wave() {
    let transport = ChannelTransport::with_handler(|request| {
        let msg_id = msg_id_of(request);
        (1..=3)
            .map(|wave| {
                json!({
                    "mType": "iqmeshNetwork_AutoNetwork",
                    "data": {
                        "msgId": msg_id,
                        "rsp": {"wave": wave, "nodesNr": wave, "newNodesNr": 1, "lastWave": wave == 2},
                        "status": 0
                    }
                })
                .to_string()
            })
            .collect()
    });
    let client = DaemonClient::with_transport(transport);

    let request = Request::of::<AutoNetwork>("an-1", AutoNetworkRequest::default());
    let opts = CallOptions::default()
        .wait(Duration::from_secs(5))
        .collect(Collect::UntilFinal);
    let started = Instant::now();
    let waves = client.call::<AutoNetwork>(request, opts).await.unwrap();

    assert!(started.elapsed() < Duration::from_secs(5));
    assert_eq!(waves.len(), 2);
    let last = waves.last().unwrap().outcome.as_ref().into_result().unwrap();
    assert_eq!(last.wave, 2);
    assert!(last.last_wave);
}

#[tokio::test]
async fn test_silent_exchange_is_bounded_by_wait() {
    let (transport, _loopback) = ChannelTransport::pair();
    let client = DaemonClient::with_transport(transport);

    let request = Request::of::<RawHdp>("quiet", HdpRequest::new(1, 0x06, 0x03));
    let started = Instant::now();
    let responses = client
        .call::<RawHdp>(request, CallOptions::default().wait(Duration::from_millis(150)))
        .await
        .unwrap();
    let elapsed = started.elapsed();

    assert!(responses.is_empty());
    assert!(elapsed >= Duration::from_millis(150));
    assert!(elapsed < Duration::from_secs(1), "took {:?}", elapsed);
}

#[tokio::test]
async fn test_invalid_request_is_not_sent() {
    let (transport, mut loopback) = ChannelTransport::pair();
    let client = DaemonClient::with_transport(transport);

    let oversized = HdpRequest::new(1, 0x05, 0x01).with_data(vec![0; 60]);
    let err = client
        .call::<RawHdp>(Request::of::<RawHdp>("big", oversized), CallOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Api(ApiError::Validation(_))));

    let err = client
        .call_peripheral::<os::Indicate>(1, None, &os::IndicateParams { control: 9 })
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Api(ApiError::Frame(_))));

    let untyped = json!({"mType": "iqrfEmbedRam_Write", "data": {"req": {"nAdr": 1,
        "param": {"address": 0, "pData": vec![0u8; 60]}}}});
    let err = client.call_raw_json(untyped, CallOptions::default()).await.unwrap_err();
    assert!(matches!(err, ClientError::Api(ApiError::Validation(_))));

    let unknown_field = json!({"mType": "iqrfEmbedLedr_Set", "data": {"req": {"nAdr": 1,
        "param": {"onOff": true, "bogus": "x"}}}});
    let err = client.call_raw_json(unknown_field, CallOptions::default()).await.unwrap_err();
    assert!(matches!(err, ClientError::Api(ApiError::Validation(_))));

    assert!(tokio::time::timeout(Duration::from_millis(20), loopback.recv()).await.is_err());
}

#[tokio::test]
async fn test_peripheral_call_over_loopback() {
    let transport = ChannelTransport::with_handler(|text| {
        let request: Request<HdpRequest> = Request::decode(text).unwrap();
        let rsp = HdpResponse::answering(&request.data.req, vec![]);
        vec![Response::success(MType::IqrfRawHdp, request.msg_id(), rsp).encode().unwrap()]
    });
    let client = DaemonClient::with_transport(transport);

    let reply = client
        .call_peripheral::<led::LedrSet>(4, None, &led::OnOff { on_off: false })
        .await
        .unwrap();
    assert_eq!(reply, PeripheralReply::Ok(false));
}
