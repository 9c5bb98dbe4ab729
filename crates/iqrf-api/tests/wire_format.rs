// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![allow(clippy::unreadable_literal)] // Task ids and MIDs
#![allow(clippy::float_cmp)] // Test assertions with constants
#![allow(clippy::doc_markdown)] // Test documentation

//! Wire format tests for the daemon JSON API.
//!
//! # Test Coverage
//!
//! - iqrfRawHdp request encoding with explicit empty pData
//! - status 0 / status -1 decoding into success and failure outcomes
//! - Scheduler task ids encoded as JSON numbers
//! - Standard request built from an adapter and its response decoded back
//! - iqrfRaw <-> iqrfRawHdp conversion

use iqrf_api::hdp::HdpRequest;
use iqrf_api::message::raw::{RawHdp, RawRequest};
use iqrf_api::message::scheduler::{RemoveTask, TaskId, TaskRef};
use iqrf_api::message::standard::{Standard, StdRequest, StdResponse};
use iqrf_api::message::{Message, Outcome, Request, Response};
use iqrf_api::peripheral::{coordinator, led, PeripheralCommand};
use iqrf_api::{AnyResponse, HdpResponse, MType};
use serde_json::{json, Value};

#[test]
fn test_raw_hdp_request_keeps_empty_pdata() {
    let request = Request::of::<RawHdp>("raw-1", HdpRequest::new(1, 6, 3))
        .with_timeout(1000)
        .with_verbose(true);
    let value: Value = serde_json::from_str(&request.encode().unwrap()).unwrap();

    assert_eq!(
        value,
        json!({
            "mType": "iqrfRawHdp",
            "data": {
                "msgId": "raw-1",
                "timeout": 1000,
                "returnVerbose": true,
                "req": {"nAdr": 1, "pNum": 6, "pCmd": 3, "pData": []}
            }
        })
    );
    assert!(value["data"]["req"]["pData"].is_array());
}

#[test]
fn test_status_zero_is_success() {
    let text = json!({
        "mType": "iqrfRawHdp",
        "data": {
            "msgId": "raw-1",
            "rsp": {"nAdr": 1, "pNum": 6, "pCmd": 131, "hwpId": 0, "rCode": 0, "dpaVal": 77, "pData": []},
            "insId": "iqrfgd2-1",
            "status": 0,
            "statusStr": "ok"
        }
    })
    .to_string();

    let response = Response::<HdpResponse>::decode_for::<RawHdp>(&text).unwrap();
    assert_eq!(response.status(), 0);
    match response.outcome {
        Outcome::Success(rsp) => {
            assert_eq!(rsp.p_cmd, 0x83);
            assert_eq!(rsp.dpa_val, 77);
        }
        Outcome::Failure(e) => panic!("unexpected failure {e}"),
    }
}

#[test]
fn test_status_minus_one_is_failure_without_rsp() {
    let text = json!({
        "mType": "iqrfRawHdp",
        "data": {"msgId": "raw-2", "status": -1, "statusStr": "ERROR_TIMEOUT"}
    })
    .to_string();

    let response = Response::<HdpResponse>::decode_for::<RawHdp>(&text).unwrap();
    assert_eq!(response.ins_id(), "iqrfgd2-1");
    match response.outcome {
        Outcome::Failure(e) => {
            assert_eq!(e.status, -1);
            assert_eq!(e.status_str.as_deref(), Some("ERROR_TIMEOUT"));
            assert!(e.rsp.is_none());
        }
        Outcome::Success(_) => panic!("status -1 must not decode as success"),
    }
}

#[test]
fn test_scheduler_task_id_is_a_number() {
    let request = Request::of::<RemoveTask>(
        "sched-1",
        TaskRef {
            client_id: "test".into(),
            task_id: TaskId(2146077740),
        },
    );
    let value = request.to_value().unwrap();
    assert_eq!(value["data"]["req"]["taskId"], json!(2146077740));
    assert!(value["data"]["req"]["taskId"].is_u64());
    assert_eq!(value["mType"], json!(RemoveTask::M_TYPE.as_str()));
}

#[test]
fn test_standard_roundtrip_through_adapter() {
    type Bonded = Standard<coordinator::BondedDevices>;

    let request = Request::of::<Bonded>("std-1", StdRequest::new(0, Default::default()));
    assert_eq!(request.m_type, MType::CoordinatorBondedDevices);

    let frame = coordinator::BondedDevices::build_request(0, None, &request.data.req.param).unwrap();
    let mut bitmap = vec![0u8; 32];
    bitmap[0] = 0b0000_1110;
    let answer = HdpResponse::answering(&frame, bitmap);
    let result = coordinator::BondedDevices::parse_result(&answer).unwrap();

    let response = Response::success(Bonded::M_TYPE, "std-1", StdResponse::from_frame(&answer, result));
    let text = response.encode().unwrap();
    let value: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(value["data"]["rsp"]["result"], json!({"bondedDevices": [1, 2, 3]}));

    match AnyResponse::decode(&text).unwrap() {
        AnyResponse::Standard(r) => assert_eq!(r.m_type, MType::CoordinatorBondedDevices),
        other => panic!("unexpected variant {other:?}"),
    }
}

#[test]
fn test_led_set_json_and_frame_agree() {
    let params = led::OnOff { on_off: true };
    let request = Request::of::<Standard<led::LedrSet>>("led-1", StdRequest::new(5, params));
    assert_eq!(
        request.to_value().unwrap()["data"]["req"],
        json!({"nAdr": 5, "param": {"onOff": true}})
    );
    let frame = led::LedrSet::build_request(5, None, &params).unwrap();
    assert_eq!((frame.n_adr, frame.p_num, frame.p_cmd), (5, 0x06, 0x01));
}

#[test]
fn test_raw_and_raw_hdp_agree() {
    let hdp = HdpRequest::new(0x0001, 0x06, 0x03).with_hwp_id(0xFFFF);
    let raw = RawRequest::from_hdp(&hdp);
    assert_eq!(raw.r_data, "01.00.06.03.ff.ff");
    assert_eq!(raw.to_hdp().unwrap(), hdp);
}
