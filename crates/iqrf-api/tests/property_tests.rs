// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Property tests for the message envelope and the peripheral adapters.

use iqrf_api::hdp::codec::{decode_dotted_hex, encode_dotted_hex};
use iqrf_api::hdp::{HdpRequest, HdpResponse};
use iqrf_api::message::daemon::{self, ExitRequest, ExitResponse, ModeRequest, ModeResponse, OperMode, VersionResponse};
use iqrf_api::message::iqmesh::{
    self, AutoNetworkProgress, AutoNetworkRequest, BondNodeLocalRequest, BondResult, EnumerateDeviceRequest,
    NewNode, SmartConnectRequest, StopConditions,
};
use iqrf_api::message::raw::RawHdp;
use iqrf_api::message::scheduler::{
    self, AddTaskRequest, ClientRef, GetTaskResponse, ListResponse, ScheduledTask, TaskId, TaskRef, TaskSpec,
    TimeSpec,
};
use iqrf_api::message::standard::{Standard, StdRequest, StdResponse};
use iqrf_api::message::{Empty, Message, Outcome, Request, Response};
use iqrf_api::peripheral::{
    binaryoutput, coordinator, explore, frc, io, led, memory, node, os, registry, sensor, thermometer, uart,
    PeripheralCommand,
};
use proptest::prelude::*;
use proptest::test_runner::TestCaseError;
use serde_json::json;
use std::fmt::Debug;

fn fail(e: impl std::fmt::Display) -> TestCaseError {
    TestCaseError::fail(e.to_string())
}

/// `decode(encode(request)) == request` for message kind `M`.
fn request_round_trip<M>(msg_id: &str, req: M::Req) -> Result<(), TestCaseError>
where
    M: Message,
    M::Req: Clone + PartialEq + Debug,
{
    let request = Request::of::<M>(msg_id, req);
    let text = request.encode().map_err(fail)?;
    let back: Request<M::Req> = Request::decode(&text).map_err(fail)?;
    prop_assert_eq!(back, request);
    Ok(())
}

/// `decode(encode(response)) == response` for message kind `M`.
fn response_round_trip<M>(msg_id: &str, rsp: M::Rsp) -> Result<(), TestCaseError>
where
    M: Message,
    M::Rsp: Clone + PartialEq + Debug,
{
    let text = Response::success(M::M_TYPE, msg_id, rsp.clone()).encode().map_err(fail)?;
    let back = Response::<M::Rsp>::decode_for::<M>(&text).map_err(fail)?;
    prop_assert_eq!(back.msg_id.as_str(), msg_id);
    prop_assert_eq!(back.outcome, Outcome::Success(rsp));
    Ok(())
}

/// Whatever command `C` decodes from `p_data` survives its standard
/// response envelope unchanged.
fn result_round_trip<C>(p_data: &[u8]) -> Result<(), TestCaseError>
where
    C: PeripheralCommand,
    C::Output: Clone + PartialEq + Debug,
{
    let frame = HdpResponse::answering(&HdpRequest::new(1, C::PNUM, C::PCMD), p_data.to_vec());
    let Ok(result) = C::parse_result(&frame) else {
        return Ok(());
    };
    response_round_trip::<Standard<C>>("rt", StdResponse::from_frame(&frame, result))
}

/// Registered adapters, checked one by one.
macro_rules! for_each_adapter {
    ($check:ident, $data:expr; $($ty:ty),+ $(,)?) => {{
        let mut checked = 0usize;
        $(
            $check::<$ty>($data)?;
            checked += 1;
        )+
        checked
    }};
}

fn all_results_round_trip(p_data: &[u8]) -> Result<usize, TestCaseError> {
    Ok(for_each_adapter!(result_round_trip, p_data;
        coordinator::AddrInfo,
        coordinator::DiscoveredDevices,
        coordinator::BondedDevices,
        coordinator::ClearAllBonds,
        coordinator::BondNode,
        coordinator::RemoveBond,
        coordinator::Discovery,
        coordinator::SetDpaParams,
        coordinator::SetHops,
        coordinator::Backup,
        coordinator::Restore,
        coordinator::AuthorizeBond,
        coordinator::SmartConnect,
        coordinator::SetMid,
        node::Read,
        node::RemoveBond,
        node::Backup,
        node::Restore,
        node::ValidateBonds,
        os::Read,
        os::Reset,
        os::ReadCfg,
        os::Rfpgm,
        os::Sleep,
        os::Batch,
        os::Restart,
        os::WriteCfgByte,
        os::LoadCode,
        os::SelectiveBatch,
        os::TestRfSignal,
        os::FactorySettings,
        os::Indicate,
        memory::EepromRead,
        memory::EepromWrite,
        memory::EeepromRead,
        memory::EeepromWrite,
        memory::RamRead,
        memory::RamWrite,
        led::LedrSet,
        led::LedrGet,
        led::LedrPulse,
        led::LedrFlashing,
        led::LedgSet,
        led::LedgGet,
        led::LedgPulse,
        led::LedgFlashing,
        io::Direction,
        io::Set,
        io::Get,
        thermometer::Read,
        uart::Open,
        uart::Close,
        uart::WriteRead,
        uart::ClearWriteRead,
        frc::Send,
        frc::ExtraResult,
        frc::SendSelective,
        frc::SetParams,
        binaryoutput::Enumerate,
        binaryoutput::SetOutput,
        sensor::Enumerate,
        sensor::ReadSensorsWithTypes,
        explore::Enumerate,
        explore::MorePeripheralsInformation,
        explore::PeripheralInformation,
    ))
}

#[test]
fn test_every_registered_adapter_is_round_tripped() {
    assert_eq!(all_results_round_trip(&[]).unwrap(), registry::adapters().len());
}

fn arb_client_id() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9-]{0,15}"
}

fn arb_time_spec() -> impl Strategy<Value = TimeSpec> {
    prop_oneof![
        proptest::collection::vec("[0-9*/,-]{1,6}", 7).prop_map(|fields| TimeSpec {
            cron_time: fields,
            periodic: false,
            period: 0,
            exact_time: false,
            start_time: String::new(),
        }),
        (1u32..86_400).prop_map(TimeSpec::periodic),
        "20[0-9]{2}-0[1-9]-1[0-9]T0[0-9]:00:00".prop_map(TimeSpec::exact),
    ]
}

fn arb_task() -> impl Strategy<Value = ScheduledTask> {
    ("[A-Za-z]{1,20}", "[a-z0-9]{1,12}", any::<u16>()).prop_map(|(messaging, msg_id, n_adr)| ScheduledTask {
        messaging,
        message: json!({"mType": "iqrfEmbedLedr_Pulse",
            "data": {"msgId": msg_id, "req": {"nAdr": n_adr, "param": {}}}}),
    })
}

fn arb_task_spec() -> impl Strategy<Value = TaskSpec> {
    prop_oneof![
        arb_task().prop_map(TaskSpec::One),
        proptest::collection::vec(arb_task(), 1..4).prop_map(TaskSpec::Many),
    ]
}

fn arb_oper_mode() -> impl Strategy<Value = OperMode> {
    prop_oneof![Just(OperMode::Operational), Just(OperMode::Service), Just(OperMode::Forwarding)]
}

fn arb_bond_result() -> impl Strategy<Value = BondResult> {
    (
        0u16..=239,
        0u16..=239,
        any::<u16>(),
        proptest::option::of(any::<u16>()),
        proptest::option::of("[A-Za-z ]{1,20}"),
        proptest::option::of("[A-Za-z0-9 ]{1,20}"),
    )
        .prop_map(|(assigned_addr, nodes_nr, hwp_id, hwp_id_version, manufacturer, product)| BondResult {
            assigned_addr,
            nodes_nr,
            hwp_id,
            hwp_id_version,
            manufacturer,
            product,
            os_read: None,
        })
}

fn arb_request() -> impl Strategy<Value = HdpRequest> {
    (
        any::<u16>(),
        any::<u8>(),
        0u8..0x80,
        proptest::option::of(any::<u16>()),
        proptest::collection::vec(any::<u8>(), 0..=56),
    )
        .prop_map(|(n_adr, p_num, p_cmd, hwp_id, p_data)| HdpRequest {
            n_adr,
            p_num,
            p_cmd,
            hwp_id,
            p_data,
        })
}

proptest! {
    #[test]
    fn test_every_adapter_result_round_trips(p_data in proptest::collection::vec(any::<u8>(), 0..=56)) {
        all_results_round_trip(&p_data)?;
    }

    #[test]
    fn test_standard_requests_round_trip(
        msg_id in "[A-Za-z0-9_-]{1,40}",
        n_adr in 0u16..=239,
        on_off in any::<bool>(),
        address in any::<u8>(),
        p_data in proptest::collection::vec(any::<u8>(), 1..=55),
        user_data in proptest::collection::vec(any::<u8>(), 0..=frc::MAX_USER_DATA),
        ports in proptest::collection::vec((0u8..0xFF, any::<u8>(), any::<u8>()), 1..=18),
    ) {
        request_round_trip::<Standard<led::LedrSet>>(&msg_id, StdRequest::new(n_adr, led::OnOff { on_off }))?;
        request_round_trip::<Standard<memory::RamWrite>>(
            &msg_id,
            StdRequest::new(n_adr, memory::WriteParams { address, p_data: p_data.clone() }),
        )?;
        request_round_trip::<Standard<frc::Send>>(
            &msg_id,
            StdRequest::new(0, frc::SendParams { frc_command: address, user_data }).with_hwp_id(0xFFFF),
        )?;
        let ports = ports
            .into_iter()
            .map(|(port, mask, value)| io::SetEntry::Port(io::PortTriplet { port, mask, value }))
            .collect();
        request_round_trip::<Standard<io::Set>>(&msg_id, StdRequest::new(n_adr, io::SetParams { ports }))?;
        request_round_trip::<Standard<uart::WriteRead>>(
            &msg_id,
            StdRequest::new(n_adr, uart::WriteReadParams { read_timeout: address, written_data: p_data }),
        )?;
        request_round_trip::<Standard<thermometer::Read>>(&msg_id, StdRequest::new(n_adr, Empty {}))?;
    }

    #[test]
    fn test_scheduler_messages_round_trip(
        client_id in arb_client_id(),
        task_id in any::<u32>(),
        task in arb_task_spec(),
        time_spec in arb_time_spec(),
        persist in proptest::option::of(any::<bool>()),
        tasks in proptest::collection::vec(any::<u32>(), 0..8),
    ) {
        let task_ref = TaskRef { client_id: client_id.clone(), task_id: TaskId(task_id) };
        let client_ref = ClientRef { client_id: client_id.clone() };

        request_round_trip::<scheduler::AddTask>("s", AddTaskRequest {
            client_id: client_id.clone(),
            task: task.clone(),
            time_spec: time_spec.clone(),
            persist,
        })?;
        response_round_trip::<scheduler::AddTask>("s", task_ref.clone())?;
        request_round_trip::<scheduler::GetTask>("s", task_ref.clone())?;
        response_round_trip::<scheduler::GetTask>("s", GetTaskResponse {
            client_id: client_id.clone(),
            task_id: TaskId(task_id),
            task,
            time_spec,
        })?;
        request_round_trip::<scheduler::RemoveTask>("s", task_ref.clone())?;
        response_round_trip::<scheduler::RemoveTask>("s", task_ref)?;
        request_round_trip::<scheduler::RemoveAll>("s", client_ref.clone())?;
        response_round_trip::<scheduler::RemoveAll>("s", client_ref.clone())?;
        request_round_trip::<scheduler::List>("s", client_ref)?;
        response_round_trip::<scheduler::List>("s", ListResponse {
            client_id,
            tasks: tasks.into_iter().map(TaskId).collect(),
        })?;
    }

    #[test]
    fn test_daemon_messages_round_trip(
        mode in arb_oper_mode(),
        query in any::<bool>(),
        time_to_exit in 0u32..1_000_000,
        version in "v[0-9]\\.[0-9]{1,2}\\.[0-9]{1,2}",
    ) {
        let requested = if query { None } else { Some(mode) };
        request_round_trip::<daemon::Mode>("d", ModeRequest { oper_mode: requested })?;
        response_round_trip::<daemon::Mode>("d", ModeResponse { oper_mode: mode })?;
        let time_to_exit = f64::from(time_to_exit) / 8.0;
        request_round_trip::<daemon::Exit>("d", ExitRequest { time_to_exit })?;
        response_round_trip::<daemon::Exit>("d", ExitResponse { time_to_exit })?;
        request_round_trip::<daemon::Version>("d", Empty {})?;
        response_round_trip::<daemon::Version>("d", VersionResponse { version })?;
    }

    #[test]
    fn test_iqmesh_messages_round_trip(
        device_addr in 0u16..=239,
        code in "[A-Z0-9]{8,34}",
        retries in any::<u8>(),
        user_data in proptest::option::of(proptest::collection::vec(any::<u8>(), 4)),
        more in proptest::option::of(any::<bool>()),
        bond in arb_bond_result(),
        tx_power in 0u8..=7,
        waves in proptest::option::of(any::<u8>()),
        new_nodes in proptest::collection::vec(("[0-9a-f]{8}", 1u16..=239), 0..5),
        last_wave in any::<bool>(),
    ) {
        request_round_trip::<iqmesh::SmartConnect>("m", SmartConnectRequest {
            device_addr,
            smart_connect_code: code,
            bonding_test_retries: retries,
            user_data,
        })?;
        response_round_trip::<iqmesh::SmartConnect>("m", bond.clone())?;
        request_round_trip::<iqmesh::BondNodeLocal>("m", BondNodeLocalRequest {
            device_addr,
            bonding_test_retries: retries,
        })?;
        response_round_trip::<iqmesh::BondNodeLocal>("m", bond)?;
        request_round_trip::<iqmesh::EnumerateDevice>("m", EnumerateDeviceRequest {
            device_addr,
            more_peripherals_info: more,
        })?;
        request_round_trip::<iqmesh::AutoNetwork>("m", AutoNetworkRequest {
            discovery_tx_power: tx_power,
            discovery_before_start: last_wave,
            action_retries: retries,
            stop_conditions: StopConditions { waves, empty_waves: None, network_size: None },
        })?;
        let new_nodes: Vec<NewNode> = new_nodes
            .into_iter()
            .map(|(mid, address)| NewNode { mid, address })
            .collect();
        response_round_trip::<iqmesh::AutoNetwork>("m", AutoNetworkProgress {
            wave: 1,
            nodes_nr: new_nodes.len() as u16,
            new_nodes_nr: new_nodes.len() as u16,
            new_nodes,
            last_wave,
        })?;
    }

    #[test]
    fn test_msg_id_survives_any_envelope(msg_id in "[A-Za-z0-9_-]{1,40}", req in arb_request()) {
        let text = Request::of::<RawHdp>(msg_id.clone(), req.clone()).encode().unwrap();
        let back: Request<HdpRequest> = Request::decode(&text).unwrap();
        prop_assert_eq!(back.msg_id(), msg_id.as_str());
        prop_assert_eq!(back.data.req, req);
    }

    #[test]
    fn test_dotted_hex_is_lossless(bytes in proptest::collection::vec(any::<u8>(), 0..64)) {
        prop_assert_eq!(decode_dotted_hex(&encode_dotted_hex(&bytes)).unwrap(), bytes);
    }

    #[test]
    fn test_oversized_pdata_never_encodes(extra in 1usize..32) {
        let req = HdpRequest::new(1, 6, 3).with_data(vec![0; 56 + extra]);
        prop_assert!(Request::of::<RawHdp>("x", req).encode().is_err());
    }

    #[test]
    fn test_memory_read_accepts_any_payload(data in proptest::collection::vec(any::<u8>(), 0..=55)) {
        let req = memory::RamRead::build_request(1, None, &memory::ReadParams { address: 0, len: 1 }).unwrap();
        let out = memory::RamRead::parse_response(&HdpResponse::answering(&req, data.clone())).unwrap();
        prop_assert_eq!(out, data);
    }

    #[test]
    fn test_thermometer_never_panics(data in proptest::collection::vec(any::<u8>(), 0..8)) {
        let req = thermometer::Read::build_request(1, None, &Empty {}).unwrap();
        let rsp = HdpResponse::answering(&req, data.clone());
        let parsed = thermometer::Read::parse_response(&rsp);
        prop_assert_eq!(parsed.is_ok(), data.len() == 3);
    }

    #[test]
    fn test_describe_never_panics(p_num in any::<u8>(), p_cmd in 0u8..0x80, data in proptest::collection::vec(any::<u8>(), 0..=56)) {
        let rsp = HdpResponse::answering(&HdpRequest::new(1, p_num, p_cmd), data);
        let _ = registry::describe(&rsp);
    }

    #[test]
    fn test_sensor_readings_never_panic(data in proptest::collection::vec(any::<u8>(), 0..=56)) {
        let req = sensor::ReadSensorsWithTypes::build_request(1, None, &Default::default()).unwrap();
        let _ = sensor::ReadSensorsWithTypes::parse_response(&HdpResponse::answering(&req, data));
    }
}
