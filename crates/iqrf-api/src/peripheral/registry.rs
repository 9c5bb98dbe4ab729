// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Static table of type-erased adapters.
//!
//! The table is built at compile time. Lookups by frame walk it in order
//! and take the first adapter whose response matcher accepts the frame, so
//! adapters with catch-all matchers sit at the end.

use super::{
    binaryoutput, coordinator, explore, frc, io, led, memory, node, os, sensor, thermometer, uart,
    PeripheralCommand,
};
use crate::error::{ApiError, ApiResult};
use crate::hdp::{HdpRequest, HdpResponse};
use crate::message::standard::{params_error, reject_unknown_fields};
use crate::mtype::MType;
use serde_json::Value;
use std::marker::PhantomData;

/// Object-safe view of a [`PeripheralCommand`].
pub trait ErasedAdapter: Sync {
    fn m_type(&self) -> MType;
    fn pnum(&self) -> u8;
    fn pcmd(&self) -> u8;
    fn matches(&self, frame: &HdpResponse) -> bool;
    /// Build a request from JSON parameters.
    fn build_request_json(&self, n_adr: u16, hwp_id: Option<u16>, params: &Value) -> ApiResult<HdpRequest>;
    /// Decode a response into its `result` object.
    fn parse_response_json(&self, frame: &HdpResponse) -> ApiResult<Value>;
}

pub struct Adapter<C>(PhantomData<fn() -> C>);

impl<C> Adapter<C> {
    pub const fn new() -> Self {
        Adapter(PhantomData)
    }
}

impl<C> Default for Adapter<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: PeripheralCommand> ErasedAdapter for Adapter<C> {
    fn m_type(&self) -> MType {
        C::M_TYPE
    }

    fn pnum(&self) -> u8 {
        C::PNUM
    }

    fn pcmd(&self) -> u8 {
        C::PCMD
    }

    fn matches(&self, frame: &HdpResponse) -> bool {
        C::matches_response(frame)
    }

    fn build_request_json(&self, n_adr: u16, hwp_id: Option<u16>, params: &Value) -> ApiResult<HdpRequest> {
        let typed: C::Params = serde_json::from_value(params.clone())?;
        reject_unknown_fields(params, &serde_json::to_value(&typed)?)?;
        C::build_request(n_adr, hwp_id, &typed).map_err(params_error)
    }

    fn parse_response_json(&self, frame: &HdpResponse) -> ApiResult<Value> {
        let result = C::parse_result(frame)?;
        Ok(serde_json::to_value(result)?)
    }
}

macro_rules! registry {
    ($($ty:ty),+ $(,)?) => {
        static REGISTRY: &[&dyn ErasedAdapter] = &[ $( &Adapter::<$ty>::new(), )+ ];
    };
}

registry![
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
];

/// Every registered adapter, in lookup order.
pub fn adapters() -> &'static [&'static dyn ErasedAdapter] {
    REGISTRY
}

pub fn lookup_by_mtype(m_type: MType) -> Option<&'static dyn ErasedAdapter> {
    REGISTRY.iter().copied().find(|a| a.m_type() == m_type)
}

/// Adapter that answers `frame`, honoring the response flag.
pub fn lookup_by_frame(frame: &HdpResponse) -> Option<&'static dyn ErasedAdapter> {
    REGISTRY.iter().copied().find(|a| a.matches(frame))
}

/// JSON view of a response frame: mType plus decoded result.
pub fn describe(frame: &HdpResponse) -> ApiResult<Value> {
    let adapter = lookup_by_frame(frame).ok_or(ApiError::NoAdapter {
        pnum: frame.p_num,
        pcmd: frame.command(),
    })?;
    let result = adapter.parse_response_json(frame)?;
    log::debug!("described {} from nAdr={}", adapter.m_type(), frame.n_adr);
    Ok(serde_json::json!({
        "mType": adapter.m_type(),
        "nAdr": frame.n_adr,
        "result": result,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hdp::HdpRequest;
    use serde_json::json;

    #[test]
    fn test_every_standard_shape_mtype_but_sensor_frc_is_registered() {
        for m in MType::ALL {
            if m.is_standard_shape() && *m != MType::SensorFrc {
                assert!(lookup_by_mtype(*m).is_some(), "{} missing", m);
            }
        }
        assert!(lookup_by_mtype(MType::SensorFrc).is_none());
    }

    #[test]
    fn test_mtypes_are_unique() {
        for (i, a) in REGISTRY.iter().enumerate() {
            for b in &REGISTRY[i + 1..] {
                assert_ne!(a.m_type(), b.m_type());
            }
        }
    }

    #[test]
    fn test_json_request_through_registry() {
        let adapter = lookup_by_mtype(MType::LedgSet).unwrap();
        let req = adapter.build_request_json(3, None, &json!({"onOff": true})).unwrap();
        assert_eq!((req.p_num, req.p_cmd), (0x07, 0x01));
        assert!(adapter.build_request_json(3, None, &json!({"on": true})).is_err());
    }

    #[test]
    fn test_describe_picks_the_right_explore_adapter() {
        let enumerate = HdpResponse::answering(
            &HdpRequest::new(1, 0xFF, 0x3F),
            vec![0x15, 0x04, 0, 0x0F, 0, 0, 0, 0x02, 0x00, 0x00, 0x00, 0],
        );
        assert_eq!(describe(&enumerate).unwrap()["mType"], json!("iqrfEmbedExplore_Enumerate"));

        let info = HdpResponse::answering(&HdpRequest::new(1, 0x06, 0x3F), vec![2, 1, 0, 0]);
        assert_eq!(
            describe(&info).unwrap()["mType"],
            json!("iqrfEmbedExplore_PeripheralInformation")
        );
    }

    #[test]
    fn test_describe_thermometer() {
        let rsp = HdpResponse::answering(&HdpRequest::new(2, 0x0A, 0x00), vec![24, 0x88, 0x01]);
        let v = describe(&rsp).unwrap();
        assert_eq!(v["result"], json!({"temperature": 24.5}));
        assert_eq!(v["nAdr"], json!(2));
    }

    #[test]
    fn test_unknown_frame_is_an_error() {
        let rsp = HdpResponse::answering(&HdpRequest::new(2, 0x20, 0x00), vec![]);
        assert!(matches!(
            describe(&rsp),
            Err(ApiError::NoAdapter { pnum: 0x20, pcmd: 0x00 })
        ));
    }
}
