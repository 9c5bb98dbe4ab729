// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! OS peripheral (pNum 0x02).

use super::explore::{read_enumeration, PeripheralEnumeration};
use super::{command_header, command_type, indexes_to_bitmap, Ack, PeripheralCommand};
use crate::error::{FrameResult, ValidationError};
use crate::hdp::{pnum, HdpResponse, PayloadReader, PayloadWriter, DPA_MAX_DATA_LENGTH};
use crate::message::{Empty, Validate};
use serde::{Deserialize, Serialize};

const IBK_LEN: usize = 16;
const CFG_LEN: usize = 31;
/// Length byte, pNum, pCmd and HWPID of one batch entry.
const BATCH_HEADER_LEN: usize = 5;
const SELECTIVE_BITMAP_LEN: usize = 30;
const CFG_BYTE_ENTRY_LEN: usize = 3;

command_type!(
    Read,
    Reset,
    ReadCfg,
    Rfpgm,
    Sleep,
    Batch,
    Restart,
    WriteCfgByte,
    LoadCode,
    SelectiveBatch,
    TestRfSignal,
    FactorySettings,
    Indicate,
);

/// Module and OS identification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OsInfo {
    pub mid: u32,
    pub os_version: u8,
    pub tr_mcu_type: u8,
    pub os_build: u16,
    pub rssi: u8,
    pub supply_voltage: u8,
    pub flags: u8,
    pub slot_limits: u8,
    pub ibk: Vec<u8>,
    /// Present when the node appends its peripheral enumeration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enumeration: Option<PeripheralEnumeration>,
}

impl PeripheralCommand for Read {
    command_header!(OsRead, pnum::OS, 0x00, Empty => OsInfo);

    fn decode(_frame: &HdpResponse, r: &mut PayloadReader<'_>) -> FrameResult<Self::Output> {
        let mut info = OsInfo {
            mid: r.read_u32_le()?,
            os_version: r.read_u8()?,
            tr_mcu_type: r.read_u8()?,
            os_build: r.read_u16_le()?,
            rssi: r.read_u8()?,
            supply_voltage: r.read_u8()?,
            flags: r.read_u8()?,
            slot_limits: r.read_u8()?,
            ibk: r.read_bytes(IBK_LEN)?.to_vec(),
            enumeration: None,
        };
        if !r.is_empty() {
            info.enumeration = Some(read_enumeration(r)?);
        }
        Ok(info)
    }
}

macro_rules! ack_command {
    ($($ty:ident => $mtype:ident, $pcmd:expr;)+) => {
        $(
            impl PeripheralCommand for $ty {
                command_header!($mtype, pnum::OS, $pcmd, Empty => Ack);

                fn decode(_frame: &HdpResponse, _r: &mut PayloadReader<'_>) -> FrameResult<Self::Output> {
                    Ok(Ack {})
                }
            }
        )+
    };
}

ack_command! {
    Reset => OsReset, 0x01;
    Rfpgm => OsRfpgm, 0x03;
    Restart => OsRestart, 0x08;
    FactorySettings => OsFactorySettings, 0x0D;
}

/// TR configuration block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrConfiguration {
    pub checksum: u8,
    pub configuration: Vec<u8>,
    pub rfpgm: u8,
    pub undocumented: u8,
}

impl PeripheralCommand for ReadCfg {
    command_header!(OsReadCfg, pnum::OS, 0x02, Empty => TrConfiguration);

    fn decode(_frame: &HdpResponse, r: &mut PayloadReader<'_>) -> FrameResult<Self::Output> {
        Ok(TrConfiguration {
            checksum: r.read_u8()?,
            configuration: r.read_bytes(CFG_LEN)?.to_vec(),
            rfpgm: r.read_u8()?,
            undocumented: r.read_u8()?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SleepParams {
    /// Units of 2.097 s.
    pub time: u16,
    pub control: u8,
}

impl Validate for SleepParams {}

impl PeripheralCommand for Sleep {
    command_header!(OsSleep, pnum::OS, 0x04, SleepParams => Ack);

    fn encode(p: &Self::Params, w: &mut PayloadWriter) -> FrameResult<()> {
        w.write_u16_le(p.time)?;
        w.write_u8(p.control)
    }

    fn decode(_frame: &HdpResponse, _r: &mut PayloadReader<'_>) -> FrameResult<Self::Output> {
        Ok(Ack {})
    }
}

/// One request executed by Batch or SelectiveBatch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchRequest {
    pub pnum: u8,
    pub pcmd: u8,
    #[serde(default = "hwpid_dont_care")]
    pub hwpid: u16,
    #[serde(default)]
    pub pdata: Vec<u8>,
}

fn hwpid_dont_care() -> u16 {
    crate::hdp::HWPID_DONT_CARE
}

fn validate_batch(requests: &[BatchRequest], budget: usize) -> Result<(), ValidationError> {
    if requests.is_empty() {
        return Err(ValidationError::MissingField("requests"));
    }
    // Terminating zero byte included.
    let total = requests
        .iter()
        .map(|r| BATCH_HEADER_LEN + r.pdata.len())
        .sum::<usize>()
        + 1;
    if total > budget {
        return Err(ValidationError::length("requests", total, format!("<= {} bytes", budget)));
    }
    Ok(())
}

fn write_batch(requests: &[BatchRequest], w: &mut PayloadWriter) -> FrameResult<()> {
    for req in requests {
        w.write_u8((BATCH_HEADER_LEN + req.pdata.len()) as u8)?;
        w.write_u8(req.pnum)?;
        w.write_u8(req.pcmd)?;
        w.write_u16_le(req.hwpid)?;
        w.write_bytes(&req.pdata)?;
    }
    w.write_u8(0)
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BatchParams {
    pub requests: Vec<BatchRequest>,
}

impl Validate for BatchParams {
    fn validate(&self) -> Result<(), ValidationError> {
        validate_batch(&self.requests, DPA_MAX_DATA_LENGTH)
    }
}

impl PeripheralCommand for Batch {
    command_header!(OsBatch, pnum::OS, 0x05, BatchParams => Ack);

    fn encode(p: &Self::Params, w: &mut PayloadWriter) -> FrameResult<()> {
        write_batch(&p.requests, w)
    }

    fn decode(_frame: &HdpResponse, _r: &mut PayloadReader<'_>) -> FrameResult<Self::Output> {
        Ok(Ack {})
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectiveBatchParams {
    pub selected_nodes: Vec<u8>,
    pub requests: Vec<BatchRequest>,
}

impl Validate for SelectiveBatchParams {
    fn validate(&self) -> Result<(), ValidationError> {
        indexes_to_bitmap("selectedNodes", &self.selected_nodes, SELECTIVE_BITMAP_LEN)?;
        validate_batch(&self.requests, DPA_MAX_DATA_LENGTH - SELECTIVE_BITMAP_LEN)
    }
}

impl PeripheralCommand for SelectiveBatch {
    command_header!(OsSelectiveBatch, pnum::OS, 0x0B, SelectiveBatchParams => Ack);

    fn encode(p: &Self::Params, w: &mut PayloadWriter) -> FrameResult<()> {
        w.write_bytes(&indexes_to_bitmap("selectedNodes", &p.selected_nodes, SELECTIVE_BITMAP_LEN)?)?;
        write_batch(&p.requests, w)
    }

    fn decode(_frame: &HdpResponse, _r: &mut PayloadReader<'_>) -> FrameResult<Self::Output> {
        Ok(Ack {})
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndicateParams {
    /// 0 off, 1 on, 2 for 1 s, 3 for 10 s.
    pub control: u8,
}

impl Validate for IndicateParams {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.control > 3 {
            return Err(ValidationError::out_of_range("control", self.control as i64, 0, 3));
        }
        Ok(())
    }
}

impl PeripheralCommand for Indicate {
    command_header!(OsIndicate, pnum::OS, 0x07, IndicateParams => Ack);

    fn encode(p: &Self::Params, w: &mut PayloadWriter) -> FrameResult<()> {
        w.write_u8(p.control)
    }

    fn decode(_frame: &HdpResponse, _r: &mut PayloadReader<'_>) -> FrameResult<Self::Output> {
        Ok(Ack {})
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CfgByte {
    pub address: u8,
    pub value: u8,
    pub mask: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WriteCfgByteParams {
    pub bytes: Vec<CfgByte>,
}

impl Validate for WriteCfgByteParams {
    fn validate(&self) -> Result<(), ValidationError> {
        let max = DPA_MAX_DATA_LENGTH / CFG_BYTE_ENTRY_LEN;
        if self.bytes.is_empty() || self.bytes.len() > max {
            return Err(ValidationError::length("bytes", self.bytes.len(), format!("1..={}", max)));
        }
        Ok(())
    }
}

impl PeripheralCommand for WriteCfgByte {
    command_header!(OsWriteCfgByte, pnum::OS, 0x09, WriteCfgByteParams => Ack);

    fn encode(p: &Self::Params, w: &mut PayloadWriter) -> FrameResult<()> {
        for b in &p.bytes {
            w.write_u8(b.address)?;
            w.write_u8(b.value)?;
            w.write_u8(b.mask)?;
        }
        Ok(())
    }

    fn decode(_frame: &HdpResponse, _r: &mut PayloadReader<'_>) -> FrameResult<Self::Output> {
        Ok(Ack {})
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadCodeParams {
    pub flags: u8,
    pub address: u16,
    pub length: u16,
    pub check_sum: u16,
}

impl Validate for LoadCodeParams {}

impl PeripheralCommand for LoadCode {
    command_header!(OsLoadCode, pnum::OS, 0x0A, LoadCodeParams => bool, "loadingCode");

    fn encode(p: &Self::Params, w: &mut PayloadWriter) -> FrameResult<()> {
        w.write_u8(p.flags)?;
        w.write_u16_le(p.address)?;
        w.write_u16_le(p.length)?;
        w.write_u16_le(p.check_sum)
    }

    fn decode(_frame: &HdpResponse, r: &mut PayloadReader<'_>) -> FrameResult<Self::Output> {
        r.read_bool()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestRfSignalParams {
    pub channel: u8,
    pub rx_filter: u8,
    /// Units of 10 ms.
    pub time: u16,
}

impl Validate for TestRfSignalParams {}

impl PeripheralCommand for TestRfSignal {
    command_header!(OsTestRfSignal, pnum::OS, 0x0C, TestRfSignalParams => u8, "counter");

    fn encode(p: &Self::Params, w: &mut PayloadWriter) -> FrameResult<()> {
        w.write_u8(p.channel)?;
        w.write_u8(p.rx_filter)?;
        w.write_u16_le(p.time)
    }

    fn decode(_frame: &HdpResponse, r: &mut PayloadReader<'_>) -> FrameResult<Self::Output> {
        r.read_u8()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn os_read_payload() -> Vec<u8> {
        let mut data = vec![0x3C, 0x2B, 0x00, 0x81, 0x43, 0xB4, 0xC8, 0x08, 0x40, 0x31, 0x00, 0x00];
        data.extend(1..=16u8);
        data
    }

    #[test]
    fn test_read_without_enumeration() {
        let req = Read::build_request(1, None, &Empty {}).unwrap();
        let rsp = HdpResponse::answering(&req, os_read_payload());
        let info = Read::parse_response(&rsp).unwrap();
        assert_eq!(info.mid, 0x8100_2B3C);
        assert_eq!(info.os_build, 0x08C8);
        assert_eq!(info.ibk.len(), 16);
        assert!(info.enumeration.is_none());
    }

    #[test]
    fn test_read_with_trailing_enumeration() {
        let req = Read::build_request(1, None, &Empty {}).unwrap();
        let mut data = os_read_payload();
        data.extend([0x15, 0x04, 0, 0x0F, 0, 0, 0, 0x02, 0x00, 0x01, 0x00, 0]);
        let info = Read::parse_response(&HdpResponse::answering(&req, data)).unwrap();
        let e = info.enumeration.unwrap();
        assert_eq!(e.dpa_ver, 0x0415);
        assert_eq!(e.embedded_pers, vec![0, 1, 2, 3]);
        assert_eq!(e.hwp_id_ver, 1);
    }

    #[test]
    fn test_batch_layout() {
        let params = BatchParams {
            requests: vec![
                BatchRequest { pnum: 6, pcmd: 3, hwpid: 0xFFFF, pdata: vec![] },
                BatchRequest { pnum: 7, pcmd: 3, hwpid: 0xFFFF, pdata: vec![] },
            ],
        };
        let req = Batch::build_request(3, None, &params).unwrap();
        assert_eq!(
            req.p_data,
            vec![5, 6, 3, 0xFF, 0xFF, 5, 7, 3, 0xFF, 0xFF, 0]
        );
    }

    #[test]
    fn test_selective_batch_budget() {
        let params = SelectiveBatchParams {
            selected_nodes: vec![1, 2],
            requests: vec![BatchRequest { pnum: 6, pcmd: 3, hwpid: 0xFFFF, pdata: vec![0; 21] }],
        };
        assert!(params.validate().is_err());
        let ok = SelectiveBatchParams {
            selected_nodes: vec![1, 2],
            requests: vec![BatchRequest { pnum: 6, pcmd: 3, hwpid: 0xFFFF, pdata: vec![0; 20] }],
        };
        let req = SelectiveBatch::build_request(0xFF, None, &ok).unwrap();
        assert_eq!(req.p_data.len(), DPA_MAX_DATA_LENGTH);
        assert_eq!(req.p_data[0], 0b0000_0110);
    }

    #[test]
    fn test_indicate_control_range() {
        assert!(IndicateParams { control: 4 }.validate().is_err());
        let req = Indicate::build_request(0, None, &IndicateParams { control: 2 }).unwrap();
        assert_eq!((req.p_cmd, req.p_data.clone()), (0x07, vec![2]));
    }

    #[test]
    fn test_load_code_result() {
        let params = LoadCodeParams { flags: 1, address: 0x0800, length: 0x0100, check_sum: 0x1234 };
        let req = LoadCode::build_request(0, None, &params).unwrap();
        assert_eq!(req.p_data, vec![1, 0x00, 0x08, 0x00, 0x01, 0x34, 0x12]);
        let value = serde_json::to_value(LoadCode::parse_result(&HdpResponse::answering(&req, vec![1])).unwrap())
            .unwrap();
        assert_eq!(value, serde_json::json!({"loadingCode": true}));
    }
}
