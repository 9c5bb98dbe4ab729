// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Coordinator peripheral (pNum 0x00).

use super::{bitmap_to_indexes, command_header, command_type, Ack, PeripheralCommand};
use crate::error::{FrameResult, ValidationError};
use crate::hdp::{pnum, HdpResponse, PayloadReader, PayloadWriter, MAX_NODE_ADDR};
use crate::message::{Empty, Validate};
use serde::{Deserialize, Serialize};

/// Length of one network backup block.
pub const BACKUP_BLOCK_LEN: usize = 49;
const BITMAP_LEN: usize = 32;
const IBK_LEN: usize = 16;
const USER_DATA_LEN: usize = 4;
/// Bytes between MID and VirtualDeviceAddress, plus the reserved tail.
const SMART_CONNECT_RESERVED0: usize = 2;
const SMART_CONNECT_RESERVED1: usize = 9;

command_type!(
    AddrInfo,
    DiscoveredDevices,
    BondedDevices,
    ClearAllBonds,
    BondNode,
    RemoveBond,
    Discovery,
    SetDpaParams,
    SetHops,
    Backup,
    Restore,
    AuthorizeBond,
    SmartConnect,
    SetMid,
);

fn check_addr(field: &'static str, addr: u8) -> Result<(), ValidationError> {
    if addr as u16 > MAX_NODE_ADDR {
        return Err(ValidationError::out_of_range(
            field,
            addr as i64,
            0,
            MAX_NODE_ADDR as i64,
        ));
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddrInfoResult {
    pub dev_nr: u8,
    pub did: u8,
}

impl PeripheralCommand for AddrInfo {
    command_header!(CoordinatorAddrInfo, pnum::COORDINATOR, 0x00, Empty => AddrInfoResult);

    fn decode(_frame: &HdpResponse, r: &mut PayloadReader<'_>) -> FrameResult<Self::Output> {
        Ok(AddrInfoResult {
            dev_nr: r.read_u8()?,
            did: r.read_u8()?,
        })
    }
}

impl PeripheralCommand for DiscoveredDevices {
    command_header!(CoordinatorDiscoveredDevices, pnum::COORDINATOR, 0x01, Empty => Vec<u8>, "discoveredDevices");

    fn decode(_frame: &HdpResponse, r: &mut PayloadReader<'_>) -> FrameResult<Self::Output> {
        bitmap_to_indexes("discoveredDevices", r.read_bytes(BITMAP_LEN)?)
    }
}

impl PeripheralCommand for BondedDevices {
    command_header!(CoordinatorBondedDevices, pnum::COORDINATOR, 0x02, Empty => Vec<u8>, "bondedDevices");

    fn decode(_frame: &HdpResponse, r: &mut PayloadReader<'_>) -> FrameResult<Self::Output> {
        bitmap_to_indexes("bondedDevices", r.read_bytes(BITMAP_LEN)?)
    }
}

impl PeripheralCommand for ClearAllBonds {
    command_header!(CoordinatorClearAllBonds, pnum::COORDINATOR, 0x03, Empty => Ack);

    fn decode(_frame: &HdpResponse, _r: &mut PayloadReader<'_>) -> FrameResult<Self::Output> {
        Ok(Ack {})
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BondNodeParams {
    /// 0 lets the coordinator choose the first free address.
    pub req_addr: u8,
    #[serde(default)]
    pub bonding_mask: u8,
}

impl Validate for BondNodeParams {
    fn validate(&self) -> Result<(), ValidationError> {
        check_addr("reqAddr", self.req_addr)
    }
}

/// Address assigned to a newly bonded node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BondResult {
    pub bond_addr: u8,
    pub dev_nr: u8,
}

fn read_bond_result(r: &mut PayloadReader<'_>) -> FrameResult<BondResult> {
    Ok(BondResult {
        bond_addr: r.read_u8()?,
        dev_nr: r.read_u8()?,
    })
}

impl PeripheralCommand for BondNode {
    command_header!(CoordinatorBondNode, pnum::COORDINATOR, 0x04, BondNodeParams => BondResult);

    fn encode(p: &Self::Params, w: &mut PayloadWriter) -> FrameResult<()> {
        w.write_u8(p.req_addr)?;
        w.write_u8(p.bonding_mask)
    }

    fn decode(_frame: &HdpResponse, r: &mut PayloadReader<'_>) -> FrameResult<Self::Output> {
        read_bond_result(r)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BondAddrParams {
    pub bond_addr: u8,
}

impl Validate for BondAddrParams {
    fn validate(&self) -> Result<(), ValidationError> {
        check_addr("bondAddr", self.bond_addr)
    }
}

impl PeripheralCommand for RemoveBond {
    command_header!(CoordinatorRemoveBond, pnum::COORDINATOR, 0x05, BondAddrParams => u8, "devNr");

    fn encode(p: &Self::Params, w: &mut PayloadWriter) -> FrameResult<()> {
        w.write_u8(p.bond_addr)
    }

    fn decode(_frame: &HdpResponse, r: &mut PayloadReader<'_>) -> FrameResult<Self::Output> {
        r.read_u8()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveryParams {
    pub tx_power: u8,
    /// 0 discovers the whole network.
    #[serde(default)]
    pub max_addr: u8,
}

impl Validate for DiscoveryParams {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.tx_power > 7 {
            return Err(ValidationError::out_of_range("txPower", self.tx_power as i64, 0, 7));
        }
        check_addr("maxAddr", self.max_addr)
    }
}

impl PeripheralCommand for Discovery {
    command_header!(CoordinatorDiscovery, pnum::COORDINATOR, 0x07, DiscoveryParams => u8, "discNr");

    fn encode(p: &Self::Params, w: &mut PayloadWriter) -> FrameResult<()> {
        w.write_u8(p.tx_power)?;
        w.write_u8(p.max_addr)
    }

    fn decode(_frame: &HdpResponse, r: &mut PayloadReader<'_>) -> FrameResult<Self::Output> {
        r.read_u8()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DpaParamParams {
    pub dpa_param: u8,
}

impl Validate for DpaParamParams {}

impl PeripheralCommand for SetDpaParams {
    command_header!(CoordinatorSetDpaParams, pnum::COORDINATOR, 0x08, DpaParamParams => u8, "prevDpaParam");

    fn encode(p: &Self::Params, w: &mut PayloadWriter) -> FrameResult<()> {
        w.write_u8(p.dpa_param)
    }

    fn decode(_frame: &HdpResponse, r: &mut PayloadReader<'_>) -> FrameResult<Self::Output> {
        r.read_u8()
    }
}

/// Routing hops; 0xFF keeps the current value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hops {
    pub request_hops: u8,
    pub response_hops: u8,
}

impl Validate for Hops {}

impl PeripheralCommand for SetHops {
    command_header!(CoordinatorSetHops, pnum::COORDINATOR, 0x09, Hops => Hops);

    fn encode(p: &Self::Params, w: &mut PayloadWriter) -> FrameResult<()> {
        w.write_u8(p.request_hops)?;
        w.write_u8(p.response_hops)
    }

    fn decode(_frame: &HdpResponse, r: &mut PayloadReader<'_>) -> FrameResult<Self::Output> {
        Ok(Hops {
            request_hops: r.read_u8()?,
            response_hops: r.read_u8()?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupParams {
    pub index: u8,
}

impl Validate for BackupParams {}

impl PeripheralCommand for Backup {
    command_header!(CoordinatorBackup, pnum::COORDINATOR, 0x0B, BackupParams => Vec<u8>, "networkData");

    fn encode(p: &Self::Params, w: &mut PayloadWriter) -> FrameResult<()> {
        w.write_u8(p.index)
    }

    fn decode(_frame: &HdpResponse, r: &mut PayloadReader<'_>) -> FrameResult<Self::Output> {
        Ok(r.read_bytes(BACKUP_BLOCK_LEN)?.to_vec())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestoreParams {
    pub net_data: Vec<u8>,
}

impl Validate for RestoreParams {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.net_data.len() != BACKUP_BLOCK_LEN {
            return Err(ValidationError::length(
                "netData",
                self.net_data.len(),
                BACKUP_BLOCK_LEN.to_string(),
            ));
        }
        Ok(())
    }
}

impl PeripheralCommand for Restore {
    command_header!(CoordinatorRestore, pnum::COORDINATOR, 0x0C, RestoreParams => Ack);

    fn encode(p: &Self::Params, w: &mut PayloadWriter) -> FrameResult<()> {
        w.write_bytes(&p.net_data)
    }

    fn decode(_frame: &HdpResponse, _r: &mut PayloadReader<'_>) -> FrameResult<Self::Output> {
        Ok(Ack {})
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizeBondParams {
    pub req_addr: u8,
    pub mid: u32,
}

impl Validate for AuthorizeBondParams {
    fn validate(&self) -> Result<(), ValidationError> {
        check_addr("reqAddr", self.req_addr)
    }
}

impl PeripheralCommand for AuthorizeBond {
    command_header!(CoordinatorAuthorizeBond, pnum::COORDINATOR, 0x0D, AuthorizeBondParams => BondResult);

    fn encode(p: &Self::Params, w: &mut PayloadWriter) -> FrameResult<()> {
        w.write_u8(p.req_addr)?;
        w.write_u32_le(p.mid)
    }

    fn decode(_frame: &HdpResponse, r: &mut PayloadReader<'_>) -> FrameResult<Self::Output> {
        read_bond_result(r)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SmartConnectParams {
    pub req_addr: u8,
    #[serde(default = "default_retries")]
    pub bonding_test_retries: u8,
    /// Individual bonding key, 16 bytes.
    pub ibk: Vec<u8>,
    pub mid: u32,
    #[serde(default)]
    pub virtual_device_address: u8,
    #[serde(default = "default_user_data")]
    pub user_data: Vec<u8>,
}

fn default_retries() -> u8 {
    1
}

fn default_user_data() -> Vec<u8> {
    vec![0; USER_DATA_LEN]
}

impl Validate for SmartConnectParams {
    fn validate(&self) -> Result<(), ValidationError> {
        check_addr("reqAddr", self.req_addr)?;
        if self.ibk.len() != IBK_LEN {
            return Err(ValidationError::length("ibk", self.ibk.len(), IBK_LEN.to_string()));
        }
        if self.user_data.len() != USER_DATA_LEN {
            return Err(ValidationError::length(
                "userData",
                self.user_data.len(),
                USER_DATA_LEN.to_string(),
            ));
        }
        Ok(())
    }
}

impl PeripheralCommand for SmartConnect {
    command_header!(CoordinatorSmartConnect, pnum::COORDINATOR, 0x12, SmartConnectParams => BondResult);

    fn encode(p: &Self::Params, w: &mut PayloadWriter) -> FrameResult<()> {
        w.write_u8(p.req_addr)?;
        w.write_u8(p.bonding_test_retries)?;
        w.write_bytes(&p.ibk)?;
        w.write_u32_le(p.mid)?;
        w.write_bytes(&[0; SMART_CONNECT_RESERVED0])?;
        w.write_u8(p.virtual_device_address)?;
        w.write_bytes(&[0; SMART_CONNECT_RESERVED1])?;
        w.write_bytes(&p.user_data)
    }

    fn decode(_frame: &HdpResponse, r: &mut PayloadReader<'_>) -> FrameResult<Self::Output> {
        read_bond_result(r)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetMidParams {
    pub bond_addr: u8,
    pub mid: u32,
}

impl Validate for SetMidParams {
    fn validate(&self) -> Result<(), ValidationError> {
        check_addr("bondAddr", self.bond_addr)
    }
}

impl PeripheralCommand for SetMid {
    command_header!(CoordinatorSetMid, pnum::COORDINATOR, 0x13, SetMidParams => Ack);

    fn encode(p: &Self::Params, w: &mut PayloadWriter) -> FrameResult<()> {
        w.write_u32_le(p.mid)?;
        w.write_u8(p.bond_addr)
    }

    fn decode(_frame: &HdpResponse, _r: &mut PayloadReader<'_>) -> FrameResult<Self::Output> {
        Ok(Ack {})
    }
}
