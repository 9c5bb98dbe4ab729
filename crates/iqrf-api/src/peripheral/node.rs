// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Node peripheral (pNum 0x01).

use super::coordinator::BACKUP_BLOCK_LEN;
use super::{command_header, command_type, Ack, PeripheralCommand};
use crate::error::{FrameResult, ValidationError};
use crate::hdp::{pnum, HdpResponse, PayloadReader, PayloadWriter, MAX_NODE_ADDR};
use crate::message::{Empty, Validate};
use serde::{Deserialize, Serialize};

/// Bytes per entry of a ValidateBonds request.
const BOND_ENTRY_LEN: usize = 5;

command_type!(Read, RemoveBond, Backup, Restore, ValidateBonds);

/// Network information stored in the node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeInfo {
    pub ntw_addr: u8,
    pub ntw_vrn: u8,
    pub ntw_zin: u8,
    pub ntw_did: u8,
    pub ntw_pvrn: u8,
    pub ntw_useraddress: u16,
    pub ntw_id: u16,
    pub ntw_vrnfnz: u8,
    pub ntw_cfg: u8,
    pub flags: u8,
}

impl PeripheralCommand for Read {
    command_header!(NodeRead, pnum::NODE, 0x00, Empty => NodeInfo);

    fn decode(_frame: &HdpResponse, r: &mut PayloadReader<'_>) -> FrameResult<Self::Output> {
        Ok(NodeInfo {
            ntw_addr: r.read_u8()?,
            ntw_vrn: r.read_u8()?,
            ntw_zin: r.read_u8()?,
            ntw_did: r.read_u8()?,
            ntw_pvrn: r.read_u8()?,
            ntw_useraddress: r.read_u16_le()?,
            ntw_id: r.read_u16_le()?,
            ntw_vrnfnz: r.read_u8()?,
            ntw_cfg: r.read_u8()?,
            flags: r.read_u8()?,
        })
    }
}

impl PeripheralCommand for RemoveBond {
    command_header!(NodeRemoveBond, pnum::NODE, 0x01, Empty => Ack);

    fn decode(_frame: &HdpResponse, _r: &mut PayloadReader<'_>) -> FrameResult<Self::Output> {
        Ok(Ack {})
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupParams {
    pub index: u8,
}

impl Validate for BackupParams {}

impl PeripheralCommand for Backup {
    command_header!(NodeBackup, pnum::NODE, 0x06, BackupParams => Vec<u8>, "backupData");

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
    pub backup_data: Vec<u8>,
}

impl Validate for RestoreParams {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.backup_data.len() != BACKUP_BLOCK_LEN {
            return Err(ValidationError::length(
                "backupData",
                self.backup_data.len(),
                BACKUP_BLOCK_LEN.to_string(),
            ));
        }
        Ok(())
    }
}

impl PeripheralCommand for Restore {
    command_header!(NodeRestore, pnum::NODE, 0x07, RestoreParams => Ack);

    fn encode(p: &Self::Params, w: &mut PayloadWriter) -> FrameResult<()> {
        w.write_bytes(&p.backup_data)
    }

    fn decode(_frame: &HdpResponse, _r: &mut PayloadReader<'_>) -> FrameResult<Self::Output> {
        Ok(Ack {})
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BondEntry {
    pub bond_addr: u8,
    pub mid: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ValidateBondsParams {
    pub nodes: Vec<BondEntry>,
}

impl Validate for ValidateBondsParams {
    fn validate(&self) -> Result<(), ValidationError> {
        let max = crate::hdp::DPA_MAX_DATA_LENGTH / BOND_ENTRY_LEN;
        if self.nodes.is_empty() || self.nodes.len() > max {
            return Err(ValidationError::length("nodes", self.nodes.len(), format!("1..={}", max)));
        }
        for node in &self.nodes {
            if node.bond_addr as u16 > MAX_NODE_ADDR {
                return Err(ValidationError::out_of_range(
                    "bondAddr",
                    node.bond_addr as i64,
                    0,
                    MAX_NODE_ADDR as i64,
                ));
            }
        }
        Ok(())
    }
}

impl PeripheralCommand for ValidateBonds {
    command_header!(NodeValidateBonds, pnum::NODE, 0x08, ValidateBondsParams => Ack);

    fn encode(p: &Self::Params, w: &mut PayloadWriter) -> FrameResult<()> {
        for node in &p.nodes {
            w.write_u8(node.bond_addr)?;
            w.write_u32_le(node.mid)?;
        }
        Ok(())
    }

    fn decode(_frame: &HdpResponse, _r: &mut PayloadReader<'_>) -> FrameResult<Self::Output> {
        Ok(Ack {})
    }
}
