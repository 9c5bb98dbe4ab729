// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! FRC peripheral (pNum 0x0D).
//!
//! Send collects one small value from every node in a single round. The
//! response holds a status byte followed by the first 55 data bytes; the
//! remaining 9 bytes come from ExtraResult.

use super::{command_header, command_type, indexes_to_bitmap, PeripheralCommand};
use crate::error::{FrameError, FrameResult, ValidationError};
use crate::hdp::{pnum, HdpResponse, PayloadReader, PayloadWriter, MAX_NODE_ADDR};
use crate::message::{Empty, Validate};
use serde::{Deserialize, Serialize};

pub const MAX_USER_DATA: usize = 30;
pub const MAX_SELECTIVE_USER_DATA: usize = 25;
pub const SELECTED_NODES_LEN: usize = 30;
/// FRC data bytes carried by a Send response after the status byte.
pub const DATA_LEN: usize = 55;
pub const EXTRA_RESULT_LEN: usize = 9;

command_type!(Send, ExtraResult, SendSelective, SetParams);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendParams {
    pub frc_command: u8,
    #[serde(default)]
    pub user_data: Vec<u8>,
}

impl Validate for SendParams {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.user_data.len() > MAX_USER_DATA {
            return Err(ValidationError::length(
                "userData",
                self.user_data.len(),
                format!("<= {}", MAX_USER_DATA),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendSelectiveParams {
    pub frc_command: u8,
    pub selected_nodes: Vec<u8>,
    #[serde(default)]
    pub user_data: Vec<u8>,
}

impl Validate for SendSelectiveParams {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.selected_nodes.is_empty() {
            return Err(ValidationError::MissingField("selectedNodes"));
        }
        if let Some(&addr) = self.selected_nodes.iter().find(|&&a| a == 0 || a as u16 > MAX_NODE_ADDR) {
            return Err(ValidationError::out_of_range("selectedNodes", addr as i64, 1, MAX_NODE_ADDR as i64));
        }
        if self.user_data.len() > MAX_SELECTIVE_USER_DATA {
            return Err(ValidationError::length(
                "userData",
                self.user_data.len(),
                format!("<= {}", MAX_SELECTIVE_USER_DATA),
            ));
        }
        Ok(())
    }
}

/// Status byte and collected data of a Send.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrcResult {
    /// Number of nodes that answered, or an error code above 0xEF.
    pub status: u8,
    pub frc_data: Vec<u8>,
}

fn read_frc_result(r: &mut PayloadReader<'_>) -> FrameResult<FrcResult> {
    let status = r.read_u8()?;
    if status as u16 > MAX_NODE_ADDR {
        return Err(FrameError::InvalidValue {
            field: "status",
            reason: format!("FRC was not executed ({:#04x})", status),
        });
    }
    Ok(FrcResult {
        status,
        frc_data: r.read_rest().to_vec(),
    })
}

impl PeripheralCommand for Send {
    command_header!(FrcSend, pnum::FRC, 0x00, SendParams => FrcResult);

    fn encode(p: &Self::Params, w: &mut PayloadWriter) -> FrameResult<()> {
        w.write_u8(p.frc_command)?;
        w.write_bytes(&p.user_data)
    }

    fn decode(_frame: &HdpResponse, r: &mut PayloadReader<'_>) -> FrameResult<Self::Output> {
        read_frc_result(r)
    }
}

impl PeripheralCommand for ExtraResult {
    command_header!(FrcExtraResult, pnum::FRC, 0x01, Empty => Vec<u8>, "frcData");

    fn decode(_frame: &HdpResponse, r: &mut PayloadReader<'_>) -> FrameResult<Self::Output> {
        Ok(r.read_bytes(EXTRA_RESULT_LEN)?.to_vec())
    }
}

impl PeripheralCommand for SendSelective {
    command_header!(FrcSendSelective, pnum::FRC, 0x02, SendSelectiveParams => FrcResult);

    fn encode(p: &Self::Params, w: &mut PayloadWriter) -> FrameResult<()> {
        w.write_u8(p.frc_command)?;
        w.write_bytes(&indexes_to_bitmap("selectedNodes", &p.selected_nodes, SELECTED_NODES_LEN)?)?;
        w.write_bytes(&p.user_data)
    }

    fn decode(_frame: &HdpResponse, r: &mut PayloadReader<'_>) -> FrameResult<Self::Output> {
        read_frc_result(r)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrcParams {
    pub frc_response_time: u8,
}

impl Validate for FrcParams {}

impl PeripheralCommand for SetParams {
    command_header!(FrcSetParams, pnum::FRC, 0x03, FrcParams => FrcParams);

    fn encode(p: &Self::Params, w: &mut PayloadWriter) -> FrameResult<()> {
        w.write_u8(p.frc_response_time)
    }

    fn decode(_frame: &HdpResponse, r: &mut PayloadReader<'_>) -> FrameResult<Self::Output> {
        Ok(FrcParams {
            frc_response_time: r.read_u8()?,
        })
    }
}
