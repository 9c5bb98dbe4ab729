// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! IQRF Binary Output standard (pNum 0x4B).

use super::{bitmap_to_indexes, command_header, command_type, indexes_to_bitmap, PeripheralCommand};
use crate::error::{FrameResult, ValidationError};
use crate::hdp::{pnum, HdpResponse, PayloadReader, PayloadWriter};
use crate::message::{Empty, Validate};
use serde::{Deserialize, Serialize};

pub const MAX_OUTPUTS: usize = 32;
const MASK_LEN: usize = 4;
const STATE_OFF: u8 = 0x00;
const STATE_ON: u8 = 0x01;
const MINUTES_FLAG: u8 = 0x80;
const MAX_UNIT: u32 = 0x7F;

command_type!(Enumerate, SetOutput);

impl PeripheralCommand for Enumerate {
    command_header!(BinaryOutputEnumerate, pnum::BINARY_OUTPUT, 0x3E, Empty => u8, "binOuts");

    fn decode(_frame: &HdpResponse, r: &mut PayloadReader<'_>) -> FrameResult<Self::Output> {
        r.read_u8()
    }
}

/// Requested state of one output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BinOut {
    pub index: u8,
    pub state: bool,
    /// Seconds to stay on; up to 127 s, or whole minutes up to 127 min.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<u32>,
}

impl BinOut {
    fn state_byte(&self) -> Result<u8, ValidationError> {
        match (self.state, self.time) {
            (false, _) => Ok(STATE_OFF),
            (true, None) | (true, Some(0)) => Ok(STATE_ON),
            (true, Some(secs)) if secs <= MAX_UNIT => Ok(secs as u8),
            (true, Some(secs)) if secs % 60 == 0 && secs / 60 <= MAX_UNIT => {
                Ok(MINUTES_FLAG | (secs / 60) as u8)
            }
            (true, Some(secs)) => Err(ValidationError::Malformed {
                field: "time",
                reason: format!(
                    "{} s is neither 1..=127 s nor whole minutes up to 127 min",
                    secs
                ),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetOutputParams {
    #[serde(default)]
    pub bin_outs: Vec<BinOut>,
}

impl SetOutputParams {
    fn sorted(&self) -> Vec<BinOut> {
        let mut outs = self.bin_outs.clone();
        outs.sort_by_key(|o| o.index);
        outs
    }
}

impl Validate for SetOutputParams {
    fn validate(&self) -> Result<(), ValidationError> {
        let outs = self.sorted();
        for pair in outs.windows(2) {
            if pair[0].index == pair[1].index {
                return Err(ValidationError::Malformed {
                    field: "binOuts",
                    reason: format!("index {} given twice", pair[0].index),
                });
            }
        }
        for out in &outs {
            if out.index as usize >= MAX_OUTPUTS {
                return Err(ValidationError::out_of_range(
                    "index",
                    out.index as i64,
                    0,
                    (MAX_OUTPUTS - 1) as i64,
                ));
            }
            out.state_byte()?;
        }
        Ok(())
    }
}

impl PeripheralCommand for SetOutput {
    command_header!(BinaryOutputSetOutput, pnum::BINARY_OUTPUT, 0x00, SetOutputParams => Vec<bool>, "prevVals");

    /// Bitmap of the outputs to change, then one state byte per set bit in
    /// ascending index order.
    fn encode(p: &Self::Params, w: &mut PayloadWriter) -> FrameResult<()> {
        let outs = p.sorted();
        let indexes: Vec<u8> = outs.iter().map(|o| o.index).collect();
        w.write_bytes(&indexes_to_bitmap("index", &indexes, MASK_LEN)?)?;
        for out in &outs {
            w.write_u8(out.state_byte()?)?;
        }
        Ok(())
    }

    fn decode(_frame: &HdpResponse, r: &mut PayloadReader<'_>) -> FrameResult<Self::Output> {
        let on = bitmap_to_indexes("prevVals", r.read_bytes(MASK_LEN)?)?;
        let mut states = vec![false; MAX_OUTPUTS];
        for i in on {
            states[i as usize] = true;
        }
        Ok(states)
    }
}
