// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! UART peripheral (pNum 0x0C).

use super::{command_header, command_type, Ack, PeripheralCommand};
use crate::error::{FrameResult, ValidationError};
use crate::hdp::{pnum, HdpResponse, PayloadReader, PayloadWriter, DPA_MAX_DATA_LENGTH};
use crate::message::{Empty, Validate};
use serde::{Deserialize, Serialize};

/// Highest baud rate code (230400 Bd).
pub const MAX_BAUD_RATE: u8 = 0x08;
/// Read timeout value that skips reading.
pub const NO_READ: u8 = 0xFF;
const MAX_WRITTEN: usize = DPA_MAX_DATA_LENGTH - 1;

command_type!(Open, Close, WriteRead, ClearWriteRead);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenParams {
    /// 0 = 1200 Bd ... 8 = 230400 Bd.
    pub baud_rate: u8,
}

impl Validate for OpenParams {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.baud_rate > MAX_BAUD_RATE {
            return Err(ValidationError::out_of_range(
                "baudRate",
                self.baud_rate as i64,
                0,
                MAX_BAUD_RATE as i64,
            ));
        }
        Ok(())
    }
}

impl PeripheralCommand for Open {
    command_header!(UartOpen, pnum::UART, 0x00, OpenParams => Ack);

    fn encode(p: &Self::Params, w: &mut PayloadWriter) -> FrameResult<()> {
        w.write_u8(p.baud_rate)
    }

    fn decode(_frame: &HdpResponse, _r: &mut PayloadReader<'_>) -> FrameResult<Self::Output> {
        Ok(Ack {})
    }
}

impl PeripheralCommand for Close {
    command_header!(UartClose, pnum::UART, 0x01, Empty => Ack);

    fn decode(_frame: &HdpResponse, _r: &mut PayloadReader<'_>) -> FrameResult<Self::Output> {
        Ok(Ack {})
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WriteReadParams {
    /// Units of 10 ms; [`NO_READ`] writes only.
    pub read_timeout: u8,
    #[serde(default)]
    pub written_data: Vec<u8>,
}

impl Validate for WriteReadParams {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.written_data.len() > MAX_WRITTEN {
            return Err(ValidationError::length(
                "writtenData",
                self.written_data.len(),
                format!("<= {}", MAX_WRITTEN),
            ));
        }
        Ok(())
    }
}

fn write_read(p: &WriteReadParams, w: &mut PayloadWriter) -> FrameResult<()> {
    w.write_u8(p.read_timeout)?;
    w.write_bytes(&p.written_data)
}

impl PeripheralCommand for WriteRead {
    command_header!(UartWriteRead, pnum::UART, 0x02, WriteReadParams => Vec<u8>, "readData");

    fn encode(p: &Self::Params, w: &mut PayloadWriter) -> FrameResult<()> {
        write_read(p, w)
    }

    fn decode(_frame: &HdpResponse, r: &mut PayloadReader<'_>) -> FrameResult<Self::Output> {
        Ok(r.read_rest().to_vec())
    }
}

impl PeripheralCommand for ClearWriteRead {
    command_header!(UartClearWriteRead, pnum::UART, 0x03, WriteReadParams => Vec<u8>, "readData");

    fn encode(p: &Self::Params, w: &mut PayloadWriter) -> FrameResult<()> {
        write_read(p, w)
    }

    fn decode(_frame: &HdpResponse, r: &mut PayloadReader<'_>) -> FrameResult<Self::Output> {
        Ok(r.read_rest().to_vec())
    }
}
