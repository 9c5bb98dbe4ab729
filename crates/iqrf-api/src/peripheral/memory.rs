// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Memory peripherals: EEPROM (0x03), external EEPROM (0x04) and RAM (0x05).

use super::{command_header, Ack, PeripheralCommand};
use crate::error::{FrameResult, ValidationError};
use crate::hdp::{pnum, HdpResponse, PayloadReader, PayloadWriter, DPA_MAX_DATA_LENGTH};
use crate::message::Validate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadParams<A> {
    pub address: A,
    pub len: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WriteParams<A> {
    pub address: A,
    pub p_data: Vec<u8>,
}

/// Address width on the wire.
pub trait MemoryAddress: Copy {
    const WIDTH: usize;

    fn write(self, w: &mut PayloadWriter) -> FrameResult<()>;
}

impl MemoryAddress for u8 {
    const WIDTH: usize = 1;

    fn write(self, w: &mut PayloadWriter) -> FrameResult<()> {
        w.write_u8(self)
    }
}

impl MemoryAddress for u16 {
    const WIDTH: usize = 2;

    fn write(self, w: &mut PayloadWriter) -> FrameResult<()> {
        w.write_u16_le(self)
    }
}

fn max_len<A: MemoryAddress>() -> usize {
    DPA_MAX_DATA_LENGTH - A::WIDTH
}

impl<A: MemoryAddress> Validate for ReadParams<A> {
    fn validate(&self) -> Result<(), ValidationError> {
        let max = max_len::<A>();
        if self.len == 0 || self.len as usize > max {
            return Err(ValidationError::out_of_range("len", self.len as i64, 1, max as i64));
        }
        Ok(())
    }
}

impl<A: MemoryAddress> Validate for WriteParams<A> {
    fn validate(&self) -> Result<(), ValidationError> {
        let max = max_len::<A>();
        if self.p_data.is_empty() || self.p_data.len() > max {
            return Err(ValidationError::length("pData", self.p_data.len(), format!("1..={}", max)));
        }
        Ok(())
    }
}

macro_rules! memory_peripheral {
    (
        $read:ident($read_mtype:ident, $read_pcmd:expr),
        $write:ident($write_mtype:ident, $write_pcmd:expr),
        $pnum:expr, $addr:ty
    ) => {
        #[derive(Debug, Clone, Copy, Default)]
        pub struct $read;

        #[derive(Debug, Clone, Copy, Default)]
        pub struct $write;

        impl PeripheralCommand for $read {
            command_header!($read_mtype, $pnum, $read_pcmd, ReadParams<$addr> => Vec<u8>, "pData");

            fn encode(p: &Self::Params, w: &mut PayloadWriter) -> FrameResult<()> {
                p.address.write(w)?;
                w.write_u8(p.len)
            }

            fn decode(_frame: &HdpResponse, r: &mut PayloadReader<'_>) -> FrameResult<Self::Output> {
                Ok(r.read_rest().to_vec())
            }
        }

        impl PeripheralCommand for $write {
            command_header!($write_mtype, $pnum, $write_pcmd, WriteParams<$addr> => Ack);

            fn encode(p: &Self::Params, w: &mut PayloadWriter) -> FrameResult<()> {
                p.address.write(w)?;
                w.write_bytes(&p.p_data)
            }

            fn decode(_frame: &HdpResponse, _r: &mut PayloadReader<'_>) -> FrameResult<Self::Output> {
                Ok(Ack {})
            }
        }
    };
}

memory_peripheral!(EepromRead(EepromRead, 0x00), EepromWrite(EepromWrite, 0x01), pnum::EEPROM, u8);
memory_peripheral!(EeepromRead(EeepromRead, 0x02), EeepromWrite(EeepromWrite, 0x03), pnum::EEEPROM, u16);
memory_peripheral!(RamRead(RamRead, 0x00), RamWrite(RamWrite, 0x01), pnum::RAM, u8);
