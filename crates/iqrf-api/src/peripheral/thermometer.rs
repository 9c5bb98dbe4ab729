// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Thermometer peripheral (pNum 0x0A).

use super::{command_header, command_type, PeripheralCommand};
use crate::error::FrameResult;
use crate::hdp::{pnum, HdpResponse, PayloadReader};
use crate::message::Empty;

/// Integer part reported when the sensor could not be read.
const READ_ERROR: u8 = 0x80;

command_type!(Read);

/// Sign-extend the low 12 bits and scale from 1/16 °C.
fn sixteenths_to_celsius(raw: u16) -> f32 {
    let value = ((raw << 4) as i16) >> 4;
    f32::from(value) / 16.0
}

impl PeripheralCommand for Read {
    command_header!(ThermometerRead, pnum::THERMOMETER, 0x00, Empty => Option<f32>, "temperature");

    fn decode(_frame: &HdpResponse, r: &mut PayloadReader<'_>) -> FrameResult<Self::Output> {
        let whole = r.read_u8()?;
        let raw = r.read_u16_le()?;
        if whole == READ_ERROR {
            return Ok(None);
        }
        Ok(Some(sixteenths_to_celsius(raw)))
    }
}
