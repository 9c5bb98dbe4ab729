// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Sensor values collected over FRC.
//!
//! FRC data carries bare values with no type tag, so decoding needs the
//! sensor type and FRC command the caller asked for. [`SensorFrcContext`]
//! carries that state from request to response.

use super::quantity::{Quantity, SensorDescriptor};
use crate::error::{FrameError, FrameResult, ValidationError};
use crate::hdp::{pnum, HdpRequest, HdpResponse, COORDINATOR_ADDR, MAX_NODE_ADDR};
use crate::message::standard::{StdRequest, StdResponse};
use crate::message::{Message, Validate};
use crate::mtype::MType;
use crate::peripheral::frc::{self, SendParams, SendSelectiveParams};
use crate::peripheral::PeripheralCommand;
use serde::{Deserialize, Serialize};

/// `pCmd` the FRC handler dispatches to the sensor standard.
const SENSOR_FRC_PCMD: u8 = 0x7B;
/// Offset added to every valid value; lower raw values are status codes.
const VALUE_OFFSET_2BITS: u32 = 2;
const VALUE_OFFSET: u32 = 4;
/// Bytes per bit plane of a 2-bit FRC.
const PLANE_LEN: usize = 32;
const NODE_SLOTS: usize = MAX_NODE_ADDR as usize + 1;

/// FRC commands defined by the sensor standard.
pub mod command {
    pub const FRC_2BITS: u8 = 0x10;
    pub const FRC_1BYTE: u8 = 0x90;
    pub const FRC_2BYTES: u8 = 0xE0;
    pub const FRC_4BYTES: u8 = 0xF9;
}

/// Sleep the nodes once the FRC round is done.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SleepAfterFrc {
    pub time: u16,
    pub control: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SensorFrcParams {
    pub sensor_type: u8,
    #[serde(default)]
    pub sensor_index: u8,
    pub frc_command: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_nodes: Option<Vec<u8>>,
    /// Carried out by the daemon after the round; not part of the frame.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sleep_after_frc: Option<SleepAfterFrc>,
}

impl Validate for SensorFrcParams {
    fn validate(&self) -> Result<(), ValidationError> {
        if !matches!(
            self.frc_command,
            command::FRC_2BITS | command::FRC_1BYTE | command::FRC_2BYTES | command::FRC_4BYTES
        ) {
            return Err(ValidationError::Malformed {
                field: "frcCommand",
                reason: format!("{:#04x} is not a sensor FRC command", self.frc_command),
            });
        }
        if Quantity::lookup(self.sensor_type).is_none() {
            return Err(ValidationError::Malformed {
                field: "sensorType",
                reason: format!("unknown sensor type {:#04x}", self.sensor_type),
            });
        }
        if let Some(nodes) = &self.selected_nodes {
            SendSelectiveParams {
                frc_command: self.frc_command,
                selected_nodes: nodes.clone(),
                user_data: Vec::new(),
            }
            .validate()?;
        }
        Ok(())
    }
}

impl SensorFrcParams {
    fn user_data(&self) -> Vec<u8> {
        vec![pnum::SENSOR, SENSOR_FRC_PCMD, self.sensor_type, self.sensor_index]
    }

    /// FRC Send, or SendSelective when nodes are selected, addressed to
    /// the coordinator.
    pub fn build_request(&self, hwp_id: Option<u16>) -> FrameResult<HdpRequest> {
        self.validate()?;
        match &self.selected_nodes {
            Some(nodes) => frc::SendSelective::build_request(
                COORDINATOR_ADDR,
                hwp_id,
                &SendSelectiveParams {
                    frc_command: self.frc_command,
                    selected_nodes: nodes.clone(),
                    user_data: self.user_data(),
                },
            ),
            None => frc::Send::build_request(
                COORDINATOR_ADDR,
                hwp_id,
                &SendParams {
                    frc_command: self.frc_command,
                    user_data: self.user_data(),
                },
            ),
        }
    }

    pub fn context(&self) -> SensorFrcContext {
        let mut selected_nodes = self.selected_nodes.clone();
        if let Some(nodes) = &mut selected_nodes {
            nodes.sort_unstable();
            nodes.dedup();
        }
        SensorFrcContext {
            sensor_type: self.sensor_type,
            frc_command: self.frc_command,
            selected_nodes,
        }
    }
}

/// State needed to decode the FRC response of a sensor request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SensorFrcContext {
    pub sensor_type: u8,
    pub frc_command: u8,
    /// Ascending; `None` for a non-selective FRC.
    pub selected_nodes: Option<Vec<u8>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SensorFrcReading {
    pub n_adr: u8,
    #[serde(flatten)]
    pub descriptor: SensorDescriptor,
    /// `None` when the node did not answer or reported an error.
    pub value: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SensorFrcResult {
    pub sensors: Vec<SensorFrcReading>,
}

impl SensorFrcContext {
    /// Value slots available in `len` bytes of FRC data.
    fn capacity(&self, len: usize) -> usize {
        let slots = match self.frc_command {
            command::FRC_2BITS => len.saturating_sub(PLANE_LEN) * 8,
            command::FRC_1BYTE => len,
            command::FRC_2BYTES => len / 2,
            _ => len / 4,
        };
        slots.min(NODE_SLOTS)
    }

    fn required_slots(&self) -> usize {
        match &self.selected_nodes {
            Some(nodes) => nodes.len() + 1,
            None => NODE_SLOTS,
        }
    }

    /// Whether the Send response alone cannot hold every requested value.
    pub fn needs_extra_result(&self) -> bool {
        self.required_slots() > self.capacity(frc::DATA_LEN)
    }

    fn raw_slot(&self, data: &[u8], index: usize) -> u32 {
        match self.frc_command {
            command::FRC_2BITS => {
                let bit = |byte: usize| u32::from((data[byte] >> (index % 8)) & 1);
                bit(index / 8) | (bit(PLANE_LEN + index / 8) << 1)
            }
            command::FRC_1BYTE => u32::from(data[index]),
            command::FRC_2BYTES => u32::from(u16::from_le_bytes([data[2 * index], data[2 * index + 1]])),
            _ => u32::from_le_bytes([
                data[4 * index],
                data[4 * index + 1],
                data[4 * index + 2],
                data[4 * index + 3],
            ]),
        }
    }

    fn decode_value(&self, raw: u32) -> Option<f64> {
        if self.frc_command == command::FRC_2BITS {
            return raw.checked_sub(VALUE_OFFSET_2BITS).map(f64::from);
        }
        if raw < VALUE_OFFSET {
            return None;
        }
        let quantity = Quantity::lookup(self.sensor_type)?;
        match (self.frc_command, self.sensor_type) {
            // Half-degree resolution from -20 °C.
            (command::FRC_1BYTE, 0x01) => Some(f64::from(raw) / 2.0 - 22.0),
            (command::FRC_1BYTE, 0x02 | 0x03) => Some(f64::from(raw - VALUE_OFFSET) * 16.0),
            (command::FRC_2BYTES, _) => quantity.decode((raw - VALUE_OFFSET) & 0xFFFF),
            _ => quantity.decode(raw - VALUE_OFFSET),
        }
    }

    /// Decode the values of a Send (or SendSelective) response, extended by
    /// an ExtraResult response when given.
    pub fn parse(
        &self,
        send: &HdpResponse,
        extra: Option<&HdpResponse>,
    ) -> FrameResult<Vec<SensorFrcReading>> {
        let result = match self.selected_nodes {
            Some(_) => frc::SendSelective::parse_response(send)?,
            None => frc::Send::parse_response(send)?,
        };
        let mut data = result.frc_data;
        if let Some(extra) = extra {
            data.extend(frc::ExtraResult::parse_response(extra)?);
        }
        let capacity = self.capacity(data.len());
        let descriptor = SensorDescriptor::for_type(self.sensor_type);
        let reading = |n_adr: u8, index: usize| SensorFrcReading {
            n_adr,
            descriptor: descriptor.clone(),
            value: self.decode_value(self.raw_slot(&data, index)),
        };

        match &self.selected_nodes {
            Some(nodes) => {
                if nodes.len() + 1 > capacity {
                    return Err(FrameError::InvalidValue {
                        field: "frcData",
                        reason: format!(
                            "{} selected nodes but room for {}; ExtraResult is required",
                            nodes.len(),
                            capacity.saturating_sub(1)
                        ),
                    });
                }
                Ok(nodes
                    .iter()
                    .enumerate()
                    .map(|(k, &addr)| reading(addr, k + 1))
                    .collect())
            }
            None => Ok((1..capacity).map(|addr| reading(addr as u8, addr)).collect()),
        }
    }
}

/// `iqrfSensor_Frc`
#[derive(Debug, Clone, Copy)]
pub struct SensorFrc;

impl Message for SensorFrc {
    const M_TYPE: MType = MType::SensorFrc;
    type Req = StdRequest<SensorFrcParams>;
    type Rsp = StdResponse<SensorFrcResult>;
}
