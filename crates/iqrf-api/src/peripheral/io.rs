// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! IO peripheral (pNum 0x09).

use super::{command_header, command_type, Ack, PeripheralCommand};
use crate::error::{FrameResult, ValidationError};
use crate::hdp::{pnum, HdpResponse, PayloadReader, PayloadWriter, DPA_MAX_DATA_LENGTH};
use crate::message::{Empty, Validate};
use serde::{Deserialize, Serialize};

/// Port number that marks a delay entry in a Set request.
pub const DELAY_PORT: u8 = 0xFF;
const ENTRY_LEN: usize = 3;

command_type!(Direction, Set, Get);

/// Port, mask and value triplet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortTriplet {
    pub port: u8,
    pub mask: u8,
    pub value: u8,
}

/// Entry of a Set request: a port write or a delay in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SetEntry {
    Port(PortTriplet),
    Delay { delay: u16 },
}

fn check_entries(count: usize) -> Result<(), ValidationError> {
    let max = DPA_MAX_DATA_LENGTH / ENTRY_LEN;
    if count == 0 || count > max {
        return Err(ValidationError::length("ports", count, format!("1..={}", max)));
    }
    Ok(())
}

fn write_triplet(t: &PortTriplet, w: &mut PayloadWriter) -> FrameResult<()> {
    w.write_u8(t.port)?;
    w.write_u8(t.mask)?;
    w.write_u8(t.value)
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DirectionParams {
    pub ports: Vec<PortTriplet>,
}

impl Validate for DirectionParams {
    fn validate(&self) -> Result<(), ValidationError> {
        check_entries(self.ports.len())
    }
}

impl PeripheralCommand for Direction {
    command_header!(IoDirection, pnum::IO, 0x00, DirectionParams => Ack);

    fn encode(p: &Self::Params, w: &mut PayloadWriter) -> FrameResult<()> {
        p.ports.iter().try_for_each(|t| write_triplet(t, w))
    }

    fn decode(_frame: &HdpResponse, _r: &mut PayloadReader<'_>) -> FrameResult<Self::Output> {
        Ok(Ack {})
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SetParams {
    pub ports: Vec<SetEntry>,
}

impl Validate for SetParams {
    fn validate(&self) -> Result<(), ValidationError> {
        check_entries(self.ports.len())?;
        for entry in &self.ports {
            if let SetEntry::Port(t) = entry {
                if t.port == DELAY_PORT {
                    return Err(ValidationError::Malformed {
                        field: "port",
                        reason: "0xff is reserved for delays".into(),
                    });
                }
            }
        }
        Ok(())
    }
}

impl PeripheralCommand for Set {
    command_header!(IoSet, pnum::IO, 0x01, SetParams => Ack);

    fn encode(p: &Self::Params, w: &mut PayloadWriter) -> FrameResult<()> {
        for entry in &p.ports {
            match entry {
                SetEntry::Port(t) => write_triplet(t, w)?,
                SetEntry::Delay { delay } => {
                    w.write_u8(DELAY_PORT)?;
                    w.write_u16_le(*delay)?;
                }
            }
        }
        Ok(())
    }

    fn decode(_frame: &HdpResponse, _r: &mut PayloadReader<'_>) -> FrameResult<Self::Output> {
        Ok(Ack {})
    }
}

impl PeripheralCommand for Get {
    command_header!(IoGet, pnum::IO, 0x02, Empty => Vec<u8>, "ports");

    fn decode(_frame: &HdpResponse, r: &mut PayloadReader<'_>) -> FrameResult<Self::Output> {
        Ok(r.read_rest().to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_set_mixes_ports_and_delays() {
        let params: SetParams = serde_json::from_value(json!({
            "ports": [
                {"port": 0, "mask": 1, "value": 1},
                {"delay": 500},
                {"port": 0, "mask": 1, "value": 0}
            ]
        }))
        .unwrap();
        let req = Set::build_request(2, None, &params).unwrap();
        assert_eq!(req.p_data, vec![0, 1, 1, 0xFF, 0xF4, 0x01, 0, 1, 0]);
    }

    #[test]
    fn test_explicit_delay_port_is_rejected() {
        let params = SetParams {
            ports: vec![SetEntry::Port(PortTriplet { port: 0xFF, mask: 0, value: 0 })],
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_get_returns_port_values() {
        let req = Get::build_request(2, None, &Empty {}).unwrap();
        let rsp = HdpResponse::answering(&req, vec![0x20, 0x00, 0x01]);
        let value = serde_json::to_value(Get::parse_result(&rsp).unwrap()).unwrap();
        assert_eq!(value, json!({"ports": [0x20, 0, 1]}));
    }
}
