// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! IQRF Sensor standard (pNum 0x5E).

pub mod frc;
pub mod quantity;

use super::{command_header, command_type, indexes_to_bitmap, PeripheralCommand};
use crate::error::{FrameError, FrameResult, ValidationError};
use crate::hdp::{pnum, HdpResponse, PayloadReader, PayloadWriter};
use crate::message::{Empty, Validate};
use quantity::{Quantity, SensorDescriptor, Width};
use serde::{Deserialize, Serialize};

pub use frc::{SensorFrc, SensorFrcContext, SensorFrcParams, SensorFrcReading};

/// Sensors addressable by the index bitmap.
pub const MAX_SENSORS: usize = 32;
const INDEX_BITMAP_LEN: usize = 4;

command_type!(Enumerate, ReadSensorsWithTypes);

impl PeripheralCommand for Enumerate {
    command_header!(SensorEnumerate, pnum::SENSOR, 0x3E, Empty => Vec<SensorDescriptor>, "sensors");

    fn decode(_frame: &HdpResponse, r: &mut PayloadReader<'_>) -> FrameResult<Self::Output> {
        Ok(r.read_rest().iter().map(|&t| SensorDescriptor::for_type(t)).collect())
    }
}

/// Decoded value of one sensor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SensorValue {
    Number(f64),
    Block(Vec<u8>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SensorReading {
    #[serde(flatten)]
    pub descriptor: SensorDescriptor,
    /// `None` when the sensor reported its error value.
    pub value: Option<SensorValue>,
}

/// Read one `type, value` pair; the type decides the value width.
pub(crate) fn read_typed_value(r: &mut PayloadReader<'_>) -> FrameResult<SensorReading> {
    let offset = r.offset();
    let sensor_type = r.read_u8()?;
    let width = Width::of(sensor_type).ok_or_else(|| FrameError::InvalidValue {
        field: "type",
        reason: format!("unsupported sensor type {:#04x} at offset {}", sensor_type, offset),
    })?;
    let value = match width.bytes() {
        Some(n) => {
            let raw = r.read_uint_le(n)?;
            match Quantity::lookup(sensor_type) {
                Some(q) => q.decode(raw).map(SensorValue::Number),
                None => Some(SensorValue::Number(f64::from(raw))),
            }
        }
        None => {
            let len = r.read_u8()? as usize;
            Some(SensorValue::Block(r.read_bytes(len)?.to_vec()))
        }
    };
    Ok(SensorReading {
        descriptor: SensorDescriptor::for_type(sensor_type),
        value,
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadSensorsParams {
    /// Indexes to read; all sensors when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sensor_indexes: Option<Vec<u8>>,
}

impl Validate for ReadSensorsParams {
    fn validate(&self) -> Result<(), ValidationError> {
        if let Some(indexes) = &self.sensor_indexes {
            indexes_to_bitmap("sensorIndexes", indexes, INDEX_BITMAP_LEN)?;
        }
        Ok(())
    }
}

impl PeripheralCommand for ReadSensorsWithTypes {
    command_header!(SensorReadSensorsWithTypes, pnum::SENSOR, 0x01, ReadSensorsParams => Vec<SensorReading>, "sensors");

    fn encode(p: &Self::Params, w: &mut PayloadWriter) -> FrameResult<()> {
        match &p.sensor_indexes {
            Some(indexes) => w.write_bytes(&indexes_to_bitmap("sensorIndexes", indexes, INDEX_BITMAP_LEN)?),
            None => w.write_u32_le(u32::MAX),
        }
    }

    fn decode(_frame: &HdpResponse, r: &mut PayloadReader<'_>) -> FrameResult<Self::Output> {
        let mut readings = Vec::new();
        while !r.is_empty() {
            readings.push(read_typed_value(r)?);
        }
        Ok(readings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_enumerate_describes_types() {
        let req = Enumerate::build_request(1, None, &Empty {}).unwrap();
        let rsp = HdpResponse::answering(&req, vec![0x01, 0x80]);
        let sensors = Enumerate::parse_response(&rsp).unwrap();
        assert_eq!(sensors[0].short_name, "T");
        assert_eq!(sensors[1].name, "Relative humidity");
    }

    #[test]
    fn test_read_all_by_default() {
        let req = ReadSensorsWithTypes::build_request(1, None, &ReadSensorsParams::default()).unwrap();
        assert_eq!(req.p_data, vec![0xFF; 4]);
        let req = ReadSensorsWithTypes::build_request(
            1,
            None,
            &ReadSensorsParams { sensor_indexes: Some(vec![0, 2]) },
        )
        .unwrap();
        assert_eq!(req.p_data, vec![0b101, 0, 0, 0]);
    }

    #[test]
    fn test_readings_use_type_widths() {
        let req = ReadSensorsWithTypes::build_request(1, None, &ReadSensorsParams::default()).unwrap();
        let rsp = HdpResponse::answering(
            &req,
            vec![0x01, 0x88, 0x01, 0x80, 0xEE, 0xA1, 0x10, 0x00, 0x00, 0x00, 0xC0, 0x02, 0xAB, 0xCD],
        );
        let readings = ReadSensorsWithTypes::parse_response(&rsp).unwrap();
        assert_eq!(readings.len(), 4);
        assert_eq!(readings[0].value, Some(SensorValue::Number(24.5)));
        assert_eq!(readings[1].value, None);
        assert_eq!(readings[2].value, Some(SensorValue::Number(16.0)));
        assert_eq!(readings[3].value, Some(SensorValue::Block(vec![0xAB, 0xCD])));

        let value = serde_json::to_value(&readings[0]).unwrap();
        assert_eq!(value["type"], json!(1));
        assert_eq!(value["value"], json!(24.5));
    }

    #[test]
    fn test_truncated_value_fails() {
        let req = ReadSensorsWithTypes::build_request(1, None, &ReadSensorsParams::default()).unwrap();
        let rsp = HdpResponse::answering(&req, vec![0x01, 0x88]);
        assert!(ReadSensorsWithTypes::parse_response(&rsp).is_err());
    }
}
