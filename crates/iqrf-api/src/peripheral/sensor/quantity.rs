// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Sensor quantity table.
//!
//! The type byte fixes the wire width: 0x01-0x7F are 2 bytes, 0x80-0x9F
//! 1 byte, 0xA0-0xBF 4 bytes and 0xC0-0xDF a length-prefixed data block.

use serde::{Deserialize, Serialize};

/// Wire width class of a sensor value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Width {
    One,
    Two,
    Four,
    /// Length byte followed by that many bytes.
    Block,
}

impl Width {
    pub fn of(sensor_type: u8) -> Option<Width> {
        match sensor_type {
            0x01..=0x7F => Some(Width::Two),
            0x80..=0x9F => Some(Width::One),
            0xA0..=0xBF => Some(Width::Four),
            0xC0..=0xDF => Some(Width::Block),
            _ => None,
        }
    }

    pub fn bytes(self) -> Option<usize> {
        match self {
            Width::One => Some(1),
            Width::Two => Some(2),
            Width::Four => Some(4),
            Width::Block => None,
        }
    }
}

/// How a raw integer becomes a physical value.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Scale {
    /// Unsigned raw divided by the factor.
    Unsigned(f64),
    /// Two's complement of the wire width, divided by the factor.
    Signed(f64),
    /// Unsigned raw divided by the factor, then offset.
    Offset(f64, f64),
}

/// Table entry for one sensor type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quantity {
    pub sensor_type: u8,
    pub name: &'static str,
    pub short_name: &'static str,
    pub unit: &'static str,
    pub decimal_places: u8,
    error: u32,
    scale: Scale,
}

macro_rules! quantities {
    ($( $ty:literal, $name:literal, $short:literal, $unit:literal, $places:literal, $err:literal, $scale:expr; )+) => {
        static QUANTITIES: &[Quantity] = &[
            $( Quantity {
                sensor_type: $ty,
                name: $name,
                short_name: $short,
                unit: $unit,
                decimal_places: $places,
                error: $err,
                scale: $scale,
            }, )+
        ];
    };
}

use Scale::{Offset, Signed, Unsigned};

quantities! {
    0x01, "Temperature", "T", "°C", 4, 0x8000, Signed(16.0);
    0x02, "Carbon dioxide", "CO2", "ppm", 0, 0x8000, Unsigned(1.0);
    0x03, "Volatile organic compound", "VOC", "ppm", 0, 0x8000, Unsigned(1.0);
    0x04, "Extra-low voltage", "U", "V", 3, 0x8000, Signed(1000.0);
    0x05, "Earth's magnetic field", "B", "T", 7, 0x8000, Signed(10_000_000.0);
    0x06, "Low voltage", "U", "V", 3, 0x8000, Signed(1000.0);
    0x07, "Current", "I", "A", 3, 0x8000, Signed(1000.0);
    0x08, "Power", "P", "W", 2, 0xFFFF, Unsigned(4.0);
    0x09, "Mains frequency", "f", "Hz", 3, 0xFFFF, Unsigned(1000.0);
    0x0A, "Timespan", "t", "s", 0, 0xFFFF, Unsigned(1.0);
    0x0B, "Illuminance", "Ev", "lx", 0, 0xFFFF, Unsigned(1.0);
    0x0C, "Nitrogen dioxide", "NO2", "ppm", 3, 0xFFFF, Unsigned(1000.0);
    0x0D, "Sulfur dioxide", "SO2", "ppm", 3, 0xFFFF, Unsigned(1000.0);
    0x0E, "Carbon monoxide", "CO", "ppm", 2, 0xFFFF, Unsigned(100.0);
    0x0F, "Ozone", "O3", "ppm", 3, 0xFFFF, Unsigned(1000.0);
    0x10, "Atmospheric pressure", "p", "hPa", 4, 0xFFFF, Unsigned(16.0);
    0x11, "Color temperature", "Tc", "K", 0, 0xFFFF, Unsigned(1.0);
    0x12, "Particulates PM2.5", "PM2.5", "µg/m3", 2, 0xFFFF, Unsigned(4.0);
    0x13, "Sound pressure level", "Lp", "dB", 4, 0xFFFF, Unsigned(16.0);
    0x14, "Altitude", "h", "m", 2, 0xFFFF, Offset(4.0, -1024.0);
    0x15, "Acceleration", "a", "m/s2", 8, 0x8000, Signed(256.0);
    0x16, "Ammonia", "NH3", "ppm", 1, 0xFFFF, Unsigned(10.0);
    0x17, "Methane", "CH4", "%", 3, 0xFFFF, Unsigned(1000.0);
    0x18, "Short length", "l", "m", 3, 0xFFFF, Unsigned(1000.0);
    0x19, "Particulates PM1", "PM1", "µg/m3", 2, 0xFFFF, Unsigned(4.0);
    0x1A, "Particulates PM4", "PM4", "µg/m3", 2, 0xFFFF, Unsigned(4.0);
    0x1B, "Particulates PM10", "PM10", "µg/m3", 2, 0xFFFF, Unsigned(4.0);
    0x1C, "Total volatile organic compound", "TVOC", "µg/m3", 0, 0xFFFF, Unsigned(1.0);
    0x1D, "Nitrogen oxides", "NOX", "", 0, 0xFFFF, Unsigned(1.0);
    0x80, "Relative humidity", "RH", "%", 1, 0xEE, Unsigned(2.0);
    0x81, "Binary data7", "bin7", "", 0, 0x80, Unsigned(1.0);
    0x82, "Power factor", "cos θ", "", 3, 0xEE, Unsigned(200.0);
    0x83, "UV index", "UV", "", 3, 0xFF, Unsigned(8.0);
    0x84, "pH", "pH", "", 4, 0xFF, Unsigned(16.0);
    0x85, "RSSI", "RSSI", "dBm", 1, 0xFF, Offset(2.0, -127.0);
    0xA0, "Binary data30", "bin30", "", 0, 0x8000_0000, Unsigned(1.0);
    0xA1, "Consumption", "E", "Wh", 0, 0xFFFF_FFFF, Unsigned(1.0);
    0xA2, "Datetime", "DT", "", 0, 0xFFFF_FFFF, Unsigned(1.0);
    0xA3, "Timespan long", "T", "s", 4, 0xFFFF_FFFF, Unsigned(16.0);
    0xC0, "Data block", "datablock", "", 0, 0, Unsigned(1.0);
}

impl Quantity {
    pub fn lookup(sensor_type: u8) -> Option<&'static Quantity> {
        QUANTITIES.iter().find(|q| q.sensor_type == sensor_type)
    }

    pub fn width(&self) -> Option<Width> {
        Width::of(self.sensor_type)
    }

    /// Physical value of a raw reading, `None` for the error value.
    pub fn decode(&self, raw: u32) -> Option<f64> {
        let width = self.width()?.bytes()?;
        // Binary data types flag errors with the top bit alone.
        let is_error = match self.sensor_type {
            0x81 | 0xA0 => raw & self.error != 0,
            _ => raw == self.error,
        };
        if is_error {
            return None;
        }
        let value = match self.scale {
            Unsigned(div) => f64::from(raw) / div,
            Signed(div) => f64::from(sign_extend(raw, width)) / div,
            Offset(div, offset) => f64::from(raw) / div + offset,
        };
        Some(value)
    }

    pub fn descriptor(&self) -> SensorDescriptor {
        SensorDescriptor {
            sensor_type: self.sensor_type,
            name: self.name.to_string(),
            short_name: self.short_name.to_string(),
            unit: self.unit.to_string(),
            decimal_places: self.decimal_places,
        }
    }
}

fn sign_extend(raw: u32, width: usize) -> i32 {
    let shift = 32 - 8 * width as u32;
    ((raw << shift) as i32) >> shift
}

/// Named description of a sensor type, as reported by Enumerate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SensorDescriptor {
    #[serde(rename = "type")]
    pub sensor_type: u8,
    pub name: String,
    pub short_name: String,
    pub unit: String,
    pub decimal_places: u8,
}

impl SensorDescriptor {
    /// Descriptor for any type byte; unknown types get a placeholder name.
    pub fn for_type(sensor_type: u8) -> Self {
        match Quantity::lookup(sensor_type) {
            Some(q) => q.descriptor(),
            None => SensorDescriptor {
                sensor_type,
                name: "Unknown".into(),
                short_name: "?".into(),
                unit: "?".into(),
                decimal_places: 0,
            },
        }
    }
}
