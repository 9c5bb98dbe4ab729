// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Peripheral command adapters.
//!
//! Each command is a zero-sized type implementing [`PeripheralCommand`]: it
//! knows its `pNum`/`pCmd`, how to pack typed parameters into `pData`, and
//! how to read the response `pData` back into a typed result. Adapters are
//! stateless; [`registry`] exposes them type-erased, keyed by mType or by
//! peripheral and command.

pub mod binaryoutput;
pub mod coordinator;
pub mod explore;
pub mod frc;
pub mod io;
pub mod led;
pub mod memory;
pub mod node;
pub mod os;
pub mod registry;
pub mod sensor;
pub mod thermometer;
pub mod uart;

use crate::error::{FrameError, FrameResult};
use crate::hdp::{HdpRequest, HdpResponse, PayloadReader, PayloadWriter};
use crate::message::{Empty, Validate};
use crate::mtype::MType;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Result of an acknowledgement-only command, serialized as `{}`.
pub type Ack = Empty;

/// Typed translation between one peripheral command and its DPA frames.
pub trait PeripheralCommand {
    const M_TYPE: MType;
    const PNUM: u8;
    const PCMD: u8;
    /// Name of a scalar result inside the `result` object.
    /// `None` when `Output` already serializes as the whole object.
    const RESULT_KEY: Option<&'static str> = None;

    type Params: Serialize + DeserializeOwned + Validate;
    type Output: Serialize + DeserializeOwned;

    fn pnum(_params: &Self::Params) -> u8 {
        Self::PNUM
    }

    fn pcmd(_params: &Self::Params) -> u8 {
        Self::PCMD
    }

    fn encode(_params: &Self::Params, _w: &mut PayloadWriter) -> FrameResult<()> {
        Ok(())
    }

    fn decode(frame: &HdpResponse, r: &mut PayloadReader<'_>) -> FrameResult<Self::Output>;

    /// Whether `frame` answers this command.
    fn matches_response(frame: &HdpResponse) -> bool {
        frame.p_num == Self::PNUM && frame.command() == Self::PCMD
    }

    /// Validate `params` and pack them into a request frame.
    fn build_request(n_adr: u16, hwp_id: Option<u16>, params: &Self::Params) -> FrameResult<HdpRequest> {
        params.validate()?;
        let mut w = PayloadWriter::new();
        Self::encode(params, &mut w)?;
        Ok(HdpRequest {
            n_adr,
            p_num: Self::pnum(params),
            p_cmd: Self::pcmd(params),
            hwp_id,
            p_data: w.into_inner(),
        })
    }

    /// Check header and response code, then read the typed result.
    /// Trailing `pData` bytes are an error.
    fn parse_response(frame: &HdpResponse) -> FrameResult<Self::Output> {
        if !Self::matches_response(frame) {
            return Err(FrameError::UnexpectedResponse {
                pnum: frame.p_num,
                pcmd: frame.p_cmd,
                expected_pnum: Self::PNUM,
                expected_pcmd: Self::PCMD | crate::hdp::RESPONSE_FLAG,
            });
        }
        if !frame.is_ok() {
            return Err(FrameError::ResponseCode {
                code: frame.r_code,
                name: crate::hdp::rcode::name(frame.r_code),
            });
        }
        let mut reader = PayloadReader::new(&frame.p_data);
        let output = Self::decode(frame, &mut reader)?;
        reader.finish()?;
        log::trace!(
            "decoded {} from nAdr={} ({} bytes)",
            Self::M_TYPE,
            frame.n_adr,
            frame.p_data.len()
        );
        Ok(output)
    }

    /// [`parse_response`](Self::parse_response) wrapped for the `result` object.
    fn parse_result(frame: &HdpResponse) -> FrameResult<PeripheralResult<Self>>
    where
        Self: Sized,
    {
        Self::parse_response(frame).map(PeripheralResult)
    }
}

/// `result` object of a standard response.
///
/// Scalar outputs are nested under the command's `RESULT_KEY`, e.g.
/// `{"temperature": 21.5}`; structured outputs serialize as they are.
pub struct PeripheralResult<C: PeripheralCommand>(pub C::Output);

impl<C: PeripheralCommand> PeripheralResult<C> {
    pub fn into_inner(self) -> C::Output {
        self.0
    }
}

impl<C: PeripheralCommand> fmt::Debug for PeripheralResult<C>
where
    C::Output: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PeripheralResult").field(&self.0).finish()
    }
}

impl<C: PeripheralCommand> Clone for PeripheralResult<C>
where
    C::Output: Clone,
{
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<C: PeripheralCommand> PartialEq for PeripheralResult<C>
where
    C::Output: PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl<C: PeripheralCommand> Serialize for PeripheralResult<C> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;
        match C::RESULT_KEY {
            Some(key) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry(key, &self.0)?;
                map.end()
            }
            None => self.0.serialize(serializer),
        }
    }
}

impl<'de, C: PeripheralCommand> Deserialize<'de> for PeripheralResult<C> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        use serde::de::Error;
        match C::RESULT_KEY {
            Some(key) => {
                let mut value = serde_json::Value::deserialize(deserializer)?;
                let inner = value
                    .get_mut(key)
                    .map(serde_json::Value::take)
                    .ok_or_else(|| D::Error::missing_field(key))?;
                serde_json::from_value(inner).map(PeripheralResult).map_err(D::Error::custom)
            }
            None => C::Output::deserialize(deserializer).map(PeripheralResult),
        }
    }
}

/// Expands to the constant part of a `PeripheralCommand` impl.
macro_rules! command_header {
    ($mtype:ident, $pnum:expr, $pcmd:expr, $params:ty => $output:ty) => {
        const M_TYPE: $crate::mtype::MType = $crate::mtype::MType::$mtype;
        const PNUM: u8 = $pnum;
        const PCMD: u8 = $pcmd;
        type Params = $params;
        type Output = $output;
    };
    ($mtype:ident, $pnum:expr, $pcmd:expr, $params:ty => $output:ty, $key:literal) => {
        command_header!($mtype, $pnum, $pcmd, $params => $output);
        const RESULT_KEY: Option<&'static str> = Some($key);
    };
}
pub(crate) use command_header;

/// Declares a zero-sized command type.
macro_rules! command_type {
    ($( $(#[$meta:meta])* $name:ident ),+ $(,)?) => {
        $(
            $(#[$meta])*
            #[derive(Debug, Clone, Copy, Default)]
            pub struct $name;
        )+
    };
}
pub(crate) use command_type;

/// Addresses whose bit is set in a little-endian bitmap. A set bit past
/// index 255 is an error.
pub(crate) fn bitmap_to_indexes(field: &'static str, bitmap: &[u8]) -> FrameResult<Vec<u8>> {
    let mut indexes = Vec::new();
    for (byte, bits) in bitmap.iter().enumerate() {
        for bit in (0..8).filter(|bit| bits & (1 << bit) != 0) {
            let index = byte * 8 + bit;
            indexes.push(u8::try_from(index).map_err(|_| FrameError::InvalidValue {
                field,
                reason: format!("bit {} is past index 255", index),
            })?);
        }
    }
    Ok(indexes)
}

/// Bitmap of `len` bytes with the given indexes set.
pub(crate) fn indexes_to_bitmap(
    field: &'static str,
    indexes: &[u8],
    len: usize,
) -> Result<Vec<u8>, crate::error::ValidationError> {
    let mut bitmap = vec![0u8; len];
    for &i in indexes {
        let byte = i as usize / 8;
        if byte >= len {
            return Err(crate::error::ValidationError::out_of_range(
                field,
                i as i64,
                0,
                (len * 8 - 1) as i64,
            ));
        }
        bitmap[byte] |= 1 << (i % 8);
    }
    Ok(bitmap)
}
