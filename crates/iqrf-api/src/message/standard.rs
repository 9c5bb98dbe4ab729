// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Embedded peripheral and IQRF standard messages.
//!
//! Request: `{ nAdr, hwpId?, param: {...} }`.
//! Response: `{ nAdr, hwpId, rCode, dpaVal, result: {...}, errorStr? }`.

use super::{Message, Validate};
use crate::error::{ApiError, ApiResult, FrameError, ValidationError};
use crate::hdp::{HdpRequest, HdpResponse};
use crate::mtype::MType;
use crate::peripheral::sensor::frc::SensorFrcParams;
use crate::peripheral::{registry, PeripheralCommand, PeripheralResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::marker::PhantomData;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StdRequest<P> {
    pub n_adr: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hwp_id: Option<u16>,
    pub param: P,
}

impl<P> StdRequest<P> {
    pub fn new(n_adr: u16, param: P) -> Self {
        Self {
            n_adr,
            hwp_id: None,
            param,
        }
    }

    pub fn with_hwp_id(mut self, hwp_id: u16) -> Self {
        self.hwp_id = Some(hwp_id);
        self
    }
}

impl<P: Validate> Validate for StdRequest<P> {
    fn validate(&self) -> Result<(), ValidationError> {
        self.param.validate()
    }
}

impl StdRequest<Value> {
    /// Build the frame an untyped request stands for, running the same
    /// checks as the typed adapter of `m_type`.
    pub fn to_frame(&self, m_type: MType) -> ApiResult<HdpRequest> {
        if m_type == MType::SensorFrc {
            let params: SensorFrcParams = serde_json::from_value(self.param.clone())?;
            reject_unknown_fields(&self.param, &serde_json::to_value(&params)?)?;
            return params.build_request(self.hwp_id).map_err(params_error);
        }
        let adapter = registry::lookup_by_mtype(m_type)
            .ok_or_else(|| ApiError::UnknownMType(format!("{} has no adapter", m_type)))?;
        adapter.build_request_json(self.n_adr, self.hwp_id, &self.param)
    }
}

/// Surface parameter validation failures as [`ApiError::Validation`].
pub(crate) fn params_error(e: FrameError) -> ApiError {
    match e {
        FrameError::Params(v) => ApiError::Validation(v),
        other => ApiError::Frame(other),
    }
}

/// Fail when `input` carries a non-null field that did not survive the
/// typed round trip into `canonical`.
pub(crate) fn reject_unknown_fields(input: &Value, canonical: &Value) -> Result<(), ValidationError> {
    fn walk(input: &Value, canonical: &Value, path: &mut Vec<String>) -> Result<(), ValidationError> {
        match (input, canonical) {
            (Value::Object(fields), Value::Object(known)) => {
                for (key, value) in fields {
                    if value.is_null() {
                        continue;
                    }
                    path.push(key.clone());
                    match known.get(key) {
                        Some(inner) => walk(value, inner, path)?,
                        None => {
                            return Err(ValidationError::Malformed {
                                field: "param",
                                reason: format!("unknown field `{}`", path.join(".")),
                            })
                        }
                    }
                    path.pop();
                }
                Ok(())
            }
            (Value::Array(items), Value::Array(known)) => {
                for (i, (item, inner)) in items.iter().zip(known).enumerate() {
                    path.push(i.to_string());
                    walk(item, inner, path)?;
                    path.pop();
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }
    walk(input, canonical, &mut Vec::new())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StdResponse<R> {
    pub n_adr: u16,
    pub hwp_id: u16,
    pub r_code: u8,
    pub dpa_val: u8,
    pub result: R,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_str: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta_data: Option<Value>,
}

impl<R> StdResponse<R> {
    /// Wrap an adapter result with the header fields of its frame.
    pub fn from_frame(frame: &HdpResponse, result: R) -> Self {
        Self {
            n_adr: frame.n_adr,
            hwp_id: frame.hwp_id,
            r_code: frame.r_code,
            dpa_val: frame.dpa_val,
            result,
            error_str: None,
            meta_data: None,
        }
    }
}

/// Standard-API message of peripheral command `C`.
pub struct Standard<C>(PhantomData<fn() -> C>);

impl<C: PeripheralCommand> Message for Standard<C> {
    const M_TYPE: MType = C::M_TYPE;
    type Req = StdRequest<C::Params>;
    type Rsp = StdResponse<PeripheralResult<C>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{Request, Response};
    use crate::peripheral::thermometer;
    use serde_json::json;

    #[test]
    fn test_thermometer_read_envelope() {
        let req = Request::of::<Standard<thermometer::Read>>(
            "t1",
            StdRequest::new(2, Default::default()),
        );
        assert_eq!(
            req.to_value().unwrap(),
            json!({
                "mType": "iqrfEmbedThermometer_Read",
                "data": {"msgId": "t1", "req": {"nAdr": 2, "param": {}}}
            })
        );
    }

    #[test]
    fn test_scalar_result_is_named() {
        let text = json!({
            "mType": "iqrfEmbedThermometer_Read",
            "data": {
                "msgId": "t1",
                "rsp": {"nAdr": 2, "hwpId": 0, "rCode": 0, "dpaVal": 64,
                        "result": {"temperature": 24.5}},
                "insId": "iqrfgd2-1",
                "status": 0
            }
        })
        .to_string();
        let rsp = Response::<StdResponse<PeripheralResult<thermometer::Read>>>::decode_for::<
            Standard<thermometer::Read>,
        >(&text)
        .unwrap();
        let body = rsp.outcome.into_result().unwrap();
        assert_eq!(body.result.0, Some(24.5));
        assert_eq!(body.dpa_val, 64);
    }
}
