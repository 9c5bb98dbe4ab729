// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! `iqrfRaw` and `iqrfRawHdp` messages.

use super::{Message, Validate};
use crate::error::{ApiResult, ValidationError};
use crate::hdp::{decode_dotted_hex, encode_dotted_hex, HdpRequest, HdpResponse, DPA_MAX_DATA_LENGTH};
use crate::mtype::MType;
use serde::{Deserialize, Serialize};

/// Minimum length of a DPA request packet (header only).
const MIN_REQUEST_LEN: usize = 6;

/// `req` of `iqrfRaw`: a whole DPA packet as dotted hex.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawRequest {
    pub r_data: String,
}

/// `rsp` of `iqrfRaw`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawResponse {
    pub r_data: String,
}

impl RawRequest {
    pub fn from_bytes(packet: &[u8]) -> Self {
        Self {
            r_data: encode_dotted_hex(packet),
        }
    }

    pub fn from_hdp(req: &HdpRequest) -> Self {
        Self::from_bytes(&req.to_dpa_bytes())
    }

    pub fn to_hdp(&self) -> ApiResult<HdpRequest> {
        HdpRequest::from_dpa_bytes(&decode_dotted_hex(&self.r_data)?)
    }
}

impl RawResponse {
    pub fn from_hdp(rsp: &HdpResponse) -> Self {
        Self {
            r_data: encode_dotted_hex(&rsp.to_dpa_bytes()),
        }
    }

    pub fn to_hdp(&self) -> ApiResult<HdpResponse> {
        HdpResponse::from_dpa_bytes(&decode_dotted_hex(&self.r_data)?)
    }
}

impl Validate for RawRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        let bytes = decode_dotted_hex(&self.r_data).map_err(|e| ValidationError::Malformed {
            field: "rData",
            reason: e.to_string(),
        })?;
        let max = MIN_REQUEST_LEN + DPA_MAX_DATA_LENGTH;
        if bytes.len() < MIN_REQUEST_LEN || bytes.len() > max {
            return Err(ValidationError::length(
                "rData",
                bytes.len(),
                format!("{}..={} bytes", MIN_REQUEST_LEN, max),
            ));
        }
        Ok(())
    }
}

/// `iqrfRaw`
#[derive(Debug, Clone, Copy)]
pub struct Raw;

impl Message for Raw {
    const M_TYPE: MType = MType::IqrfRaw;
    type Req = RawRequest;
    type Rsp = RawResponse;
}

/// `iqrfRawHdp`
#[derive(Debug, Clone, Copy)]
pub struct RawHdp;

impl Message for RawHdp {
    const M_TYPE: MType = MType::IqrfRawHdp;
    type Req = HdpRequest;
    type Rsp = HdpResponse;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Request;

    #[test]
    fn test_raw_and_hdp_describe_the_same_packet() {
        let hdp = HdpRequest::new(1, 6, 3).with_hwp_id(0xFFFF);
        let raw = RawRequest::from_hdp(&hdp);
        assert_eq!(raw.r_data, "01.00.06.03.ff.ff");
        assert_eq!(raw.to_hdp().unwrap(), hdp);
    }

    #[test]
    fn test_short_packet_fails_validation() {
        let req = Request::of::<Raw>("m", RawRequest { r_data: "01.00.06".into() });
        assert!(req.encode().is_err());

        let bad = RawRequest { r_data: "01.00.06.03.ff.gg".into() };
        assert!(matches!(
            bad.validate(),
            Err(ValidationError::Malformed { field: "rData", .. })
        ));
    }
}
