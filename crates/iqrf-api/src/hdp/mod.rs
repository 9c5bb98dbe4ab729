// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Raw DPA frames (`iqrfRawHdp`) and their byte-level codecs.
//!
//! A frame addresses one peripheral command on one device:
//! `nAdr` / `pNum` / `pCmd` / `hwpId` / `pData`. Responses add the DPA
//! response code and the device's DPA value.

pub mod codec;
pub mod payload;

pub use codec::{decode_dotted_hex, encode_dotted_hex};
pub use payload::{PayloadReader, PayloadWriter};

use crate::error::{ApiError, ValidationError};
use crate::message::Validate;
use serde::{Deserialize, Serialize};

/// Coordinator network address.
pub const COORDINATOR_ADDR: u16 = 0x00;
/// Broadcast network address.
pub const BROADCAST_ADDR: u16 = 0xFF;
/// Highest address a node can be bonded to.
pub const MAX_NODE_ADDR: u16 = 0xEF;
/// Hardware profile "do not check".
pub const HWPID_DONT_CARE: u16 = 0xFFFF;
/// Maximum `pData` length of a DPA request or response.
pub const DPA_MAX_DATA_LENGTH: usize = 56;
/// Set on `pCmd` of a response to the matching request command.
pub const RESPONSE_FLAG: u8 = 0x80;
/// Set on `rCode` of asynchronous responses.
pub const ASYNC_RESPONSE_FLAG: u8 = 0x80;

/// Peripheral numbers.
pub mod pnum {
    pub const COORDINATOR: u8 = 0x00;
    pub const NODE: u8 = 0x01;
    pub const OS: u8 = 0x02;
    pub const EEPROM: u8 = 0x03;
    pub const EEEPROM: u8 = 0x04;
    pub const RAM: u8 = 0x05;
    pub const LEDR: u8 = 0x06;
    pub const LEDG: u8 = 0x07;
    pub const IO: u8 = 0x09;
    pub const THERMOMETER: u8 = 0x0A;
    pub const UART: u8 = 0x0C;
    pub const FRC: u8 = 0x0D;
    pub const BINARY_OUTPUT: u8 = 0x4B;
    pub const SENSOR: u8 = 0x5E;
    pub const ENUMERATION: u8 = 0xFF;
}

/// DPA response codes.
pub mod rcode {
    pub const OK: u8 = 0x00;
    pub const ERROR_FAIL: u8 = 0x01;
    pub const ERROR_PCMD: u8 = 0x02;
    pub const ERROR_PNUM: u8 = 0x03;
    pub const ERROR_ADDR: u8 = 0x04;
    pub const ERROR_DATA_LEN: u8 = 0x05;
    pub const ERROR_DATA: u8 = 0x06;
    pub const ERROR_HWPID: u8 = 0x07;
    pub const ERROR_NADR: u8 = 0x08;
    pub const ERROR_IFACE_CUSTOM_HANDLER: u8 = 0x09;
    pub const ERROR_MISSING_CUSTOM_DPA_HANDLER: u8 = 0x0A;
    pub const ERROR_USER_FROM: u8 = 0x20;
    pub const ERROR_USER_TO: u8 = 0x3F;
    pub const STATUS_CONFIRMATION: u8 = 0xFF;

    /// Symbolic name of a response code, ignoring the async flag.
    pub fn name(code: u8) -> &'static str {
        if code == STATUS_CONFIRMATION {
            return "STATUS_CONFIRMATION";
        }
        match code & !super::ASYNC_RESPONSE_FLAG {
            OK => "STATUS_NO_ERROR",
            ERROR_FAIL => "ERROR_FAIL",
            ERROR_PCMD => "ERROR_PCMD",
            ERROR_PNUM => "ERROR_PNUM",
            ERROR_ADDR => "ERROR_ADDR",
            ERROR_DATA_LEN => "ERROR_DATA_LEN",
            ERROR_DATA => "ERROR_DATA",
            ERROR_HWPID => "ERROR_HWPID",
            ERROR_NADR => "ERROR_NADR",
            ERROR_IFACE_CUSTOM_HANDLER => "ERROR_IFACE_CUSTOM_HANDLER",
            ERROR_MISSING_CUSTOM_DPA_HANDLER => "ERROR_MISSING_CUSTOM_DPA_HANDLER",
            ERROR_USER_FROM..=ERROR_USER_TO => "ERROR_USER",
            _ => "ERROR_UNKNOWN",
        }
    }
}

/// Request frame, the `req` object of `iqrfRawHdp`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HdpRequest {
    pub n_adr: u16,
    pub p_num: u8,
    pub p_cmd: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hwp_id: Option<u16>,
    #[serde(default)]
    pub p_data: Vec<u8>,
}

impl HdpRequest {
    pub fn new(n_adr: u16, p_num: u8, p_cmd: u8) -> Self {
        Self {
            n_adr,
            p_num,
            p_cmd,
            hwp_id: None,
            p_data: Vec::new(),
        }
    }

    pub fn with_hwp_id(mut self, hwp_id: u16) -> Self {
        self.hwp_id = Some(hwp_id);
        self
    }

    pub fn with_data(mut self, p_data: Vec<u8>) -> Self {
        self.p_data = p_data;
        self
    }

    /// Effective hardware profile, `HWPID_DONT_CARE` when unset.
    pub fn hwp_id(&self) -> u16 {
        self.hwp_id.unwrap_or(HWPID_DONT_CARE)
    }

    /// Binary DPA packet (`NADR PNUM PCMD HWPID PDATA`).
    pub fn to_dpa_bytes(&self) -> Vec<u8> {
        codec::request_to_bytes(self)
    }

    pub fn from_dpa_bytes(bytes: &[u8]) -> Result<Self, ApiError> {
        codec::request_from_bytes(bytes)
    }
}

impl Validate for HdpRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.p_data.len() > DPA_MAX_DATA_LENGTH {
            return Err(ValidationError::length(
                "pData",
                self.p_data.len(),
                format!("at most {}", DPA_MAX_DATA_LENGTH),
            ));
        }
        Ok(())
    }
}

/// Response frame, the `rsp` object of `iqrfRawHdp`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HdpResponse {
    pub n_adr: u16,
    pub p_num: u8,
    pub p_cmd: u8,
    pub hwp_id: u16,
    pub r_code: u8,
    pub dpa_val: u8,
    #[serde(default)]
    pub p_data: Vec<u8>,
}

impl HdpResponse {
    /// Response answering `request` with the given payload and `rCode = 0`.
    pub fn answering(request: &HdpRequest, p_data: Vec<u8>) -> Self {
        Self {
            n_adr: request.n_adr,
            p_num: request.p_num,
            p_cmd: request.p_cmd | RESPONSE_FLAG,
            hwp_id: request.hwp_id.unwrap_or(0),
            r_code: rcode::OK,
            dpa_val: 0,
            p_data,
        }
    }

    /// Command number without the response flag.
    pub fn command(&self) -> u8 {
        self.p_cmd & !RESPONSE_FLAG
    }

    pub fn is_async(&self) -> bool {
        self.r_code != rcode::STATUS_CONFIRMATION && self.r_code & ASYNC_RESPONSE_FLAG != 0
    }

    /// True when the response code reports success.
    pub fn is_ok(&self) -> bool {
        self.r_code != rcode::STATUS_CONFIRMATION && self.r_code & !ASYNC_RESPONSE_FLAG == rcode::OK
    }

    pub fn to_dpa_bytes(&self) -> Vec<u8> {
        codec::response_to_bytes(self)
    }

    pub fn from_dpa_bytes(bytes: &[u8]) -> Result<Self, ApiError> {
        codec::response_from_bytes(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_omits_unset_hwpid_and_keeps_empty_pdata() {
        let req = HdpRequest::new(1, pnum::LEDR, 3);
        let v = serde_json::to_value(&req).unwrap();
        assert_eq!(v, json!({"nAdr": 1, "pNum": 6, "pCmd": 3, "pData": []}));
        assert_eq!(req.hwp_id(), HWPID_DONT_CARE);
    }

    #[test]
    fn test_response_decodes_camel_case() {
        let rsp: HdpResponse = serde_json::from_value(json!({
            "nAdr": 65535, "pNum": 10, "pCmd": 128, "hwpId": 0,
            "rCode": 0, "dpaVal": 90, "pData": [25, 144, 1]
        }))
        .unwrap();
        assert_eq!(rsp.n_adr, 65535);
        assert_eq!(rsp.command(), 0);
        assert!(rsp.is_ok());
    }

    #[test]
    fn test_async_flag_is_masked() {
        let mut rsp = HdpResponse::answering(&HdpRequest::new(0, 0, 0), vec![]);
        rsp.r_code = ASYNC_RESPONSE_FLAG;
        assert!(rsp.is_async());
        assert!(rsp.is_ok());
        rsp.r_code = rcode::STATUS_CONFIRMATION;
        assert!(!rsp.is_ok());
        assert_eq!(rcode::name(0x83), "ERROR_PNUM");
    }

    #[test]
    fn test_oversized_pdata_fails_validation() {
        let req = HdpRequest::new(0, 0, 0).with_data(vec![0; DPA_MAX_DATA_LENGTH + 1]);
        assert!(matches!(
            req.validate(),
            Err(ValidationError::Length { field: "pData", len: 57, .. })
        ));
    }
}
