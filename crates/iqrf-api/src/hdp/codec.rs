// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Binary DPA packets and the dotted hex text used by `iqrfRaw`.
//!
//! Packet layout (all multi-byte fields little-endian):
//!
//! ```text
//! request : NADR(2) PNUM(1) PCMD(1) HWPID(2) PDATA(0..56)
//! response: NADR(2) PNUM(1) PCMD(1) HWPID(2) RCODE(1) DPAVAL(1) PDATA(0..56)
//! ```

use super::{HdpRequest, HdpResponse, PayloadReader, DPA_MAX_DATA_LENGTH};
use crate::error::{ApiError, FrameError};
use std::fmt::Write as _;

const REQUEST_HEADER_LEN: usize = 6;
const RESPONSE_HEADER_LEN: usize = 8;

pub(crate) fn request_to_bytes(req: &HdpRequest) -> Vec<u8> {
    let mut out = Vec::with_capacity(REQUEST_HEADER_LEN + req.p_data.len());
    out.extend_from_slice(&req.n_adr.to_le_bytes());
    out.push(req.p_num);
    out.push(req.p_cmd);
    out.extend_from_slice(&req.hwp_id().to_le_bytes());
    out.extend_from_slice(&req.p_data);
    out
}

pub(crate) fn response_to_bytes(rsp: &HdpResponse) -> Vec<u8> {
    let mut out = Vec::with_capacity(RESPONSE_HEADER_LEN + rsp.p_data.len());
    out.extend_from_slice(&rsp.n_adr.to_le_bytes());
    out.push(rsp.p_num);
    out.push(rsp.p_cmd);
    out.extend_from_slice(&rsp.hwp_id.to_le_bytes());
    out.push(rsp.r_code);
    out.push(rsp.dpa_val);
    out.extend_from_slice(&rsp.p_data);
    out
}

pub(crate) fn request_from_bytes(bytes: &[u8]) -> Result<HdpRequest, ApiError> {
    let mut r = PayloadReader::new(bytes);
    let n_adr = r.read_u16_le()?;
    let p_num = r.read_u8()?;
    let p_cmd = r.read_u8()?;
    let hwp_id = r.read_u16_le()?;
    let p_data = checked_data(r.read_rest())?;
    Ok(HdpRequest {
        n_adr,
        p_num,
        p_cmd,
        hwp_id: Some(hwp_id),
        p_data,
    })
}

pub(crate) fn response_from_bytes(bytes: &[u8]) -> Result<HdpResponse, ApiError> {
    let mut r = PayloadReader::new(bytes);
    let n_adr = r.read_u16_le()?;
    let p_num = r.read_u8()?;
    let p_cmd = r.read_u8()?;
    let hwp_id = r.read_u16_le()?;
    let r_code = r.read_u8()?;
    let dpa_val = r.read_u8()?;
    let p_data = checked_data(r.read_rest())?;
    Ok(HdpResponse {
        n_adr,
        p_num,
        p_cmd,
        hwp_id,
        r_code,
        dpa_val,
        p_data,
    })
}

fn checked_data(rest: &[u8]) -> Result<Vec<u8>, ApiError> {
    if rest.len() > DPA_MAX_DATA_LENGTH {
        return Err(FrameError::LengthMismatch {
            expected: DPA_MAX_DATA_LENGTH,
            actual: rest.len(),
        }
        .into());
    }
    Ok(rest.to_vec())
}

/// Format bytes as lowercase dotted hex, e.g. `01.00.06.03.ff.ff`.
pub fn encode_dotted_hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 3);
    for (i, b) in bytes.iter().enumerate() {
        if i > 0 {
            out.push('.');
        }
        // Writing to a String cannot fail.
        let _ = write!(out, "{:02x}", b);
    }
    out
}

/// Parse dotted hex text. Each group must be one or two hex digits.
/// An empty string decodes to no bytes.
pub fn decode_dotted_hex(text: &str) -> Result<Vec<u8>, ApiError> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(Vec::new());
    }

    let mut out = Vec::new();
    let mut position = 0;
    for group in text.split('.') {
        if group.is_empty() || group.len() > 2 {
            return Err(ApiError::InvalidRData {
                position,
                reason: format!("group {:?} must be 1 or 2 hex digits", group),
            });
        }
        let byte = u8::from_str_radix(group, 16).map_err(|e| ApiError::InvalidRData {
            position,
            reason: e.to_string(),
        })?;
        out.push(byte);
        position += group.len() + 1;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dotted_hex_matches_daemon_format() {
        let req = HdpRequest::new(1, 6, 3).with_hwp_id(0xFFFF);
        assert_eq!(encode_dotted_hex(&req.to_dpa_bytes()), "01.00.06.03.ff.ff");
    }

    #[test]
    fn test_dotted_hex_accepts_upper_case_and_single_digits() {
        assert_eq!(
            decode_dotted_hex("01.0.6.3.FF.ff").unwrap(),
            vec![1, 0, 6, 3, 0xFF, 0xFF]
        );
        assert!(decode_dotted_hex("").unwrap().is_empty());
    }

    #[test]
    fn test_dotted_hex_rejects_garbage() {
        let err = decode_dotted_hex("01.zz").unwrap_err();
        assert!(matches!(err, ApiError::InvalidRData { position: 3, .. }));
        assert!(decode_dotted_hex("01..02").is_err());
        assert!(decode_dotted_hex("0102").is_err());
    }

    #[test]
    fn test_response_packet_layout() {
        let bytes = [0x01, 0x00, 0x0A, 0x80, 0x00, 0x00, 0x00, 0x40, 0x19, 0x90, 0x01];
        let rsp = HdpResponse::from_dpa_bytes(&bytes).unwrap();
        assert_eq!(rsp.n_adr, 1);
        assert_eq!(rsp.p_num, 0x0A);
        assert_eq!(rsp.p_cmd, 0x80);
        assert_eq!(rsp.dpa_val, 0x40);
        assert_eq!(rsp.p_data, vec![0x19, 0x90, 0x01]);
        assert_eq!(rsp.to_dpa_bytes(), bytes.to_vec());
    }

    #[test]
    fn test_truncated_header_is_rejected() {
        let err = HdpRequest::from_dpa_bytes(&[0x01, 0x00, 0x06]).unwrap_err();
        assert!(matches!(
            err,
            ApiError::Frame(FrameError::ReadFailed { offset: 3, .. })
        ));
    }
}
