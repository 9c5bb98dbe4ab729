// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Error notifications the daemon sends instead of a regular response.

use crate::error::ApiResult;
use crate::message::Response;
use crate::mtype::{Family, MType};
use serde::{Deserialize, Serialize};

/// `rsp` of `messageError` and `error_*` notifications.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorNotice {
    /// The offending request, echoed as text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub incoming_message: Option<String>,
    #[serde(default)]
    pub error_str: String,
}

impl ErrorNotice {
    /// Decode a notification; fails when `mType` is not an error kind.
    pub fn decode(text: &str) -> ApiResult<Response<ErrorNotice>> {
        let value: serde_json::Value = serde_json::from_str(text)?;
        let m_type: MType = serde_json::from_value(value["mType"].clone())?;
        if m_type.family() != Family::Error {
            return Err(crate::error::ApiError::MTypeMismatch {
                expected: "messageError",
                actual: m_type.as_str().to_string(),
            });
        }
        Response::from_value(value)
    }
}
