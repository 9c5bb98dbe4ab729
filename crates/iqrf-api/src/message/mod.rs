// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! JSON message model of the gateway daemon API.
//!
//! Every message is `{ "mType": ..., "data": { "msgId": ..., ... } }`.
//! Requests carry a `req` object, responses an `rsp` object plus a numeric
//! `status`. A nonzero status is a daemon-side failure: it decodes into
//! [`Outcome::Failure`] and is never reported as an `Err`.

pub mod any;
pub mod daemon;
pub mod iqmesh;
pub mod notice;
pub mod raw;
pub mod scheduler;
pub mod standard;

pub use any::{AnyRequest, AnyResponse};

use crate::error::{ApiError, ApiResult, ValidationError};
use crate::mtype::MType;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Value of `repeat` when a request omits it.
pub const DEFAULT_REPEAT: u8 = 1;
/// Value of `insId` when a response omits it.
pub const DEFAULT_INS_ID: &str = "iqrfgd2-1";
/// Value of `statusStr` when a response omits it.
pub const DEFAULT_STATUS_STR: &str = "unknown";
/// `status` of a successful response.
pub const STATUS_OK: i32 = 0;

/// Schema checks run before a request is encoded.
pub trait Validate {
    fn validate(&self) -> Result<(), ValidationError> {
        Ok(())
    }
}

impl Validate for Value {}

impl<T: Validate> Validate for Vec<T> {
    fn validate(&self) -> Result<(), ValidationError> {
        self.iter().try_for_each(Validate::validate)
    }
}

impl<T: Validate> Validate for Option<T> {
    fn validate(&self) -> Result<(), ValidationError> {
        self.as_ref().map_or(Ok(()), Validate::validate)
    }
}

/// Binds a message kind to its request and response payloads.
pub trait Message {
    const M_TYPE: MType;
    type Req: Serialize + DeserializeOwned + Validate;
    type Rsp: Serialize + DeserializeOwned;
}

/// Parameter object with no fields, serialized as `{}`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Empty {}

impl Validate for Empty {}

/// Request envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Request<P> {
    pub m_type: MType,
    pub data: RequestData<P>,
}

/// `data` object of a request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestData<P> {
    pub msg_id: String,
    /// Milliseconds the daemon waits for the device.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_verbose: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repeat: Option<u8>,
    pub req: P,
}

impl<P> Request<P> {
    pub fn new(m_type: MType, msg_id: impl Into<String>, req: P) -> Self {
        Self {
            m_type,
            data: RequestData {
                msg_id: msg_id.into(),
                timeout: None,
                return_verbose: None,
                repeat: None,
                req,
            },
        }
    }

    /// Request for message kind `M`.
    pub fn of<M>(msg_id: impl Into<String>, req: P) -> Self
    where
        M: Message<Req = P>,
    {
        Self::new(M::M_TYPE, msg_id, req)
    }

    pub fn with_timeout(mut self, timeout_ms: u32) -> Self {
        self.data.timeout = Some(timeout_ms);
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.data.return_verbose = Some(verbose);
        self
    }

    pub fn with_repeat(mut self, repeat: u8) -> Self {
        self.data.repeat = Some(repeat);
        self
    }

    pub fn with_msg_id(mut self, msg_id: impl Into<String>) -> Self {
        self.data.msg_id = msg_id.into();
        self
    }

    pub fn msg_id(&self) -> &str {
        &self.data.msg_id
    }

    pub fn repeat(&self) -> u8 {
        self.data.repeat.unwrap_or(DEFAULT_REPEAT)
    }

    pub fn return_verbose(&self) -> bool {
        self.data.return_verbose.unwrap_or(false)
    }
}

impl<P: Validate> Validate for Request<P> {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.data.msg_id.is_empty() {
            return Err(ValidationError::MissingField("msgId"));
        }
        if self.data.repeat == Some(0) {
            return Err(ValidationError::out_of_range("repeat", 0, 1, 255));
        }
        self.data.req.validate()
    }
}

impl<P: Serialize + Validate> Request<P> {
    /// Validate, then serialize to JSON text.
    pub fn encode(&self) -> ApiResult<String> {
        self.validate()?;
        Ok(serde_json::to_string(self)?)
    }

    /// Validate, then serialize to a JSON value.
    pub fn to_value(&self) -> ApiResult<Value> {
        self.validate()?;
        Ok(serde_json::to_value(self)?)
    }
}

impl<P: DeserializeOwned> Request<P> {
    pub fn decode(text: &str) -> ApiResult<Self> {
        Ok(serde_json::from_str(text)?)
    }
}

/// One DPA transaction of a verbose response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawDiagnostic {
    pub request: String,
    pub request_ts: String,
    pub confirmation: String,
    pub confirmation_ts: String,
    pub response: String,
    pub response_ts: String,
}

/// The daemon reported a nonzero `status`.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("daemon status {status}: {}", .status_str.as_deref().unwrap_or(DEFAULT_STATUS_STR))]
pub struct StatusError {
    pub status: i32,
    pub status_str: Option<String>,
    /// Whatever `rsp` the daemon attached, untyped.
    pub rsp: Option<Value>,
}

/// Typed result of a response.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<R> {
    Success(R),
    Failure(StatusError),
}

impl<R> Outcome<R> {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    pub fn into_result(self) -> Result<R, StatusError> {
        match self {
            Outcome::Success(r) => Ok(r),
            Outcome::Failure(e) => Err(e),
        }
    }

    pub fn as_ref(&self) -> Outcome<&R> {
        match self {
            Outcome::Success(r) => Outcome::Success(r),
            Outcome::Failure(e) => Outcome::Failure(e.clone()),
        }
    }
}

/// Decoded response envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct Response<R> {
    pub m_type: MType,
    pub msg_id: String,
    pub timeout: Option<u32>,
    pub ins_id: Option<String>,
    pub status_str: Option<String>,
    pub raw: Option<Vec<RawDiagnostic>>,
    pub outcome: Outcome<R>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireResponse {
    m_type: MType,
    data: WireResponseData,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireResponseData {
    msg_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    timeout: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    rsp: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    raw: Option<Vec<RawDiagnostic>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    ins_id: Option<String>,
    status: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    status_str: Option<String>,
}

impl<R> Response<R> {
    pub fn success(m_type: MType, msg_id: impl Into<String>, rsp: R) -> Self {
        Self {
            m_type,
            msg_id: msg_id.into(),
            timeout: None,
            ins_id: None,
            status_str: Some("ok".to_string()),
            raw: None,
            outcome: Outcome::Success(rsp),
        }
    }

    pub fn failure(m_type: MType, msg_id: impl Into<String>, status: i32, status_str: Option<String>) -> Self {
        Self {
            m_type,
            msg_id: msg_id.into(),
            timeout: None,
            ins_id: None,
            status_str: status_str.clone(),
            raw: None,
            outcome: Outcome::Failure(StatusError {
                status,
                status_str,
                rsp: None,
            }),
        }
    }

    pub fn status(&self) -> i32 {
        match &self.outcome {
            Outcome::Success(_) => STATUS_OK,
            Outcome::Failure(e) => e.status,
        }
    }

    pub fn ins_id(&self) -> &str {
        self.ins_id.as_deref().unwrap_or(DEFAULT_INS_ID)
    }

    pub fn status_str(&self) -> &str {
        self.status_str.as_deref().unwrap_or(DEFAULT_STATUS_STR)
    }

    pub fn map<U>(self, f: impl FnOnce(R) -> U) -> Response<U> {
        Response {
            m_type: self.m_type,
            msg_id: self.msg_id,
            timeout: self.timeout,
            ins_id: self.ins_id,
            status_str: self.status_str,
            raw: self.raw,
            outcome: match self.outcome {
                Outcome::Success(r) => Outcome::Success(f(r)),
                Outcome::Failure(e) => Outcome::Failure(e),
            },
        }
    }
}

impl<R: DeserializeOwned> Response<R> {
    /// Decode any response; `rsp` is required only when `status == 0`.
    pub fn decode(text: &str) -> ApiResult<Self> {
        let wire: WireResponse = serde_json::from_str(text)?;
        Self::from_wire(wire)
    }

    pub fn from_value(value: Value) -> ApiResult<Self> {
        let wire: WireResponse = serde_json::from_value(value)?;
        Self::from_wire(wire)
    }

    /// Decode a response to message kind `M`.
    ///
    /// Error notifications (`messageError`, `error_*`) sent in reply to the
    /// request decode into a failure instead of an mType mismatch.
    pub fn decode_for<M: Message<Rsp = R>>(text: &str) -> ApiResult<Self> {
        let wire: WireResponse = serde_json::from_str(text)?;
        if wire.m_type != M::M_TYPE {
            if wire.m_type.family() == crate::mtype::Family::Error {
                let data = wire.data;
                let status = if data.status == STATUS_OK { -1 } else { data.status };
                return Ok(Self {
                    m_type: wire.m_type,
                    msg_id: data.msg_id,
                    timeout: data.timeout,
                    ins_id: data.ins_id,
                    status_str: data.status_str.clone(),
                    raw: data.raw,
                    outcome: Outcome::Failure(StatusError {
                        status,
                        status_str: data.status_str,
                        rsp: data.rsp,
                    }),
                });
            }
            return Err(ApiError::MTypeMismatch {
                expected: M::M_TYPE.as_str(),
                actual: wire.m_type.as_str().to_string(),
            });
        }
        Self::from_wire(wire)
    }

    fn from_wire(wire: WireResponse) -> ApiResult<Self> {
        let data = wire.data;
        let outcome = if data.status == STATUS_OK {
            let rsp = data.rsp.ok_or(ValidationError::MissingField("rsp"))?;
            Outcome::Success(serde_json::from_value(rsp)?)
        } else {
            log::debug!(
                "[{}] {} failed with status {}",
                data.msg_id,
                wire.m_type,
                data.status
            );
            Outcome::Failure(StatusError {
                status: data.status,
                status_str: data.status_str.clone(),
                rsp: data.rsp,
            })
        };
        Ok(Self {
            m_type: wire.m_type,
            msg_id: data.msg_id,
            timeout: data.timeout,
            ins_id: data.ins_id,
            status_str: data.status_str,
            raw: data.raw,
            outcome,
        })
    }
}

impl<R: Serialize> Response<R> {
    pub fn to_value(&self) -> ApiResult<Value> {
        let (status, rsp) = match &self.outcome {
            Outcome::Success(r) => (STATUS_OK, Some(serde_json::to_value(r)?)),
            Outcome::Failure(e) => (e.status, e.rsp.clone()),
        };
        let wire = WireResponse {
            m_type: self.m_type,
            data: WireResponseData {
                msg_id: self.msg_id.clone(),
                timeout: self.timeout,
                rsp,
                raw: self.raw.clone(),
                ins_id: self.ins_id.clone(),
                status,
                status_str: self.status_str.clone(),
            },
        };
        Ok(serde_json::to_value(wire)?)
    }

    pub fn encode(&self) -> ApiResult<String> {
        Ok(self.to_value()?.to_string())
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Header {
    m_type: Option<String>,
    data: Option<HeaderData>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct HeaderData {
    msg_id: Option<String>,
}

/// `mType` and `data.msgId` of any JSON message, without decoding the payload.
pub fn peek_header(text: &str) -> Option<(Option<String>, String)> {
    let header: Header = serde_json::from_str(text).ok()?;
    let msg_id = header.data?.msg_id?;
    Some((header.m_type, msg_id))
}
