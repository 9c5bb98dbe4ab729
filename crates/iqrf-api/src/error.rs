// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Error types for message encoding and DPA frame translation.

use thiserror::Error;

/// Result type for message model operations.
pub type ApiResult<T> = Result<T, ApiError>;

/// Result type for peripheral frame translation.
pub type FrameResult<T> = Result<T, FrameError>;

/// Errors raised while building, encoding or decoding daemon messages.
#[derive(Debug, Error)]
pub enum ApiError {
    /// A request violates its schema and must not be sent.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// The `mType` string is not a supported message kind.
    #[error("unknown mType: {0}")]
    UnknownMType(String),

    /// The `mType` of a decoded message differs from the expected one.
    #[error("mType mismatch: expected {expected}, got {actual}")]
    MTypeMismatch {
        expected: &'static str,
        actual: String,
    },

    /// JSON (de)serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A raw DPA frame could not be translated.
    #[error("frame error: {0}")]
    Frame(#[from] FrameError),

    /// No registered adapter answers this peripheral and command.
    #[error("no adapter for pNum {pnum:#04x} pCmd {pcmd:#04x}")]
    NoAdapter { pnum: u8, pcmd: u8 },

    /// Malformed dotted hex text in an `iqrfRaw` message.
    #[error("invalid rData at position {position}: {reason}")]
    InvalidRData { position: usize, reason: String },
}

/// Schema violations detected before a request reaches the wire.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("required field `{0}` is missing or empty")]
    MissingField(&'static str),

    #[error("field `{field}` = {value} is outside {min}..={max}")]
    OutOfRange {
        field: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },

    #[error("field `{field}` has length {len}, expected {expected}")]
    Length {
        field: &'static str,
        len: usize,
        expected: String,
    },

    #[error("field `{field}` is malformed: {reason}")]
    Malformed { field: &'static str, reason: String },
}

impl ValidationError {
    pub(crate) fn out_of_range(field: &'static str, value: i64, min: i64, max: i64) -> Self {
        Self::OutOfRange {
            field,
            value,
            min,
            max,
        }
    }

    pub(crate) fn length(field: &'static str, len: usize, expected: impl Into<String>) -> Self {
        Self::Length {
            field,
            len,
            expected: expected.into(),
        }
    }
}

/// Errors raised while translating between typed parameters and DPA frames.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameError {
    /// pData ended before the expected shape was read.
    #[error("read failed at offset {offset}: {reason}")]
    ReadFailed { offset: usize, reason: String },

    /// pData would exceed the DPA payload limit.
    #[error("write failed at offset {offset}: {reason}")]
    WriteFailed { offset: usize, reason: String },

    /// pData has more bytes than the command's result shape.
    #[error("pData length {actual} does not match expected {expected}")]
    LengthMismatch { expected: usize, actual: usize },

    /// The frame answers a different peripheral or command.
    #[error("unexpected response pnum={pnum:#04x} pcmd={pcmd:#04x}, expected pnum={expected_pnum:#04x} pcmd={expected_pcmd:#04x}")]
    UnexpectedResponse {
        pnum: u8,
        pcmd: u8,
        expected_pnum: u8,
        expected_pcmd: u8,
    },

    /// The device answered with a nonzero DPA response code.
    #[error("DPA response code {code:#04x} ({name})")]
    ResponseCode { code: u8, name: &'static str },

    /// A field decoded to a value outside its domain.
    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    /// Parameters failed validation before frame construction.
    #[error("invalid parameters: {0}")]
    Params(#[from] ValidationError),
}
