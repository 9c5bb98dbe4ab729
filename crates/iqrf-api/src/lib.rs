// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # iqrf-api - IQRF gateway daemon message model
//!
//! Typed JSON messages of the IQRF gateway daemon API and the translation
//! between typed peripheral parameters and raw DPA frames.
//!
//! ## Quick Start
//!
//! ```rust
//! use iqrf_api::message::standard::{Standard, StdRequest};
//! use iqrf_api::message::{Empty, Request};
//! use iqrf_api::peripheral::led;
//!
//! let request = Request::of::<Standard<led::LedgPulse>>("pulse-1", StdRequest::new(3, Empty {}));
//! let text = request.encode().unwrap();
//! assert!(text.contains("iqrfEmbedLedg_Pulse"));
//! ```
//!
//! ## Layers
//!
//! ```text
//! +---------------------------------------------------------------+
//! |  message   envelope { mType, data { msgId, req | rsp } }      |
//! |            raw, standard, scheduler, daemon, iqmesh, notice   |
//! +---------------------------------------------------------------+
//! |  peripheral  typed params <-> pData, static adapter registry  |
//! +---------------------------------------------------------------+
//! |  hdp       nAdr / pNum / pCmd / hwpId / pData frames, codec   |
//! +---------------------------------------------------------------+
//! ```
//!
//! | Type | Description |
//! |------|-------------|
//! | [`MType`] | Closed set of supported message kinds |
//! | [`Request`] / [`Response`] | Envelope around every message |
//! | [`HdpRequest`] / [`HdpResponse`] | Structured DPA frames |
//! | [`PeripheralCommand`] | Typed adapter for one peripheral command |
//!
//! Nothing in this crate performs I/O; transports live in `iqrf-client`.

/// Error types for validation, JSON and frame translation.
pub mod error;
/// DPA frames, payload cursors and the raw packet codec.
pub mod hdp;
/// Message envelope and the per-family request/response schemas.
pub mod message;
/// The closed set of message kinds.
pub mod mtype;
/// Peripheral command adapters and their registry.
pub mod peripheral;

pub use error::{ApiError, ApiResult, FrameError, FrameResult, ValidationError};
pub use hdp::{HdpRequest, HdpResponse};
pub use message::any::{AnyRequest, AnyResponse};
pub use message::{Message, Outcome, Request, Response, StatusError, Validate};
pub use mtype::{Family, MType};
pub use peripheral::{PeripheralCommand, PeripheralResult};
