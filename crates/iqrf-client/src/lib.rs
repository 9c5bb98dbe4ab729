// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # iqrf-client - IQRF gateway daemon client
//!
//! Sends typed requests to the gateway daemon over WebSocket or MQTT and
//! gathers the responses that carry the same `msgId`.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use iqrf_api::peripheral::thermometer;
//! use iqrf_api::message::Empty;
//! use iqrf_client::{ClientConfig, DaemonClient, PeripheralReply};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = DaemonClient::connect(&ClientConfig::websocket("ws://localhost:1338")).await?;
//! match client.call_peripheral::<thermometer::Read>(1, None, &Empty {}).await? {
//!     PeripheralReply::Ok(t) => println!("node 1: {:?} C", t),
//!     PeripheralReply::Status { status, .. } => println!("failed with status {}", status),
//! }
//! client.close().await;
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! DaemonClient --encode--> Transport --text--> daemon
//!      ^                       |
//!      +--decode-- Correlator <+-- listener task (msgId routing)
//! ```
//!
//! A call that hears nothing back within its wait returns an empty list;
//! only connection failures are errors.

/// Typed calls, retry policy and per-call options.
pub mod client;
/// TOML configuration.
pub mod config;
/// msgId routing of inbound messages.
pub mod correlator;
/// Error types.
pub mod error;
/// WebSocket, MQTT and in-process transports.
pub mod transport;

pub use client::{CallOptions, DaemonClient, PeripheralReply, RetryPolicy};
pub use config::{ClientConfig, TransportKind};
pub use correlator::Collect;
pub use error::{ClientError, ClientResult, ConfigError, TransportError, TransportResult};
pub use transport::{ChannelTransport, ConfiguredTransport, MqttTransport, Transport, WsTransport};
