// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Transports carrying daemon JSON messages.
//!
//! A transport writes one request and collects, in receipt order, every
//! inbound message carrying the same `msgId`. Nothing arriving within the
//! wait is a normal outcome and yields an empty list.

mod channel;
mod mqtt;
mod websocket;

pub use channel::{ChannelTransport, Loopback};
pub use mqtt::MqttTransport;
pub use websocket::WsTransport;

use crate::config::{ClientConfig, TransportKind};
use crate::correlator::Collect;
use crate::error::TransportResult;
use std::future::Future;
use std::time::Duration;

/// Request/response exchange over one daemon connection.
pub trait Transport: Send + Sync + 'static {
    /// Write `message` and collect the responses to `msg_id` until `wait`
    /// elapses or `collect` says the exchange is complete.
    fn exchange(
        &self,
        message: &str,
        msg_id: &str,
        wait: Duration,
        collect: Collect,
    ) -> impl Future<Output = TransportResult<Vec<String>>> + Send;

    /// Write `message` and collect every response to `msg_id` for `wait`.
    fn send(
        &self,
        message: &str,
        msg_id: &str,
        wait: Duration,
    ) -> impl Future<Output = TransportResult<Vec<String>>> + Send {
        self.exchange(message, msg_id, wait, Collect::UntilTimeout)
    }

    /// Stop the listener and fail in-flight exchanges.
    fn close(&self) -> impl Future<Output = ()> + Send;
}

/// The transport selected by [`TransportKind`].
pub enum ConfiguredTransport {
    WebSocket(WsTransport),
    Mqtt(MqttTransport),
}

impl ConfiguredTransport {
    pub async fn connect(config: &ClientConfig) -> TransportResult<Self> {
        match config.transport.kind {
            TransportKind::WebSocket => Ok(Self::WebSocket(WsTransport::connect(&config.websocket).await?)),
            TransportKind::Mqtt => Ok(Self::Mqtt(MqttTransport::connect(&config.mqtt).await?)),
        }
    }
}

impl Transport for ConfiguredTransport {
    async fn exchange(
        &self,
        message: &str,
        msg_id: &str,
        wait: Duration,
        collect: Collect,
    ) -> TransportResult<Vec<String>> {
        match self {
            Self::WebSocket(t) => t.exchange(message, msg_id, wait, collect).await,
            Self::Mqtt(t) => t.exchange(message, msg_id, wait, collect).await,
        }
    }

    async fn close(&self) {
        match self {
            Self::WebSocket(t) => t.close().await,
            Self::Mqtt(t) => t.close().await,
        }
    }
}
