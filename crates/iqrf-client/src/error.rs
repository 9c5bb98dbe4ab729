// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Error types for configuration, transports and daemon calls.

use iqrf_api::ApiError;
use std::time::Duration;
use thiserror::Error;

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;

/// Result type for [`DaemonClient`](crate::DaemonClient) calls.
pub type ClientResult<T> = Result<T, ClientError>;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Failures of the underlying connection.
///
/// A timeout is not an error: an exchange that hears nothing back
/// completes with an empty list.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Handshake, read or write failure on the WebSocket.
    #[error("WebSocket error: {0}")]
    WebSocket(Box<tokio_tungstenite::tungstenite::Error>),

    /// The MQTT client could not queue a request.
    #[error("MQTT client error: {0}")]
    Mqtt(#[from] rumqttc::ClientError),

    /// The MQTT event loop lost or never reached the broker.
    #[error("MQTT connection error: {0}")]
    MqttConnection(Box<rumqttc::ConnectionError>),

    #[error("Connection to {endpoint} not established within {timeout:?}")]
    ConnectTimeout { endpoint: String, timeout: Duration },

    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),

    /// Another exchange with the same msgId is still waiting.
    #[error("msgId {0} is already in flight")]
    DuplicateMsgId(String),

    #[error("Connection closed")]
    ConnectionClosed,
}

impl From<tokio_tungstenite::tungstenite::Error> for TransportError {
    fn from(e: tokio_tungstenite::tungstenite::Error) -> Self {
        TransportError::WebSocket(Box::new(e))
    }
}

impl From<rumqttc::ConnectionError> for TransportError {
    fn from(e: rumqttc::ConnectionError) -> Self {
        TransportError::MqttConnection(Box::new(e))
    }
}

/// Errors returned by [`DaemonClient`](crate::DaemonClient).
///
/// Nonzero daemon status codes are not errors; they arrive as
/// [`Outcome::Failure`](iqrf_api::Outcome) inside the response.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Request validation, encoding, or response decoding failed.
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    /// No response arrived within the wait.
    #[error("no response to {msg_id} within {timeout:?}")]
    NoResponse { msg_id: String, timeout: Duration },
}

impl From<iqrf_api::FrameError> for ClientError {
    fn from(e: iqrf_api::FrameError) -> Self {
        ClientError::Api(e.into())
    }
}

impl ClientError {
    /// Whether the failure came from the connection rather than the message.
    pub fn is_transport(&self) -> bool {
        matches!(self, ClientError::Transport(_))
    }
}
