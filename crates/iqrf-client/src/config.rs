// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Client configuration.
//!
//! Supports both programmatic and file-based configuration. Every field
//! has a default matching a stock gateway install, so an empty file
//! connects to `ws://localhost:1338`.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// Client configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ClientConfig {
    #[serde(default)]
    pub transport: TransportSection,

    #[serde(default)]
    pub websocket: WebSocketConfig,

    #[serde(default)]
    pub mqtt: MqttConfig,

    #[serde(default)]
    pub request: RequestConfig,

    #[serde(default)]
    pub retry: RetryConfig,
}

/// Which transport [`DaemonClient::connect`](crate::DaemonClient::connect) opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    #[default]
    WebSocket,
    Mqtt,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct TransportSection {
    #[serde(default)]
    pub kind: TransportKind,
}

/// `[websocket]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebSocketConfig {
    /// Daemon endpoint.
    #[serde(default = "default_ws_url")]
    pub url: String,

    /// Value of the `Sec-WebSocket-Protocol` header.
    #[serde(default = "default_subprotocol")]
    pub subprotocol: String,

    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
}

/// `[mqtt]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MqttConfig {
    #[serde(default = "default_broker_host")]
    pub broker_host: String,

    #[serde(default = "default_broker_port")]
    pub broker_port: u16,

    /// MQTT client identifier; a random one is generated when empty.
    #[serde(default)]
    pub client_id: String,

    #[serde(default = "default_request_topic")]
    pub request_topic: String,

    #[serde(default = "default_response_topic")]
    pub response_topic: String,

    /// 0, 1 or 2.
    #[serde(default = "default_qos")]
    pub qos: u8,

    #[serde(default = "default_true")]
    pub retain: bool,

    #[serde(default = "default_keep_alive_secs")]
    pub keep_alive_secs: u64,

    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
}

/// `[request]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestConfig {
    /// How long a call collects responses when the caller gives no wait.
    #[serde(default = "default_timeout_ms")]
    pub default_timeout_ms: u64,

    /// Sets `returnVerbose` on requests that leave it unset.
    #[serde(default)]
    pub return_verbose: bool,
}

/// `[retry]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Total attempts, including the first one.
    #[serde(default = "default_attempts")]
    pub attempts: u32,

    #[serde(default = "default_backoff_ms")]
    pub backoff_ms: u64,

    /// Retry when nothing came back before the wait elapsed.
    #[serde(default)]
    pub on_timeout: bool,

    /// Retry when the transport failed.
    #[serde(default)]
    pub on_transport_error: bool,
}

fn default_ws_url() -> String {
    "ws://localhost:1338".to_string()
}

fn default_subprotocol() -> String {
    "iqrf".to_string()
}

fn default_connect_timeout_ms() -> u64 {
    5000
}

fn default_broker_host() -> String {
    "localhost".to_string()
}

fn default_broker_port() -> u16 {
    1883
}

fn default_request_topic() -> String {
    "Iqrf/DpaRequest".to_string()
}

fn default_response_topic() -> String {
    "Iqrf/DpaResponse".to_string()
}

fn default_qos() -> u8 {
    2
}

fn default_true() -> bool {
    true
}

fn default_keep_alive_secs() -> u64 {
    60
}

fn default_timeout_ms() -> u64 {
    10_000
}

fn default_attempts() -> u32 {
    1
}

fn default_backoff_ms() -> u64 {
    500
}

impl Default for WebSocketConfig {
    fn default() -> Self {
        Self {
            url: default_ws_url(),
            subprotocol: default_subprotocol(),
            connect_timeout_ms: default_connect_timeout_ms(),
        }
    }
}

impl Default for MqttConfig {
    fn default() -> Self {
        Self {
            broker_host: default_broker_host(),
            broker_port: default_broker_port(),
            client_id: String::new(),
            request_topic: default_request_topic(),
            response_topic: default_response_topic(),
            qos: default_qos(),
            retain: true,
            keep_alive_secs: default_keep_alive_secs(),
            connect_timeout_ms: default_connect_timeout_ms(),
        }
    }
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            default_timeout_ms: default_timeout_ms(),
            return_verbose: false,
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            attempts: default_attempts(),
            backoff_ms: default_backoff_ms(),
            on_timeout: false,
            on_transport_error: false,
        }
    }
}

impl WebSocketConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }
}

impl MqttConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn keep_alive(&self) -> Duration {
        Duration::from_secs(self.keep_alive_secs)
    }
}

impl RequestConfig {
    pub fn default_timeout(&self) -> Duration {
        Duration::from_millis(self.default_timeout_ms)
    }
}

impl ClientConfig {
    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        content.parse()
    }

    /// WebSocket configuration for `url`.
    pub fn websocket(url: impl Into<String>) -> Self {
        Self {
            websocket: WebSocketConfig {
                url: url.into(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    /// MQTT configuration for a broker.
    pub fn mqtt(broker_host: impl Into<String>, broker_port: u16) -> Self {
        Self {
            transport: TransportSection {
                kind: TransportKind::Mqtt,
            },
            mqtt: MqttConfig {
                broker_host: broker_host.into(),
                broker_port,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let ws = &self.websocket;
        if !(ws.url.starts_with("ws://") || ws.url.starts_with("wss://")) {
            return Err(ConfigError::Invalid(format!(
                "websocket.url must start with ws:// or wss:// (got '{}')",
                ws.url
            )));
        }
        if ws.subprotocol.is_empty() {
            return Err(ConfigError::Invalid("websocket.subprotocol is empty".into()));
        }

        let mqtt = &self.mqtt;
        if mqtt.broker_host.is_empty() {
            return Err(ConfigError::Invalid("mqtt.broker_host is empty".into()));
        }
        if mqtt.broker_port == 0 {
            return Err(ConfigError::Invalid("mqtt.broker_port must be nonzero".into()));
        }
        if mqtt.request_topic.is_empty() || mqtt.response_topic.is_empty() {
            return Err(ConfigError::Invalid("mqtt topics must not be empty".into()));
        }
        if mqtt.qos > 2 {
            return Err(ConfigError::Invalid(format!(
                "mqtt.qos must be 0, 1 or 2 (got {})",
                mqtt.qos
            )));
        }
        if mqtt.keep_alive_secs < 5 {
            return Err(ConfigError::Invalid(format!(
                "mqtt.keep_alive_secs must be at least 5 (got {})",
                mqtt.keep_alive_secs
            )));
        }

        for (name, value) in [
            ("websocket.connect_timeout_ms", ws.connect_timeout_ms),
            ("mqtt.connect_timeout_ms", mqtt.connect_timeout_ms),
            ("request.default_timeout_ms", self.request.default_timeout_ms),
        ] {
            if value == 0 {
                return Err(ConfigError::Invalid(format!("{} must be nonzero", name)));
            }
        }

        if self.retry.attempts == 0 {
            return Err(ConfigError::Invalid("retry.attempts must be at least 1".into()));
        }

        Ok(())
    }
}

impl FromStr for ClientConfig {
    type Err = ConfigError;

    /// Parse and validate TOML text.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }
}
