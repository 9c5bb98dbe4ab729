// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Typed calls against the gateway daemon.
//!
//! The client owns one [`Transport`], stamps every request with a fresh
//! msgId, and decodes the collected responses into the message kind's
//! response type.

use crate::config::{ClientConfig, RetryConfig};
use crate::correlator::Collect;
use crate::error::{ClientError, ClientResult};
use crate::transport::{ConfiguredTransport, Transport};
use iqrf_api::message::raw::RawHdp;
use iqrf_api::{AnyRequest, AnyResponse, ApiResult, Message, Outcome, PeripheralCommand, Request, Response};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// When and how often a call is repeated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    pub attempts: u32,
    pub backoff: Duration,
    /// Retry when nothing came back.
    pub on_timeout: bool,
    /// Retry when the transport failed.
    pub on_transport_error: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::none()
    }
}

impl RetryPolicy {
    /// A single attempt.
    pub const fn none() -> Self {
        Self {
            attempts: 1,
            backoff: Duration::ZERO,
            on_timeout: false,
            on_transport_error: false,
        }
    }

    fn should_retry<T>(&self, result: &ClientResult<Vec<T>>) -> bool {
        match result {
            Ok(responses) => responses.is_empty() && self.on_timeout,
            Err(ClientError::Transport(_)) => self.on_transport_error,
            Err(_) => false,
        }
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self {
            attempts: config.attempts.max(1),
            backoff: Duration::from_millis(config.backoff_ms),
            on_timeout: config.on_timeout,
            on_transport_error: config.on_transport_error,
        }
    }
}

/// Per-call overrides of the client defaults.
#[derive(Debug, Clone, Copy, Default)]
pub struct CallOptions {
    /// How long to collect responses. Defaults to `request.default_timeout_ms`.
    pub wait: Option<Duration>,
    pub collect: Collect,
    /// Defaults to the client's `[retry]` policy.
    pub retry: Option<RetryPolicy>,
}

impl CallOptions {
    pub fn wait(mut self, wait: Duration) -> Self {
        self.wait = Some(wait);
        self
    }

    pub fn collect(mut self, collect: Collect) -> Self {
        self.collect = collect;
        self
    }

    pub fn retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = Some(retry);
        self
    }
}

/// Result of a peripheral call.
#[derive(Debug, Clone, PartialEq)]
pub enum PeripheralReply<T> {
    /// The device answered and its frame decoded.
    Ok(T),
    /// The daemon reported a nonzero status, e.g. a DPA timeout.
    Status { status: i32, status_str: Option<String> },
}

impl<T> PeripheralReply<T> {
    pub fn ok(self) -> Option<T> {
        match self {
            PeripheralReply::Ok(v) => Some(v),
            PeripheralReply::Status { .. } => None,
        }
    }
}

/// Client for the daemon JSON API.
pub struct DaemonClient<T: Transport = ConfiguredTransport> {
    transport: T,
    default_wait: Duration,
    return_verbose: bool,
    retry: RetryPolicy,
}

impl DaemonClient<ConfiguredTransport> {
    /// Validate `config` and open the configured transport.
    pub async fn connect(config: &ClientConfig) -> ClientResult<Self> {
        config.validate()?;
        let transport = ConfiguredTransport::connect(config).await?;
        info!("Daemon client ready ({:?})", config.transport.kind);
        Ok(Self::with_transport(transport).configure(config))
    }
}

impl<T: Transport> DaemonClient<T> {
    /// Client over an already connected transport, with default settings.
    pub fn with_transport(transport: T) -> Self {
        let defaults = ClientConfig::default();
        Self {
            transport,
            default_wait: defaults.request.default_timeout(),
            return_verbose: defaults.request.return_verbose,
            retry: RetryPolicy::from(&defaults.retry),
        }
    }

    /// Apply the `[request]` and `[retry]` sections of `config`.
    pub fn configure(mut self, config: &ClientConfig) -> Self {
        self.default_wait = config.request.default_timeout();
        self.return_verbose = config.request.return_verbose;
        self.retry = RetryPolicy::from(&config.retry);
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_default_wait(mut self, wait: Duration) -> Self {
        self.default_wait = wait;
        self
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Fresh message id.
    pub fn next_msg_id(&self) -> String {
        Uuid::new_v4().to_string()
    }

    /// Send a request of kind `M` and decode every response.
    ///
    /// An empty msgId is replaced with a fresh one. An empty list means
    /// nothing arrived within the wait.
    pub async fn call<M: Message>(
        &self,
        mut request: Request<M::Req>,
        opts: CallOptions,
    ) -> ClientResult<Vec<Response<M::Rsp>>> {
        if request.data.msg_id.is_empty() {
            request.data.msg_id = self.next_msg_id();
        }
        if self.return_verbose && request.data.return_verbose.is_none() {
            request.data.return_verbose = Some(true);
        }

        let m_type = M::M_TYPE;
        let (msg_id, texts) = self
            .exchange(request.data.msg_id.clone(), opts, |msg_id| {
                request.data.msg_id = msg_id.to_string();
                request.encode()
            })
            .await?;

        let responses = texts
            .iter()
            .map(|text| Response::<M::Rsp>::decode_for::<M>(text))
            .collect::<ApiResult<Vec<_>>>()?;
        debug!("[{}] {} -> {} response(s)", msg_id, m_type, responses.len());
        Ok(responses)
    }

    /// Like [`call`](Self::call), stopping at the first response.
    pub async fn call_one<M: Message>(
        &self,
        request: Request<M::Req>,
        opts: CallOptions,
    ) -> ClientResult<Response<M::Rsp>> {
        let request = if request.msg_id().is_empty() {
            request.with_msg_id(self.next_msg_id())
        } else {
            request
        };
        let msg_id = request.msg_id().to_string();
        let wait = opts.wait.unwrap_or(self.default_wait);
        let opts = CallOptions {
            collect: Collect::First,
            ..opts
        };
        self.call::<M>(request, opts)
            .await?
            .into_iter()
            .next()
            .ok_or(ClientError::NoResponse { msg_id, timeout: wait })
    }

    /// Send a typed peripheral command as `iqrfRawHdp` and decode the
    /// answering frame with the command's adapter.
    pub async fn call_peripheral<C: PeripheralCommand>(
        &self,
        n_adr: u16,
        hwp_id: Option<u16>,
        params: &C::Params,
    ) -> ClientResult<PeripheralReply<C::Output>> {
        let frame = C::build_request(n_adr, hwp_id, params)?;
        let request = Request::of::<RawHdp>(self.next_msg_id(), frame);
        let msg_id = request.msg_id().to_string();
        debug!("[{}] {} to nAdr={}", msg_id, C::M_TYPE, n_adr);

        let response = self.call_one::<RawHdp>(request, CallOptions::default()).await?;
        match response.outcome {
            Outcome::Success(rsp) => Ok(PeripheralReply::Ok(C::parse_response(&rsp)?)),
            Outcome::Failure(e) => {
                debug!("[{}] {} failed with status {}", msg_id, C::M_TYPE, e.status);
                Ok(PeripheralReply::Status {
                    status: e.status,
                    status_str: e.status_str,
                })
            }
        }
    }

    /// Send any request given as JSON and decode whatever comes back.
    ///
    /// A missing or empty `data.msgId` is filled in.
    pub async fn call_raw_json(&self, value: Value, opts: CallOptions) -> ClientResult<Vec<AnyResponse>> {
        let mut value = value;
        if let Some(data) = value.get_mut("data").and_then(Value::as_object_mut) {
            let has_msg_id = data.get("msgId").and_then(Value::as_str).is_some_and(|id| !id.is_empty());
            if !has_msg_id {
                data.insert("msgId".into(), Value::String(self.next_msg_id()));
            }
        }
        let request = AnyRequest::from_value(value.clone())?;
        let m_type = request.m_type();

        let (msg_id, texts) = self
            .exchange(request.msg_id().to_string(), opts, |msg_id| {
                if let Some(data) = value.get_mut("data").and_then(Value::as_object_mut) {
                    data.insert("msgId".into(), Value::String(msg_id.to_string()));
                }
                AnyRequest::from_value(value.clone())?.encode()
            })
            .await?;

        let responses = texts
            .iter()
            .map(|text| AnyResponse::decode(text))
            .collect::<ApiResult<Vec<_>>>()?;
        debug!("[{}] {} -> {} response(s)", msg_id, m_type, responses.len());
        Ok(responses)
    }

    /// Release the transport.
    pub async fn close(self) {
        self.transport.close().await;
    }

    /// Run one exchange under the retry policy. `encode` renders the
    /// request for a given msgId; each retry gets a new one.
    async fn exchange(
        &self,
        first_msg_id: String,
        opts: CallOptions,
        mut encode: impl FnMut(&str) -> ApiResult<String>,
    ) -> ClientResult<(String, Vec<String>)> {
        let wait = opts.wait.unwrap_or(self.default_wait);
        let retry = opts.retry.unwrap_or(self.retry);
        let mut msg_id = first_msg_id;
        let mut attempt = 1;

        loop {
            let text = encode(&msg_id)?;
            let result = self
                .transport
                .exchange(&text, &msg_id, wait, opts.collect)
                .await
                .map_err(ClientError::from);

            if attempt >= retry.attempts || !retry.should_retry(&result) {
                return result.map(|texts| (msg_id, texts));
            }
            match &result {
                Ok(_) => warn!("[{}] attempt {}/{}: no response within {:?}", msg_id, attempt, retry.attempts, wait),
                Err(e) => warn!("[{}] attempt {}/{}: {}", msg_id, attempt, retry.attempts, e),
            }
            tokio::time::sleep(retry.backoff).await;
            attempt += 1;
            msg_id = self.next_msg_id();
        }
    }
}
