// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! In-process loopback transport.
//!
//! The far end is a [`Loopback`]: whoever holds it plays the daemon,
//! reading request text and writing response text in any order.

use super::Transport;
use crate::correlator::{Collect, Correlator};
use crate::error::{TransportError, TransportResult};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

/// Transport whose peer lives in the same process.
pub struct ChannelTransport {
    requests: mpsc::UnboundedSender<String>,
    correlator: Arc<Correlator>,
    listener: JoinHandle<()>,
}

/// Daemon side of a [`ChannelTransport`].
pub struct Loopback {
    requests: mpsc::UnboundedReceiver<String>,
    responses: mpsc::UnboundedSender<String>,
}

impl Loopback {
    /// Next request written by the client, or `None` once it is gone.
    pub async fn recv(&mut self) -> Option<String> {
        self.requests.recv().await
    }

    /// Deliver one message to the client.
    pub fn reply(&self, text: impl Into<String>) -> TransportResult<()> {
        self.responses
            .send(text.into())
            .map_err(|_| TransportError::ConnectionClosed)
    }

    /// A handle for replying from another task.
    pub fn responder(&self) -> mpsc::UnboundedSender<String> {
        self.responses.clone()
    }
}

impl ChannelTransport {
    /// A connected transport and its daemon end.
    pub fn pair() -> (Self, Loopback) {
        let (req_tx, req_rx) = mpsc::unbounded_channel();
        let (rsp_tx, mut rsp_rx) = mpsc::unbounded_channel::<String>();
        let correlator = Correlator::new();

        let feed = Arc::clone(&correlator);
        let listener = tokio::spawn(async move {
            while let Some(text) = rsp_rx.recv().await {
                feed.dispatch(text);
            }
            feed.close();
            debug!("Loopback closed");
        });

        let transport = Self {
            requests: req_tx,
            correlator,
            listener,
        };
        let loopback = Loopback {
            requests: req_rx,
            responses: rsp_tx,
        };
        (transport, loopback)
    }

    /// A transport answered by `handler`: each request maps to zero or
    /// more response messages.
    pub fn with_handler<F>(handler: F) -> Self
    where
        F: Fn(&str) -> Vec<String> + Send + 'static,
    {
        let (transport, mut loopback) = Self::pair();
        tokio::spawn(async move {
            while let Some(request) = loopback.recv().await {
                for response in handler(&request) {
                    if loopback.reply(response).is_err() {
                        return;
                    }
                }
            }
        });
        transport
    }

    /// Number of exchanges waiting for responses.
    pub fn pending(&self) -> usize {
        self.correlator.pending()
    }
}

impl Transport for ChannelTransport {
    async fn exchange(
        &self,
        message: &str,
        msg_id: &str,
        wait: Duration,
        collect: Collect,
    ) -> TransportResult<Vec<String>> {
        let mut exchange = self.correlator.register(msg_id)?;
        self.requests
            .send(message.to_string())
            .map_err(|_| TransportError::ConnectionClosed)?;
        exchange.collect(wait, collect).await
    }

    async fn close(&self) {
        self.correlator.close();
        self.listener.abort();
    }
}

impl Drop for ChannelTransport {
    fn drop(&mut self) {
        self.listener.abort();
    }
}
