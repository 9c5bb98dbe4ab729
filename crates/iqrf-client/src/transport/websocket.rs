// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! WebSocket transport.
//!
//! The daemon listens on `ws://<host>:1338` and expects the `iqrf`
//! subprotocol. The socket is split: requests and pongs go through a
//! shared writer, and a spawned listener feeds every text frame to the
//! correlator.

use super::Transport;
use crate::config::WebSocketConfig;
use crate::correlator::{Collect, Correlator};
use crate::error::{TransportError, TransportResult};
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::{debug, error, info, trace, warn};

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;
type Writer = Arc<Mutex<SplitSink<Socket, Message>>>;

/// Connection to the daemon's WebSocket API.
pub struct WsTransport {
    url: String,
    writer: Writer,
    correlator: Arc<Correlator>,
    listener: JoinHandle<()>,
}

impl WsTransport {
    /// Open the connection and start the listener.
    pub async fn connect(config: &WebSocketConfig) -> TransportResult<Self> {
        let mut request = config
            .url
            .as_str()
            .into_client_request()
            .map_err(|e| TransportError::InvalidEndpoint(format!("{}: {}", config.url, e)))?;
        let protocol = HeaderValue::from_str(&config.subprotocol)
            .map_err(|e| TransportError::InvalidEndpoint(format!("subprotocol '{}': {}", config.subprotocol, e)))?;
        request.headers_mut().insert("Sec-WebSocket-Protocol", protocol);

        let timeout = config.connect_timeout();
        let (socket, _) = tokio::time::timeout(timeout, tokio_tungstenite::connect_async(request))
            .await
            .map_err(|_| TransportError::ConnectTimeout {
                endpoint: config.url.clone(),
                timeout,
            })??;
        info!("Connected to {}", config.url);

        let (sink, stream) = socket.split();
        let writer: Writer = Arc::new(Mutex::new(sink));
        let correlator = Correlator::new();
        let listener = tokio::spawn(listen(
            config.url.clone(),
            stream,
            Arc::clone(&writer),
            Arc::clone(&correlator),
        ));

        Ok(Self {
            url: config.url.clone(),
            writer,
            correlator,
            listener,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Number of exchanges waiting for responses.
    pub fn pending(&self) -> usize {
        self.correlator.pending()
    }
}

async fn listen(url: String, mut stream: SplitStream<Socket>, writer: Writer, correlator: Arc<Correlator>) {
    while let Some(frame) = stream.next().await {
        match frame {
            Ok(Message::Text(text)) => correlator.dispatch(text),
            Ok(Message::Ping(payload)) => {
                trace!("Ping from {}", url);
                if let Err(e) = writer.lock().await.send(Message::Pong(payload)).await {
                    debug!("Pong to {} failed: {}", url, e);
                }
            }
            Ok(Message::Pong(_)) => trace!("Pong from {}", url),
            Ok(Message::Binary(data)) => warn!("Ignoring {} byte binary frame from {}", data.len(), url),
            Ok(Message::Close(frame)) => {
                info!("{} closed the connection: {:?}", url, frame);
                break;
            }
            Ok(Message::Frame(_)) => {}
            Err(e) => {
                error!("WebSocket error on {}: {}", url, e);
                break;
            }
        }
    }
    correlator.close();
    debug!("Listener for {} stopped", url);
}

impl Transport for WsTransport {
    async fn exchange(
        &self,
        message: &str,
        msg_id: &str,
        wait: Duration,
        collect: Collect,
    ) -> TransportResult<Vec<String>> {
        let mut exchange = self.correlator.register(msg_id)?;
        debug!("[{}] -> {} ({} bytes)", msg_id, self.url, message.len());
        self.writer
            .lock()
            .await
            .send(Message::Text(message.to_string()))
            .await?;
        exchange.collect(wait, collect).await
    }

    async fn close(&self) {
        self.correlator.close();
        let mut writer = self.writer.lock().await;
        if let Err(e) = writer.send(Message::Close(None)).await {
            debug!("Close handshake with {} failed: {}", self.url, e);
        }
        self.listener.abort();
    }
}

impl Drop for WsTransport {
    fn drop(&mut self) {
        self.correlator.close();
        self.listener.abort();
    }
}
