// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! MQTT transport.
//!
//! Requests are published to `Iqrf/DpaRequest` and responses arrive on
//! `Iqrf/DpaResponse`. The rumqttc event loop runs in a spawned task that
//! reconnects on its own; exchanges in flight when the broker drops are
//! failed, later ones ride the new connection. Sessions are clean, so the
//! response topic is subscribed again on every ConnAck.

use super::Transport;
use crate::config::MqttConfig;
use crate::correlator::{Collect, Correlator};
use crate::error::{TransportError, TransportResult};
use rumqttc::{AsyncClient, Event, EventLoop, MqttOptions, Packet, QoS};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};
use uuid::Uuid;

const CHANNEL_CAPACITY: usize = 64;
const RECONNECT_DELAY: Duration = Duration::from_secs(1);

/// Connection to the daemon through an MQTT broker.
pub struct MqttTransport {
    client: AsyncClient,
    request_topic: String,
    qos: QoS,
    retain: bool,
    correlator: Arc<Correlator>,
    event_loop: JoinHandle<()>,
}

fn to_qos(level: u8) -> TransportResult<QoS> {
    match level {
        0 => Ok(QoS::AtMostOnce),
        1 => Ok(QoS::AtLeastOnce),
        2 => Ok(QoS::ExactlyOnce),
        other => Err(TransportError::InvalidEndpoint(format!("QoS {} is not 0, 1 or 2", other))),
    }
}

impl MqttTransport {
    /// Connect to the broker, wait for its ConnAck and subscribe to the
    /// response topic.
    pub async fn connect(config: &MqttConfig) -> TransportResult<Self> {
        let qos = to_qos(config.qos)?;
        let client_id = if config.client_id.is_empty() {
            format!("iqrf-client-{}", &Uuid::new_v4().simple().to_string()[..8])
        } else {
            config.client_id.clone()
        };
        let endpoint = format!("{}:{}", config.broker_host, config.broker_port);

        let mut options = MqttOptions::new(client_id.as_str(), config.broker_host.as_str(), config.broker_port);
        options.set_keep_alive(config.keep_alive());
        options.set_clean_session(true);

        let (client, mut event_loop) = AsyncClient::new(options, CHANNEL_CAPACITY);

        let timeout = config.connect_timeout();
        tokio::time::timeout(timeout, wait_for_connack(&mut event_loop))
            .await
            .map_err(|_| TransportError::ConnectTimeout {
                endpoint: endpoint.clone(),
                timeout,
            })??;
        info!("[{}] Connected to broker {}", client_id, endpoint);

        client.subscribe(config.response_topic.as_str(), qos).await?;

        let correlator = Correlator::new();
        let event_loop = tokio::spawn(poll(
            event_loop,
            Resubscribe {
                client: client.clone(),
                topic: config.response_topic.clone(),
                qos,
            },
            Arc::clone(&correlator),
        ));

        Ok(Self {
            client,
            request_topic: config.request_topic.clone(),
            qos,
            retain: config.retain,
            correlator,
            event_loop,
        })
    }

    /// Number of exchanges waiting for responses.
    pub fn pending(&self) -> usize {
        self.correlator.pending()
    }
}

async fn wait_for_connack(event_loop: &mut EventLoop) -> TransportResult<()> {
    loop {
        if let Event::Incoming(Packet::ConnAck(ack)) = event_loop.poll().await? {
            debug!("ConnAck: {:?}", ack.code);
            return Ok(());
        }
    }
}

/// Subscription renewed after each reconnect.
struct Resubscribe {
    client: AsyncClient,
    topic: String,
    qos: QoS,
}

async fn poll(mut event_loop: EventLoop, subscription: Resubscribe, correlator: Arc<Correlator>) {
    let response_topic = subscription.topic.as_str();
    while !correlator.is_closed() {
        match event_loop.poll().await {
            Ok(Event::Incoming(Packet::Publish(publish))) => {
                if publish.topic != response_topic {
                    trace!("Ignoring publish on {}", publish.topic);
                    continue;
                }
                match String::from_utf8(publish.payload.to_vec()) {
                    Ok(text) => correlator.dispatch(text),
                    Err(_) => warn!("Dropping non UTF-8 payload on {}", publish.topic),
                }
            }
            Ok(Event::Incoming(Packet::SubAck(_))) => debug!("Subscribed to {}", response_topic),
            Ok(Event::Incoming(Packet::ConnAck(_))) => {
                info!("Reconnected to broker");
                // This loop drains the request channel; never await it here.
                if let Err(e) = subscription.client.try_subscribe(response_topic, subscription.qos) {
                    warn!("Resubscribe to {} failed: {}", response_topic, e);
                }
            }
            Ok(Event::Incoming(Packet::Disconnect)) => {
                info!("Broker sent disconnect");
                correlator.fail_all();
            }
            Ok(_) => {}
            Err(e) => {
                if correlator.is_closed() {
                    break;
                }
                warn!("MQTT connection error: {}, reconnecting", e);
                correlator.fail_all();
                tokio::time::sleep(RECONNECT_DELAY).await;
            }
        }
    }
    debug!("MQTT event loop stopped");
}

impl Transport for MqttTransport {
    async fn exchange(
        &self,
        message: &str,
        msg_id: &str,
        wait: Duration,
        collect: Collect,
    ) -> TransportResult<Vec<String>> {
        let mut exchange = self.correlator.register(msg_id)?;
        debug!("[{}] -> {} ({} bytes)", msg_id, self.request_topic, message.len());
        self.client
            .publish(self.request_topic.as_str(), self.qos, self.retain, message.as_bytes().to_vec())
            .await?;
        exchange.collect(wait, collect).await
    }

    async fn close(&self) {
        self.correlator.close();
        if let Err(e) = self.client.disconnect().await {
            debug!("MQTT disconnect failed: {}", e);
        }
    }
}

impl Drop for MqttTransport {
    fn drop(&mut self) {
        self.correlator.close();
        self.event_loop.abort();
    }
}
