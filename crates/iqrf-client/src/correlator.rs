// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Routing of inbound messages to in-flight exchanges by `msgId`.
//!
//! Every transport feeds its inbound text through one [`Correlator`].
//! A caller registers an [`Exchange`] before writing its request, so a
//! response racing the write is never lost, then drains it with
//! [`Exchange::collect`]. Dropping the exchange unregisters it.

use crate::error::{TransportError, TransportResult};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use iqrf_api::message::peek_header;
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, trace, warn};

/// When an exchange stops collecting before its wait elapses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Collect {
    /// Collect every response until the wait elapses.
    #[default]
    UntilTimeout,
    /// Stop after the first response.
    First,
    /// Stop after the last progress report of a multi-response call
    /// (`rsp.lastWave == true`) or any response that is not a progress
    /// report.
    UntilFinal,
}

impl Collect {
    /// Whether `text`, just received, completes the exchange.
    pub fn is_complete(self, text: &str) -> bool {
        match self {
            Collect::UntilTimeout => false,
            Collect::First => true,
            Collect::UntilFinal => {
                let Ok(value) = serde_json::from_str::<Value>(text) else {
                    return true;
                };
                let data = &value["data"];
                if data["status"].as_i64().unwrap_or(0) != 0 {
                    return true;
                }
                data["rsp"]["lastWave"].as_bool().unwrap_or(true)
            }
        }
    }
}

/// In-flight exchanges of one connection.
pub struct Correlator {
    pending: DashMap<String, mpsc::UnboundedSender<String>>,
    closed: AtomicBool,
}

impl Correlator {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            pending: DashMap::new(),
            closed: AtomicBool::new(false),
        })
    }

    /// Start collecting messages for `msg_id`.
    pub fn register(self: &Arc<Self>, msg_id: &str) -> TransportResult<Exchange> {
        if self.closed.load(Ordering::Acquire) {
            return Err(TransportError::ConnectionClosed);
        }
        let (tx, rx) = mpsc::unbounded_channel();
        match self.pending.entry(msg_id.to_string()) {
            Entry::Occupied(_) => return Err(TransportError::DuplicateMsgId(msg_id.to_string())),
            Entry::Vacant(slot) => {
                slot.insert(tx);
            }
        }
        trace!("[{}] exchange registered", msg_id);
        Ok(Exchange {
            correlator: Arc::clone(self),
            msg_id: msg_id.to_string(),
            rx,
        })
    }

    /// Route one inbound message to its exchange.
    pub fn dispatch(&self, text: String) {
        let Some((m_type, msg_id)) = peek_header(&text) else {
            warn!("Dropping inbound message without data.msgId ({} bytes)", text.len());
            return;
        };
        let m_type = m_type.as_deref().unwrap_or("?");
        match self.pending.get(&msg_id) {
            Some(tx) => {
                trace!("[{}] <- {}", msg_id, m_type);
                if tx.send(text).is_err() {
                    debug!("[{}] exchange already finished, dropping {}", msg_id, m_type);
                }
            }
            None => debug!("[{}] no exchange waiting, dropping {}", msg_id, m_type),
        }
    }

    /// Fail every in-flight exchange with [`TransportError::ConnectionClosed`].
    ///
    /// New exchanges may still register, e.g. after an MQTT reconnect.
    pub fn fail_all(&self) {
        let failed = self.pending.len();
        self.pending.clear();
        if failed > 0 {
            warn!("Connection lost with {} exchange(s) in flight", failed);
        }
    }

    /// Fail every in-flight exchange and refuse new ones.
    pub fn close(&self) {
        self.closed.store(true, Ordering::Release);
        self.fail_all();
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Number of in-flight exchanges.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }
}

/// Messages collected for one msgId.
pub struct Exchange {
    correlator: Arc<Correlator>,
    msg_id: String,
    rx: mpsc::UnboundedReceiver<String>,
}

impl Exchange {
    pub fn msg_id(&self) -> &str {
        &self.msg_id
    }

    /// Collect messages in receipt order until `wait` elapses or `policy`
    /// says the exchange is complete.
    ///
    /// An empty list means nothing arrived in time. A connection lost
    /// before anything arrived is [`TransportError::ConnectionClosed`];
    /// after that, the messages received so far are returned.
    pub async fn collect(&mut self, wait: Duration, policy: Collect) -> TransportResult<Vec<String>> {
        let deadline = tokio::time::Instant::now() + wait;
        let mut received = Vec::new();
        loop {
            match tokio::time::timeout_at(deadline, self.rx.recv()).await {
                Ok(Some(text)) => {
                    let done = policy.is_complete(&text);
                    received.push(text);
                    if done {
                        break;
                    }
                }
                Ok(None) if received.is_empty() => return Err(TransportError::ConnectionClosed),
                Ok(None) => {
                    warn!(
                        "[{}] connection lost after {} response(s)",
                        self.msg_id,
                        received.len()
                    );
                    break;
                }
                Err(_) => {
                    if received.is_empty() {
                        debug!("[{}] no response within {:?}", self.msg_id, wait);
                    }
                    break;
                }
            }
        }
        Ok(received)
    }
}

impl Drop for Exchange {
    fn drop(&mut self) {
        // Only our own entry has a closed receiver; a newer exchange reusing
        // the msgId keeps its slot.
        self.rx.close();
        self.correlator
            .pending
            .remove_if(&self.msg_id, |_, tx| tx.is_closed());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn msg(msg_id: &str, rsp: Value) -> String {
        json!({"mType": "iqmeshNetwork_AutoNetwork", "data": {"msgId": msg_id, "rsp": rsp, "status": 0}})
            .to_string()
    }

    #[tokio::test]
    async fn test_routes_by_msg_id() {
        let correlator = Correlator::new();
        let mut a = correlator.register("a").unwrap();
        let mut b = correlator.register("b").unwrap();
        correlator.dispatch(msg("b", json!({})));
        correlator.dispatch(msg("a", json!({"n": 1})));
        correlator.dispatch(msg("a", json!({"n": 2})));

        let got_a = a.collect(Duration::from_millis(20), Collect::UntilTimeout).await.unwrap();
        let got_b = b.collect(Duration::from_millis(20), Collect::UntilTimeout).await.unwrap();
        assert_eq!(got_a.len(), 2);
        assert!(got_a[0].contains("\"n\":1"));
        assert_eq!(got_b.len(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_in_flight_msg_id_is_rejected() {
        let correlator = Correlator::new();
        let first = correlator.register("dup").unwrap();
        assert!(matches!(
            correlator.register("dup"),
            Err(TransportError::DuplicateMsgId(id)) if id == "dup"
        ));
        drop(first);
        assert_eq!(correlator.pending(), 0);
        assert!(correlator.register("dup").is_ok());
    }

    #[tokio::test]
    async fn test_timeout_yields_empty() {
        let correlator = Correlator::new();
        let mut ex = correlator.register("quiet").unwrap();
        let got = ex.collect(Duration::from_millis(10), Collect::First).await.unwrap();
        assert!(got.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_and_malformed_messages_are_dropped() {
        let correlator = Correlator::new();
        let mut ex = correlator.register("x").unwrap();
        correlator.dispatch("not json".into());
        correlator.dispatch(json!({"mType": "iqrfRaw", "data": {}}).to_string());
        correlator.dispatch(msg("other", json!({})));
        let got = ex.collect(Duration::from_millis(10), Collect::UntilTimeout).await.unwrap();
        assert!(got.is_empty());
    }

    #[tokio::test]
    async fn test_until_final_stops_on_last_wave() {
        let correlator = Correlator::new();
        let mut ex = correlator.register("an").unwrap();
        correlator.dispatch(msg("an", json!({"wave": 1, "lastWave": false})));
        correlator.dispatch(msg("an", json!({"wave": 2, "lastWave": true})));
        correlator.dispatch(msg("an", json!({"wave": 3, "lastWave": false})));
        let got = ex.collect(Duration::from_secs(5), Collect::UntilFinal).await.unwrap();
        assert_eq!(got.len(), 2);
    }

    #[test]
    fn test_until_final_treats_failures_as_final() {
        let failed = json!({"mType": "x", "data": {"msgId": "a", "status": -1}}).to_string();
        assert!(Collect::UntilFinal.is_complete(&failed));
        assert!(!Collect::UntilTimeout.is_complete(&failed));
    }

    proptest::proptest! {
        #[test]
        fn test_arbitrary_inbound_text_is_harmless(text in ".*") {
            let correlator = Correlator::new();
            correlator.dispatch(text.clone());
            let _ = Collect::UntilFinal.is_complete(&text);
            proptest::prop_assert_eq!(correlator.pending(), 0);
        }
    }

    #[tokio::test]
    async fn test_close_fails_pending_and_refuses_new() {
        let correlator = Correlator::new();
        let mut ex = correlator.register("c").unwrap();
        correlator.close();
        assert!(matches!(
            ex.collect(Duration::from_secs(5), Collect::UntilTimeout).await,
            Err(TransportError::ConnectionClosed)
        ));
        assert!(matches!(correlator.register("d"), Err(TransportError::ConnectionClosed)));
    }
}
