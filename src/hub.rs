//! Broadcast Hub — fans out [`StatusUpdate`]s to subscribed transport
//! adapters (§4.5).
//!
//! The teacher's `api/websocket.rs` shares one `tokio::sync::broadcast`
//! sender across every connected client, which is the right shape when
//! every subscriber should see every message or lag identically. This
//! hub needs the opposite per-subscriber behavior — a slow subscriber
//! drops its own messages on overflow rather than dragging every other
//! subscriber's lag counter, and a subscriber is evicted only when its
//! adapter reports a write failure, not on overflow — so it keeps its own
//! per-subscriber `mpsc` inbox instead of one shared ring buffer.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::{RwLock, mpsc};
use tracing::{debug, trace, warn};

use crate::domain::StatusUpdate;

pub type SubscriberId = u64;

/// Receiving half of a subscription; yielded by [`Hub::subscribe`].
pub type Inbox = mpsc::Receiver<StatusUpdate>;

struct Subscriber {
    sender: mpsc::Sender<StatusUpdate>,
}

/// Shared fan-out point between the Probe Runner and the Transport Adapter.
pub struct Hub {
    subscribers: RwLock<HashMap<SubscriberId, Subscriber>>,
    next_id: AtomicU64,
    inbox_cap: usize,
}

impl Hub {
    pub fn new(inbox_cap: usize) -> Arc<Self> {
        Arc::new(Self {
            subscribers: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(1),
            inbox_cap,
        })
    }

    /// Register a new subscriber, returning its id and the receiving half
    /// of its bounded inbox.
    pub async fn subscribe(&self) -> (SubscriberId, Inbox) {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::channel(self.inbox_cap);
        self.subscribers.write().await.insert(id, Subscriber { sender: tx });
        debug!(subscriber_id = id, "hub: subscriber registered");
        (id, rx)
    }

    /// Remove a subscriber, e.g. after its Transport Adapter reports a
    /// write failure. Never called on overflow — only on a real write
    /// failure signaled by the adapter.
    pub async fn evict(&self, id: SubscriberId) {
        if self.subscribers.write().await.remove(&id).is_some() {
            debug!(subscriber_id = id, "hub: subscriber evicted");
        }
    }

    /// Best-effort fan-out: each subscriber's inbox is written to with
    /// `try_send`; a full inbox drops this one message for that
    /// subscriber without evicting it.
    pub async fn publish(&self, update: StatusUpdate) {
        let subscribers = self.subscribers.read().await;
        for (id, subscriber) in subscribers.iter() {
            match subscriber.sender.try_send(update.clone()) {
                Ok(()) => {}
                Err(mpsc::error::TrySendError::Full(_)) => {
                    warn!(subscriber_id = id, "hub: subscriber inbox full, dropping update");
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    trace!(subscriber_id = id, "hub: subscriber channel closed");
                }
            }
        }
    }

    pub async fn subscriber_count(&self) -> usize {
        self.subscribers.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use crate::domain::ServiceStatus;

    fn update(service_id: i64) -> StatusUpdate {
        StatusUpdate {
            service_id,
            status: ServiceStatus::Alive,
            timestamp: Utc::now(),
        }
    }

    #[tokio::test]
    async fn fans_out_to_all_subscribers() {
        let hub = Hub::new(10);
        let (_id_a, mut rx_a) = hub.subscribe().await;
        let (_id_b, mut rx_b) = hub.subscribe().await;

        hub.publish(update(1)).await;

        assert_eq!(rx_a.recv().await.unwrap().service_id, 1);
        assert_eq!(rx_b.recv().await.unwrap().service_id, 1);
    }

    #[tokio::test]
    async fn full_inbox_drops_without_evicting_subscriber() {
        let hub = Hub::new(1);
        let (id, mut rx) = hub.subscribe().await;

        hub.publish(update(1)).await;
        hub.publish(update(2)).await; // inbox already full, dropped silently

        assert_eq!(hub.subscriber_count().await, 1);
        let first = rx.recv().await.unwrap();
        assert_eq!(first.service_id, 1);

        let _ = id;
    }

    #[tokio::test]
    async fn evict_removes_subscriber() {
        let hub = Hub::new(10);
        let (id, _rx) = hub.subscribe().await;
        assert_eq!(hub.subscriber_count().await, 1);

        hub.evict(id).await;
        assert_eq!(hub.subscriber_count().await, 0);
    }
}
