//! Message channel capability and the in-process bus implementing it.

use serde_json::Value;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, warn};
use tubescript_core::Result;

const DEFAULT_BUS_CAPACITY: usize = 64;

/// A posted payload stamped with the poster's origin.
#[derive(Debug, Clone)]
pub struct Envelope {
    pub origin: String,
    pub data: Value,
}

/// Bidirectional messaging surface shared by two contexts.
pub trait Channel: Send + Sync {
    /// The context that owns this end of the channel.
    fn origin(&self) -> &str;

    /// Post a payload. Delivery is best-effort.
    fn post(&self, data: Value) -> Result<()>;

    /// Receive every envelope posted after this call.
    fn subscribe(&self) -> Subscription;
}

/// Stream of envelopes from a channel.
pub struct Subscription {
    rx: broadcast::Receiver<Envelope>,
}

impl Subscription {
    pub fn new(rx: broadcast::Receiver<Envelope>) -> Self {
        Self { rx }
    }

    /// Next envelope, or `None` once the channel is closed.
    pub async fn recv(&mut self) -> Option<Envelope> {
        loop {
            match self.rx.recv().await {
                Ok(envelope) => return Some(envelope),
                Err(RecvError::Lagged(skipped)) => {
                    warn!("Subscriber lagged, {} messages dropped", skipped);
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }
}

/// In-process broadcast bus. Every subscriber sees every envelope.
#[derive(Debug, Clone)]
pub struct MessageBus {
    tx: broadcast::Sender<Envelope>,
}

impl MessageBus {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_BUS_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// A channel end that posts as `origin`.
    pub fn handle(&self, origin: impl Into<String>) -> BusHandle {
        BusHandle {
            origin: origin.into(),
            tx: self.tx.clone(),
        }
    }
}

impl Default for MessageBus {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone)]
pub struct BusHandle {
    origin: String,
    tx: broadcast::Sender<Envelope>,
}

impl Channel for BusHandle {
    fn origin(&self) -> &str {
        &self.origin
    }

    fn post(&self, data: Value) -> Result<()> {
        let envelope = Envelope {
            origin: self.origin.clone(),
            data,
        };
        if self.tx.send(envelope).is_err() {
            // Nobody listening; the requester finds out through its timeout.
            debug!("Message from {} had no subscribers", self.origin);
        }
        Ok(())
    }

    fn subscribe(&self) -> Subscription {
        Subscription::new(self.tx.subscribe())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_envelopes_carry_origin() {
        let bus = MessageBus::new();
        let page = bus.handle("page");
        let frame = bus.handle("frame");
        let mut sub = page.subscribe();

        frame.post(json!({ "n": 1 })).unwrap();
        page.post(json!({ "n": 2 })).unwrap();

        let first = sub.recv().await.unwrap();
        assert_eq!(first.origin, "frame");
        assert_eq!(first.data["n"], 1);
        let second = sub.recv().await.unwrap();
        assert_eq!(second.origin, "page");
    }

    #[tokio::test]
    async fn test_post_without_subscribers_is_not_an_error() {
        let bus = MessageBus::new();
        assert!(bus.handle("page").post(json!({})).is_ok());
    }

    #[tokio::test]
    async fn test_subscription_ends_when_bus_dropped() {
        let bus = MessageBus::new();
        let mut sub = bus.handle("page").subscribe();
        drop(bus);
        assert!(sub.recv().await.is_none());
    }
}
