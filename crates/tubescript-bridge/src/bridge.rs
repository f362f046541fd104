//! Requester side of the transcript exchange.
//!
//! Per request: `Idle → AwaitingResponse → {Resolved | TimedOut}`. A pending
//! entry lives in the bridge's map from the moment the request is posted
//! until the first correlated response or the timeout, whichever comes
//! first. Later responses for the same id find no entry and are dropped.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use tubescript_core::{Error, Result};
use uuid::Uuid;

use crate::channel::{Channel, Subscription};
use crate::protocol::BridgeMessage;

pub const DEFAULT_BRIDGE_TIMEOUT: Duration = Duration::from_secs(15);

type Outcome = std::result::Result<String, String>;
type PendingMap = Arc<Mutex<HashMap<String, oneshot::Sender<Outcome>>>>;

/// Correlated request/response relay over a `Channel`.
pub struct Bridge {
    channel: Arc<dyn Channel>,
    pending: PendingMap,
    timeout: Duration,
    dispatcher: JoinHandle<()>,
}

impl Bridge {
    /// Subscribe to the channel and start routing responses.
    ///
    /// Must be called inside a tokio runtime.
    pub fn start(channel: Arc<dyn Channel>, timeout: Duration) -> Self {
        let pending: PendingMap = Arc::new(Mutex::new(HashMap::new()));
        let subscription = channel.subscribe();
        let dispatcher = tokio::spawn(dispatch(
            subscription,
            channel.origin().to_string(),
            pending.clone(),
        ));

        info!(
            "Bridge started on origin {} (timeout {:?})",
            channel.origin(),
            timeout
        );

        Self {
            channel,
            pending,
            timeout,
            dispatcher,
        }
    }

    /// Number of requests still awaiting a response.
    pub fn pending_count(&self) -> usize {
        self.pending.lock().len()
    }

    /// Request a transcript, distinguishing the failure classes.
    ///
    /// A peer error comes back as `Error::Remote`, silence as
    /// `Error::ChannelTimeout`. The extractor call on the far side is not
    /// cancelled by a timeout.
    pub async fn request(&self) -> Result<String> {
        let correlation_id = Uuid::new_v4().to_string();
        let (tx, rx) = oneshot::channel();

        self.pending.lock().insert(correlation_id.clone(), tx);
        let _entry = PendingEntry {
            pending: &self.pending,
            correlation_id: &correlation_id,
        };

        debug!("Posting transcript request {}", correlation_id);
        self.channel
            .post(BridgeMessage::request(&correlation_id).to_value())?;

        match tokio::time::timeout(self.timeout, rx).await {
            Ok(Ok(Ok(transcript))) => Ok(transcript),
            Ok(Ok(Err(message))) => Err(Error::Remote(message)),
            Ok(Err(_)) => Err(Error::Channel("bridge dispatcher stopped".into())),
            Err(_) => Err(Error::ChannelTimeout(self.timeout)),
        }
    }

    /// Request a transcript; every failure collapses to `None`.
    pub async fn request_transcript(&self) -> Option<String> {
        match self.request().await {
            Ok(transcript) => Some(transcript),
            Err(e) => {
                warn!("No transcript: {}", e);
                None
            }
        }
    }
}

impl Drop for Bridge {
    fn drop(&mut self) {
        self.dispatcher.abort();
    }
}

/// Removes a pending entry however the request ends, including when the
/// awaiting future is dropped.
struct PendingEntry<'a> {
    pending: &'a PendingMap,
    correlation_id: &'a str,
}

impl Drop for PendingEntry<'_> {
    fn drop(&mut self) {
        self.pending.lock().remove(self.correlation_id);
    }
}

async fn dispatch(mut subscription: Subscription, origin: String, pending: PendingMap) {
    while let Some(envelope) = subscription.recv().await {
        if envelope.origin != origin {
            debug!("Ignoring message from foreign origin {}", envelope.origin);
            continue;
        }

        let Some((correlation_id, outcome)) =
            BridgeMessage::from_value(&envelope.data).and_then(BridgeMessage::into_result)
        else {
            continue;
        };

        let waiter = pending.lock().remove(&correlation_id);
        match waiter {
            Some(tx) => {
                if tx.send(outcome).is_err() {
                    debug!("Requester for {} went away", correlation_id);
                }
            }
            None => debug!("Ignoring response for settled or unknown request {}", correlation_id),
        }
    }
    debug!("Bridge dispatcher stopped: channel closed");
}
