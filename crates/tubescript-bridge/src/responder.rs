//! Extractor side of the exchange: answer each request exactly once.

use std::future::Future;
use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use tubescript_core::Result;
use tubescript_extract::Extractor;

use crate::channel::Channel;
use crate::protocol::BridgeMessage;

/// Anything that can produce a rendered transcript on demand.
pub trait TranscriptSource: Send + Sync + 'static {
    fn get_transcript(&self) -> impl Future<Output = Result<String>> + Send;
}

impl TranscriptSource for Extractor {
    fn get_transcript(&self) -> impl Future<Output = Result<String>> + Send {
        Extractor::get_transcript(self)
    }
}

/// Listens for `GET_TRANSCRIPT` on a channel and posts one
/// `TRANSCRIPT_RESULT` per request.
pub struct TranscriptResponder {
    listener: JoinHandle<()>,
}

impl TranscriptResponder {
    /// Must be called inside a tokio runtime.
    pub fn start<S: TranscriptSource>(channel: Arc<dyn Channel>, source: Arc<S>) -> Self {
        let mut subscription = channel.subscribe();
        let origin = channel.origin().to_string();
        info!("Transcript responder listening on origin {}", origin);

        let listener = tokio::spawn(async move {
            while let Some(envelope) = subscription.recv().await {
                if envelope.origin != origin {
                    continue;
                }
                let Some(BridgeMessage::GetTranscript { correlation_id }) =
                    BridgeMessage::from_value(&envelope.data)
                else {
                    continue;
                };

                debug!("Serving transcript request {}", correlation_id);
                let channel = channel.clone();
                let source = source.clone();
                tokio::spawn(async move {
                    let reply = match source.get_transcript().await {
                        Ok(transcript) => BridgeMessage::success(&correlation_id, transcript),
                        Err(e) => {
                            warn!("Transcript request {} failed: {}", correlation_id, e);
                            BridgeMessage::failure(&correlation_id, e.to_string())
                        }
                    };
                    if let Err(e) = channel.post(reply.to_value()) {
                        warn!("Could not post result for {}: {}", correlation_id, e);
                    }
                });
            }
            debug!("Transcript responder stopped: channel closed");
        });

        Self { listener }
    }
}

impl Drop for TranscriptResponder {
    fn drop(&mut self) {
        self.listener.abort();
    }
}
