//! Transcript bridge: correlated request/response over a message channel.
//!
//! The requesting context cannot call the extractor directly. It posts a
//! `GET_TRANSCRIPT` message carrying a fresh correlation id and waits (up to
//! a fixed bound) for the matching `TRANSCRIPT_RESULT`. The extractor side
//! runs a `TranscriptResponder` on the same channel.

pub mod bridge;
pub mod channel;
pub mod protocol;
pub mod responder;

pub use bridge::{Bridge, DEFAULT_BRIDGE_TIMEOUT};
pub use channel::{BusHandle, Channel, Envelope, MessageBus, Subscription};
pub use protocol::BridgeMessage;
pub use responder::{TranscriptResponder, TranscriptSource};
