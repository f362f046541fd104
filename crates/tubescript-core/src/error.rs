//! Error types for TubeScript.

use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration unavailable: {0}")]
    ConfigurationUnavailable(String),

    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("Captions unavailable for video {0}")]
    CaptionsUnavailable(String),

    #[error("Parse failure: {0}")]
    ParseFailure(String),

    #[error("Caption fetch timed out after {0:?}")]
    FetchTimeout(Duration),

    #[error("No response on channel within {0:?}")]
    ChannelTimeout(Duration),

    #[error("No video id in location: {0}")]
    InvalidLocation(String),

    #[error("Peer reported error: {0}")]
    Remote(String),

    #[error("Channel error: {0}")]
    Channel(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// True for the two timeout variants (payload fetch and channel round trip).
    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::FetchTimeout(_) | Error::ChannelTimeout(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
