use serde::{Deserialize, Serialize};

/// One caption cue: start offset and its normalized text.
///
/// Text is never empty and never contains a raw newline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptLine {
    #[serde(rename = "startMs")]
    pub start_ms: u64,
    pub text: String,
}

impl TranscriptLine {
    pub fn new(start_ms: u64, text: impl Into<String>) -> Self {
        Self {
            start_ms,
            text: text.into(),
        }
    }
}
