//! Wire messages exchanged across the context boundary.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum BridgeMessage {
    #[serde(rename = "GET_TRANSCRIPT")]
    GetTranscript {
        #[serde(rename = "correlationId")]
        correlation_id: String,
    },

    /// Exactly one of `transcript` / `error` is present.
    #[serde(rename = "TRANSCRIPT_RESULT")]
    TranscriptResult {
        #[serde(rename = "correlationId")]
        correlation_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        transcript: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },
}

impl BridgeMessage {
    pub fn request(correlation_id: impl Into<String>) -> Self {
        BridgeMessage::GetTranscript {
            correlation_id: correlation_id.into(),
        }
    }

    pub fn success(correlation_id: impl Into<String>, transcript: impl Into<String>) -> Self {
        BridgeMessage::TranscriptResult {
            correlation_id: correlation_id.into(),
            transcript: Some(transcript.into()),
            error: None,
        }
    }

    pub fn failure(correlation_id: impl Into<String>, error: impl Into<String>) -> Self {
        BridgeMessage::TranscriptResult {
            correlation_id: correlation_id.into(),
            transcript: None,
            error: Some(error.into()),
        }
    }

    /// Parse an arbitrary channel payload. Anything outside the protocol
    /// shape yields `None`.
    pub fn from_value(value: &Value) -> Option<Self> {
        let message: BridgeMessage = serde_json::from_value(value.clone()).ok()?;
        message.is_well_formed().then_some(message)
    }

    pub fn to_value(&self) -> Value {
        // Serializing a plain enum of strings cannot fail.
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    pub fn correlation_id(&self) -> &str {
        match self {
            BridgeMessage::GetTranscript { correlation_id }
            | BridgeMessage::TranscriptResult { correlation_id, .. } => correlation_id,
        }
    }

    /// Split a result message into its id and outcome.
    pub fn into_result(self) -> Option<(String, Result<String, String>)> {
        match self {
            BridgeMessage::TranscriptResult {
                correlation_id,
                transcript: Some(transcript),
                error: None,
            } => Some((correlation_id, Ok(transcript))),
            BridgeMessage::TranscriptResult {
                correlation_id,
                transcript: None,
                error: Some(error),
            } => Some((correlation_id, Err(error))),
            _ => None,
        }
    }

    fn is_well_formed(&self) -> bool {
        if self.correlation_id().is_empty() {
            return false;
        }
        match self {
            BridgeMessage::GetTranscript { .. } => true,
            BridgeMessage::TranscriptResult {
                transcript, error, ..
            } => transcript.is_some() != error.is_some(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_wire_shape() {
        let value = BridgeMessage::request("abc").to_value();
        assert_eq!(value, json!({ "type": "GET_TRANSCRIPT", "correlationId": "abc" }));
    }

    #[test]
    fn test_result_wire_shape() {
        let value = BridgeMessage::success("abc", "[00:01] Hi").to_value();
        assert_eq!(
            value,
            json!({ "type": "TRANSCRIPT_RESULT", "correlationId": "abc", "transcript": "[00:01] Hi" })
        );

        let value = BridgeMessage::failure("abc", "boom").to_value();
        assert_eq!(
            value,
            json!({ "type": "TRANSCRIPT_RESULT", "correlationId": "abc", "error": "boom" })
        );
    }

    #[test]
    fn test_parse_accepts_protocol_messages() {
        let msg = BridgeMessage::from_value(&json!({
            "type": "TRANSCRIPT_RESULT",
            "correlationId": "1",
            "transcript": "",
            "extra": true
        }))
        .unwrap();
        assert_eq!(msg.into_result(), Some(("1".to_string(), Ok(String::new()))));
    }

    #[test]
    fn test_parse_rejects_foreign_shapes() {
        for value in [
            json!("GET_TRANSCRIPT"),
            json!({ "type": "SOMETHING_ELSE", "correlationId": "1" }),
            json!({ "type": "GET_TRANSCRIPT" }),
            json!({ "type": "GET_TRANSCRIPT", "correlationId": "" }),
            json!({ "type": "TRANSCRIPT_RESULT", "correlationId": "1" }),
            json!({ "type": "TRANSCRIPT_RESULT", "correlationId": "1", "transcript": "t", "error": "e" }),
            json!({ "type": "TRANSCRIPT_RESULT", "correlationId": 7, "transcript": "t" }),
        ] {
            assert!(BridgeMessage::from_value(&value).is_none(), "accepted {value}");
        }
    }
}
