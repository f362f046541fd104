//! Raw caption payload parsing.
//!
//! Two upstream encodings are recognized by content shape:
//!
//! - tag-delimited markup: `<p t="1000">text</p>` (milliseconds), or the
//!   legacy `<text start="1.0">text</text>` (seconds)
//! - segment events: `{"events":[{"tStartMs":0,"segs":[{"utf8":"text"}]}]}`
//!
//! Both produce the same `TranscriptLine` sequence, in payload order.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::Deserialize;
use tracing::debug;
use tubescript_core::{Error, Result, TranscriptLine};

use crate::entities::decode_entities;

/// Encoding of a raw caption payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadKind {
    TagDelimited,
    SegmentEvents,
}

impl PayloadKind {
    /// Detect the encoding from the first non-whitespace character.
    pub fn detect(raw: &str) -> Option<Self> {
        match strip_bom(raw).trim_start().chars().next()? {
            '<' => Some(PayloadKind::TagDelimited),
            '{' => Some(PayloadKind::SegmentEvents),
            _ => None,
        }
    }

    pub fn parse(self, raw: &str) -> Result<Vec<TranscriptLine>> {
        match self {
            PayloadKind::TagDelimited => Ok(parse_tag_delimited(raw)),
            PayloadKind::SegmentEvents => parse_segment_events(raw),
        }
    }
}

/// Parse a raw payload of either encoding.
///
/// A non-empty payload that yields no lines is a `ParseFailure`, never an
/// empty transcript.
pub fn parse_payload(raw: &str) -> Result<Vec<TranscriptLine>> {
    let raw = strip_bom(raw);
    let kind = PayloadKind::detect(raw)
        .ok_or_else(|| Error::ParseFailure("unrecognized caption payload format".into()))?;
    let lines = kind.parse(raw)?;
    debug!("Parsed {} lines from {:?} payload", lines.len(), kind);

    if lines.is_empty() {
        return Err(Error::ParseFailure(format!(
            "{:?} payload of {} bytes produced no lines",
            kind,
            raw.len()
        )));
    }
    Ok(lines)
}

fn strip_bom(raw: &str) -> &str {
    raw.strip_prefix('\u{feff}').unwrap_or(raw)
}

// ---------------------------------------------------------------
// Tag-delimited
// ---------------------------------------------------------------

// Attribute values may contain `/`; a bare `/` right before `>` marks a
// self-closing element, which has no text and never matches.
static CUE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)<(p|text)(\s(?:"[^"]*"|'[^']*'|[^>"'/]|/[^>])*)?>(.*?)</(?:p|text)>"#)
        .unwrap()
});
static MS_ATTR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r#"\bt="(\d+)""#).unwrap());
static SECONDS_ATTR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"\bstart="(\d+(?:\.\d+)?)""#).unwrap());
static INNER_TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").unwrap());
static LINE_BREAK_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\r\n]+").unwrap());

fn parse_tag_delimited(raw: &str) -> Vec<TranscriptLine> {
    CUE_RE
        .captures_iter(raw)
        .filter_map(|caps| {
            let attrs = caps.get(2).map_or("", |m| m.as_str());
            let start_ms = match &caps[1] {
                "p" => cue_start_ms(attrs)?,
                _ => cue_start_seconds(attrs)?,
            };
            let text = clean_cue_text(&caps[3]);
            (!text.is_empty()).then(|| TranscriptLine::new(start_ms, text))
        })
        .collect()
}

fn cue_start_ms(attrs: &str) -> Option<u64> {
    MS_ATTR_RE.captures(attrs)?[1].parse().ok()
}

fn cue_start_seconds(attrs: &str) -> Option<u64> {
    let seconds: f64 = SECONDS_ATTR_RE.captures(attrs)?[1].parse().ok()?;
    Some((seconds * 1000.0).round() as u64)
}

fn clean_cue_text(inner: &str) -> String {
    let stripped = INNER_TAG_RE.replace_all(inner, |caps: &Captures| {
        if caps[0].starts_with("<br") {
            " "
        } else {
            ""
        }
    });
    let decoded = decode_entities(&stripped);
    collapse_line_breaks(&decoded)
}

fn collapse_line_breaks(text: &str) -> String {
    LINE_BREAK_RE.replace_all(text, " ").trim().to_string()
}

// ---------------------------------------------------------------
// Segment events
// ---------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct SegmentPayload {
    #[serde(default)]
    events: Vec<SegmentEvent>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SegmentEvent {
    #[serde(default)]
    t_start_ms: Option<u64>,
    #[serde(default)]
    segs: Option<Vec<Segment>>,
}

#[derive(Debug, Deserialize)]
struct Segment {
    #[serde(default)]
    utf8: String,
}

fn parse_segment_events(raw: &str) -> Result<Vec<TranscriptLine>> {
    let payload: SegmentPayload = serde_json::from_str(raw)
        .map_err(|e| Error::ParseFailure(format!("invalid segment-event payload: {}", e)))?;

    Ok(payload
        .events
        .into_iter()
        .filter_map(|event| {
            // Events without a start time are window/style definitions.
            let start_ms = event.t_start_ms?;
            let segs = event.segs?;
            let joined: String = segs.iter().map(|s| s.utf8.as_str()).collect();
            let text = collapse_line_breaks(&joined);
            (!text.is_empty()).then(|| TranscriptLine::new(start_ms, text))
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect() {
        assert_eq!(PayloadKind::detect("  <timedtext>"), Some(PayloadKind::TagDelimited));
        assert_eq!(PayloadKind::detect("\n{\"events\":[]}"), Some(PayloadKind::SegmentEvents));
        assert_eq!(PayloadKind::detect("WEBVTT"), None);
        assert_eq!(PayloadKind::detect("   "), None);
    }

    #[test]
    fn test_tag_delimited_basic() {
        let raw = r#"<p t="1000">Hello</p><p t="2500">World &amp; friends</p>"#;
        let lines = parse_payload(raw).unwrap();
        assert_eq!(
            lines,
            vec![
                TranscriptLine::new(1000, "Hello"),
                TranscriptLine::new(2500, "World & friends"),
            ]
        );
    }

    #[test]
    fn test_tag_delimited_keeps_count_and_order() {
        let raw: String = (0..25)
            .map(|i| format!(r#"<p t="{}" d="900">line {}</p>"#, i * 1000, i))
            .collect();
        let raw = format!(r#"<?xml version="1.0" encoding="utf-8" ?><timedtext format="3"><body>{}</body></timedtext>"#, raw);
        let lines = parse_payload(&raw).unwrap();
        assert_eq!(lines.len(), 25);
        for (i, line) in lines.iter().enumerate() {
            assert_eq!(line.start_ms, i as u64 * 1000);
            assert_eq!(line.text, format!("line {}", i));
        }
    }

    #[test]
    fn test_tag_delimited_drops_empty_and_collapses_newlines() {
        let raw = "<p t=\"0\">  </p><p t=\"10\">first\nsecond\r\n third</p><p t=\"20\">&nbsp;</p>";
        let lines = parse_payload(raw).unwrap();
        assert_eq!(lines, vec![TranscriptLine::new(10, "first second  third")]);
        assert!(lines.iter().all(|l| !l.text.contains('\n') && !l.text.contains('\r')));
    }

    #[test]
    fn test_tag_delimited_strips_inline_tags() {
        let raw = r#"<p t="500" d="2000"><s ac="0">Hello</s><s t="300"> there</s><br/>friend</p>"#;
        let lines = parse_payload(raw).unwrap();
        assert_eq!(lines, vec![TranscriptLine::new(500, "Hello there friend")]);
    }

    #[test]
    fn test_tag_delimited_ignores_pen_and_self_closing() {
        let raw = r#"<head><pen id="1" b="1"/><ws id="0"/></head><body><p t="5"/><p t="7">ok</p></body>"#;
        let lines = parse_payload(raw).unwrap();
        assert_eq!(lines, vec![TranscriptLine::new(7, "ok")]);
    }

    #[test]
    fn test_slash_in_attribute_value() {
        let raw = r#"<p t="10" wp="a/b">Hi</p><p t="20" ws="x/y"/><p t="30" href="http://a/b/">there</p>"#;
        let lines = parse_payload(raw).unwrap();
        assert_eq!(
            lines,
            vec![TranscriptLine::new(10, "Hi"), TranscriptLine::new(30, "there")]
        );
    }

    #[test]
    fn test_byte_order_mark_is_ignored() {
        let raw = "\u{feff}<?xml version=\"1.0\"?><timedtext><body><p t=\"0\">hi</p></body></timedtext>";
        assert_eq!(PayloadKind::detect(raw), Some(PayloadKind::TagDelimited));
        assert_eq!(parse_payload(raw).unwrap(), vec![TranscriptLine::new(0, "hi")]);

        let raw = "\u{feff}{\"events\":[{\"tStartMs\":5,\"segs\":[{\"utf8\":\"yo\"}]}]}";
        assert_eq!(parse_payload(raw).unwrap(), vec![TranscriptLine::new(5, "yo")]);
    }

    #[test]
    fn test_legacy_text_elements() {
        let raw = r#"<transcript><text start="1.25" dur="2">Hi &#39;there&#39;</text><text start="62" dur="1">Bye</text></transcript>"#;
        let lines = parse_payload(raw).unwrap();
        assert_eq!(
            lines,
            vec![TranscriptLine::new(1250, "Hi 'there'"), TranscriptLine::new(62000, "Bye")]
        );
    }

    #[test]
    fn test_unrecognized_markup_is_parse_failure() {
        let err = parse_payload("<html><body>Sign in</body></html>").unwrap_err();
        assert!(matches!(err, Error::ParseFailure(_)));
    }

    #[test]
    fn test_segment_events() {
        let raw = serde_json::json!({
            "wireMagic": "pb3",
            "events": [
                { "tStartMs": 0, "dDurationMs": 5000, "id": 1, "wpWinPosId": 1 },
                { "tStartMs": 100, "segs": [{ "utf8": "Hello" }, { "utf8": " world", "tOffsetMs": 200 }] },
                { "tStartMs": 2000, "segs": [{ "utf8": "\n" }] },
                { "tStartMs": 2500, "segs": [] },
                { "tStartMs": 3000, "segs": [{ "utf8": "line one\nline two " }] }
            ]
        })
        .to_string();

        let lines = parse_payload(&raw).unwrap();
        assert_eq!(
            lines,
            vec![
                TranscriptLine::new(100, "Hello world"),
                TranscriptLine::new(3000, "line one line two"),
            ]
        );
    }

    #[test]
    fn test_segment_events_without_start_are_skipped() {
        let raw = r#"{"events":[{"tStartMs":500,"segs":[{"utf8":"a"}]},{"segs":[{"utf8":"b"}]},{"tStartMs":900,"segs":[{"utf8":"c"}]}]}"#;
        let lines = parse_payload(raw).unwrap();
        assert_eq!(lines, vec![TranscriptLine::new(500, "a"), TranscriptLine::new(900, "c")]);
    }

    #[test]
    fn test_segment_events_without_text_is_parse_failure() {
        let raw = r#"{"events":[{"tStartMs":0},{"tStartMs":5,"segs":[{"utf8":"  "}]}]}"#;
        assert!(matches!(parse_payload(raw), Err(Error::ParseFailure(_))));
    }

    #[test]
    fn test_invalid_json_is_parse_failure() {
        assert!(matches!(parse_payload("{not json"), Err(Error::ParseFailure(_))));
    }

    #[test]
    fn test_plain_text_is_parse_failure() {
        assert!(matches!(parse_payload("WEBVTT\n\n00:00.000 --> 00:01.000\nhi"), Err(Error::ParseFailure(_))));
    }
}
