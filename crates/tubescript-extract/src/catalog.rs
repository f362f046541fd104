//! Caption catalog: player response decoding and track selection.

use serde::Deserialize;

/// `kind` value marking machine-generated captions.
pub const AUTO_GENERATED_KIND: &str = "asr";

/// One selectable caption variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptionTrack {
    pub language_code: String,
    pub name: Option<String>,
    pub kind: Option<String>,
    pub base_url: String,
}

impl CaptionTrack {
    pub fn is_auto_generated(&self) -> bool {
        self.kind.as_deref() == Some(AUTO_GENERATED_KIND)
    }
}

/// Pick the first human-authored track, else the first track.
///
/// Returns `None` only for an empty list.
pub fn select_track(tracks: &[CaptionTrack]) -> Option<&CaptionTrack> {
    tracks
        .iter()
        .find(|t| !t.is_auto_generated())
        .or_else(|| tracks.first())
}

// ---------------------------------------------------------------
// Player response (upstream contract)
// ---------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PlayerResponse {
    #[serde(default)]
    pub playability_status: Option<PlayabilityStatus>,
    #[serde(default)]
    pub captions: Option<Captions>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PlayabilityStatus {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Captions {
    #[serde(rename = "playerCaptionsTracklistRenderer", default)]
    pub tracklist: Option<Tracklist>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Tracklist {
    #[serde(default)]
    pub caption_tracks: Vec<RawTrack>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawTrack {
    pub base_url: String,
    #[serde(default)]
    pub language_code: String,
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub name: Option<TrackName>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TrackName {
    #[serde(default)]
    pub simple_text: Option<String>,
    #[serde(default)]
    pub runs: Vec<TextRun>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TextRun {
    #[serde(default)]
    pub text: String,
}

impl PlayerResponse {
    /// Tracks in the order the upstream listed them.
    pub fn into_tracks(self) -> Vec<CaptionTrack> {
        self.captions
            .and_then(|c| c.tracklist)
            .map(|t| t.caption_tracks)
            .unwrap_or_default()
            .into_iter()
            .map(CaptionTrack::from)
            .collect()
    }
}

impl From<RawTrack> for CaptionTrack {
    fn from(raw: RawTrack) -> Self {
        let name = raw.name.and_then(|n| {
            n.simple_text.or_else(|| {
                let joined: String = n.runs.into_iter().map(|r| r.text).collect();
                (!joined.is_empty()).then_some(joined)
            })
        });
        CaptionTrack {
            language_code: raw.language_code,
            name,
            kind: raw.kind.filter(|k| !k.is_empty()),
            base_url: raw.base_url,
        }
    }
}
