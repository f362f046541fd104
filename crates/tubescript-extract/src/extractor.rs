//! Extractor: resolve identity, fetch catalog, select track, fetch and
//! parse the payload, render.

use std::sync::Arc;
use std::time::Duration;

use reqwest::cookie::Jar;
use reqwest::header::USER_AGENT;
use reqwest::{Client, Url};
use serde_json::json;
use tracing::{debug, info, warn};
use tubescript_core::{
    ClientIdentity, Error, PayloadFormat, Result, TranscriptLine, TubeScriptConfig, ANDROID_CLIENT,
};

use crate::catalog::{select_track, CaptionTrack, PlayerResponse};
use crate::parse::parse_payload;
use crate::provider::{ConfigProvider, LocationProvider, API_KEY_FIELD};
use crate::render::render;
use crate::video_id;

/// Upstream endpoints and bounds.
#[derive(Debug, Clone)]
pub struct ExtractorSettings {
    pub api_base_url: String,
    pub payload_timeout: Duration,
    pub payload_format: PayloadFormat,
    pub identity: ClientIdentity,
}

impl Default for ExtractorSettings {
    fn default() -> Self {
        Self::from_config(&TubeScriptConfig::default())
    }
}

impl ExtractorSettings {
    pub fn from_config(config: &TubeScriptConfig) -> Self {
        Self {
            api_base_url: config.api_base_url.trim_end_matches('/').to_string(),
            payload_timeout: config.payload_timeout(),
            payload_format: config.payload_format,
            identity: ANDROID_CLIENT,
        }
    }
}

/// Produces transcripts for whatever video the page currently shows.
pub struct Extractor {
    client: Client,
    settings: ExtractorSettings,
    config: Arc<dyn ConfigProvider>,
    location: Arc<dyn LocationProvider>,
}

impl Extractor {
    pub fn new(
        client: Client,
        settings: ExtractorSettings,
        config: Arc<dyn ConfigProvider>,
        location: Arc<dyn LocationProvider>,
    ) -> Self {
        Self {
            client,
            settings,
            config,
            location,
        }
    }

    /// HTTP client whose requests carry the cookies in `jar`.
    pub fn build_client(jar: Arc<Jar>) -> Result<Client> {
        Client::builder()
            .cookie_provider(jar)
            .build()
            .map_err(|e| Error::Config(format!("failed to build HTTP client: {}", e)))
    }

    pub fn settings(&self) -> &ExtractorSettings {
        &self.settings
    }

    /// Rendered transcript for the current video.
    pub async fn get_transcript(&self) -> Result<String> {
        let lines = self.get_transcript_lines().await?;
        Ok(render(&lines))
    }

    /// Parsed lines for the current video.
    pub async fn get_transcript_lines(&self) -> Result<Vec<TranscriptLine>> {
        let api_key = self.resolve_identity()?;

        let location = self.location.current_location();
        let video_id =
            video_id::from_location(&location).ok_or_else(|| Error::InvalidLocation(location))?;

        let tracks = self.fetch_caption_catalog(&api_key, &video_id).await?;
        let track = select_track(&tracks)
            .ok_or_else(|| Error::CaptionsUnavailable(video_id.clone()))?;
        info!(
            "Selected {} track ({}) of {} for {}",
            track.language_code,
            if track.is_auto_generated() { "auto-generated" } else { "manual" },
            tracks.len(),
            video_id
        );

        let raw = self.fetch_raw_payload(track).await?;
        parse_payload(&raw)
    }

    /// The page's internal API key.
    pub fn resolve_identity(&self) -> Result<String> {
        self.config
            .get(API_KEY_FIELD)
            .filter(|key| !key.is_empty())
            .ok_or_else(|| {
                Error::ConfigurationUnavailable(format!("{} not present in page config", API_KEY_FIELD))
            })
    }

    /// Ask the player endpoint for the caption catalog, posing as the
    /// substitute client identity.
    pub async fn fetch_caption_catalog(
        &self,
        api_key: &str,
        video_id: &str,
    ) -> Result<Vec<CaptionTrack>> {
        let identity = &self.settings.identity;
        let url = format!("{}/youtubei/v1/player", self.settings.api_base_url);
        let body = json!({
            "context": { "client": identity },
            "videoId": video_id,
        });

        debug!("Requesting caption catalog for {} as {}", video_id, identity.client_name);

        let response = self
            .client
            .post(&url)
            .query(&[("key", api_key), ("prettyPrint", "false")])
            .header(USER_AGENT, identity.user_agent())
            .header("X-Youtube-Client-Name", identity.client_id.to_string())
            .header("X-Youtube-Client-Version", identity.client_version)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::UpstreamUnavailable(format!("catalog request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::UpstreamUnavailable(format!(
                "catalog returned status {}",
                response.status()
            )));
        }

        let player: PlayerResponse = response
            .json()
            .await
            .map_err(|e| Error::UpstreamUnavailable(format!("catalog response undecodable: {}", e)))?;

        if let Some(status) = &player.playability_status {
            if status.status.as_deref().is_some_and(|s| s != "OK") {
                warn!(
                    "Video {} playability {:?}: {}",
                    video_id,
                    status.status,
                    status.reason.as_deref().unwrap_or("no reason given")
                );
            }
        }

        let tracks = player.into_tracks();
        if tracks.is_empty() {
            return Err(Error::CaptionsUnavailable(video_id.to_string()));
        }
        debug!("Catalog for {} lists {} tracks", video_id, tracks.len());
        Ok(tracks)
    }

    /// Download one track's raw payload within the payload bound.
    pub async fn fetch_raw_payload(&self, track: &CaptionTrack) -> Result<String> {
        let url = self.track_url(track)?;
        let timeout = self.settings.payload_timeout;

        let response = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| self.payload_error(e))?;

        if !response.status().is_success() {
            return Err(Error::UpstreamUnavailable(format!(
                "caption payload returned status {}",
                response.status()
            )));
        }

        let body = response.text().await.map_err(|e| self.payload_error(e))?;
        if body.is_empty() {
            return Err(Error::UpstreamUnavailable(
                "caption payload was empty".into(),
            ));
        }
        debug!("Fetched {} byte caption payload", body.len());
        Ok(body)
    }

    /// Absolute track URL with the configured format applied.
    fn track_url(&self, track: &CaptionTrack) -> Result<Url> {
        let mut url = match Url::parse(&track.base_url) {
            Ok(url) => url,
            Err(_) => Url::parse(&self.settings.api_base_url)
                .and_then(|base| base.join(&track.base_url))
                .map_err(|e| {
                    Error::UpstreamUnavailable(format!("invalid track URL {}: {}", track.base_url, e))
                })?,
        };

        if self.settings.payload_format == PayloadFormat::SegmentEvents {
            let pairs: Vec<(String, String)> = url
                .query_pairs()
                .filter(|(k, _)| k != "fmt")
                .map(|(k, v)| (k.into_owned(), v.into_owned()))
                .collect();
            url.query_pairs_mut()
                .clear()
                .extend_pairs(pairs)
                .append_pair("fmt", "json3");
        }
        Ok(url)
    }

    fn payload_error(&self, e: reqwest::Error) -> Error {
        if e.is_timeout() {
            Error::FetchTimeout(self.settings.payload_timeout)
        } else {
            Error::UpstreamUnavailable(format!("caption payload request failed: {}", e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{FixedLocation, StaticConfigProvider};

    fn extractor(config: StaticConfigProvider, format: PayloadFormat) -> Extractor {
        let settings = ExtractorSettings {
            payload_format: format,
            ..ExtractorSettings::default()
        };
        Extractor::new(
            Client::new(),
            settings,
            Arc::new(config),
            Arc::new(FixedLocation::new("https://www.youtube.com/watch?v=dQw4w9WgXcQ")),
        )
    }

    fn track(url: &str) -> CaptionTrack {
        CaptionTrack {
            language_code: "en".into(),
            name: None,
            kind: None,
            base_url: url.into(),
        }
    }

    #[test]
    fn test_resolve_identity() {
        let ex = extractor(StaticConfigProvider::with_api_key("k"), PayloadFormat::Native);
        assert_eq!(ex.resolve_identity().unwrap(), "k");

        let ex = extractor(StaticConfigProvider::new(), PayloadFormat::Native);
        assert!(matches!(ex.resolve_identity(), Err(Error::ConfigurationUnavailable(_))));

        let ex = extractor(StaticConfigProvider::with_api_key(""), PayloadFormat::Native);
        assert!(matches!(ex.resolve_identity(), Err(Error::ConfigurationUnavailable(_))));
    }

    #[test]
    fn test_track_url_native_keeps_query() {
        let ex = extractor(StaticConfigProvider::new(), PayloadFormat::Native);
        let url = ex
            .track_url(&track("https://www.youtube.com/api/timedtext?v=x&fmt=srv3"))
            .unwrap();
        assert_eq!(url.as_str(), "https://www.youtube.com/api/timedtext?v=x&fmt=srv3");
    }

    #[test]
    fn test_track_url_forces_segment_events() {
        let ex = extractor(StaticConfigProvider::new(), PayloadFormat::SegmentEvents);
        let url = ex
            .track_url(&track("https://www.youtube.com/api/timedtext?v=x&fmt=srv3&lang=en"))
            .unwrap();
        assert_eq!(url.as_str(), "https://www.youtube.com/api/timedtext?v=x&lang=en&fmt=json3");
    }

    #[test]
    fn test_track_url_resolves_relative() {
        let ex = extractor(StaticConfigProvider::new(), PayloadFormat::Native);
        let url = ex.track_url(&track("/api/timedtext?v=x")).unwrap();
        assert_eq!(url.as_str(), "https://www.youtube.com/api/timedtext?v=x");
    }
}
