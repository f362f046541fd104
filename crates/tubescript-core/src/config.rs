//! Runtime configuration: file defaults plus environment overrides.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::Result;

pub const DEFAULT_PORT: u16 = 3004;
pub const DEFAULT_API_BASE_URL: &str = "https://www.youtube.com";
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// Which caption encoding to ask the upstream for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayloadFormat {
    /// Use the track URL as the catalog returned it.
    #[default]
    Native,
    /// Force the segment-event JSON encoding via `fmt=json3`.
    SegmentEvents,
}

/// Top-level TubeScript configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TubeScriptConfig {
    /// HTTP server port.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Origin of the internal data API and caption payloads.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    /// Bound on the raw caption payload fetch.
    #[serde(default = "default_timeout_secs")]
    pub payload_timeout_secs: u64,
    /// Bound on a bridge round trip.
    #[serde(default = "default_timeout_secs")]
    pub bridge_timeout_secs: u64,
    #[serde(default)]
    pub payload_format: PayloadFormat,
    /// Overrides the key scraped from the host page when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Path the config was loaded from (not serialized).
    #[serde(skip)]
    pub config_path: PathBuf,
}

fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.into()
}
fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Default for TubeScriptConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            api_base_url: DEFAULT_API_BASE_URL.into(),
            payload_timeout_secs: DEFAULT_TIMEOUT_SECS,
            bridge_timeout_secs: DEFAULT_TIMEOUT_SECS,
            payload_format: PayloadFormat::Native,
            api_key: None,
            config_path: PathBuf::new(),
        }
    }
}

impl TubeScriptConfig {
    /// Load config from a JSON file, or return defaults.
    pub fn load(config_path: &Path) -> Self {
        let mut config: TubeScriptConfig = match std::fs::read_to_string(config_path) {
            Ok(data) => serde_json::from_str(&data).unwrap_or_else(|e| {
                warn!("Ignoring malformed config {}: {}", config_path.display(), e);
                TubeScriptConfig::default()
            }),
            Err(_) => TubeScriptConfig::default(),
        };
        config.config_path = config_path.to_path_buf();
        config
    }

    /// Load from `TUBESCRIPT_CONFIG` (default `tubescript.json`) and apply
    /// environment overrides.
    pub fn from_env() -> Self {
        let path = std::env::var("TUBESCRIPT_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("tubescript.json"));
        let mut config = Self::load(&path);
        config.apply_env_overrides(|key| std::env::var(key).ok());
        config
    }

    /// Apply overrides from a variable lookup.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = lookup("TUBESCRIPT_PORT").and_then(|p| p.parse().ok()) {
            self.port = port;
        }
        if let Some(base) = lookup("TUBESCRIPT_API_BASE") {
            self.api_base_url = base.trim_end_matches('/').to_string();
        }
        if let Some(key) = lookup("TUBESCRIPT_API_KEY").filter(|k| !k.is_empty()) {
            self.api_key = Some(key);
        }
        debug!("Config resolved: port={}, api_base={}", self.port, self.api_base_url);
    }

    /// Save config to disk.
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(&self.config_path, json)?;
        Ok(())
    }

    pub fn payload_timeout(&self) -> Duration {
        Duration::from_secs(self.payload_timeout_secs)
    }

    pub fn bridge_timeout(&self) -> Duration {
        Duration::from_secs(self.bridge_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = TubeScriptConfig::load(&dir.path().join("absent.json"));
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.payload_timeout(), Duration::from_secs(15));
        assert_eq!(config.bridge_timeout(), Duration::from_secs(15));
        assert_eq!(config.payload_format, PayloadFormat::Native);
        assert!(config.api_key.is_none());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tubescript.json");
        std::fs::write(&path, r#"{"port": 8080, "payload_format": "segment_events"}"#).unwrap();

        let config = TubeScriptConfig::load(&path);
        assert_eq!(config.port, 8080);
        assert_eq!(config.payload_format, PayloadFormat::SegmentEvents);
        assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("tubescript.json");
        let mut config = TubeScriptConfig::load(&path);
        config.bridge_timeout_secs = 5;
        config.save().unwrap();

        let reloaded = TubeScriptConfig::load(&path);
        assert_eq!(reloaded.bridge_timeout_secs, 5);
    }

    #[test]
    fn test_save_into_unwritable_path_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, "x").unwrap();

        let config = TubeScriptConfig::load(&blocker.join("tubescript.json"));
        assert!(matches!(config.save(), Err(Error::Io(_))));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = TubeScriptConfig::default();
        config.apply_env_overrides(|key| match key {
            "TUBESCRIPT_PORT" => Some("9000".into()),
            "TUBESCRIPT_API_BASE" => Some("http://127.0.0.1:1234/".into()),
            "TUBESCRIPT_API_KEY" => Some(String::new()),
            _ => None,
        });
        assert_eq!(config.port, 9000);
        assert_eq!(config.api_base_url, "http://127.0.0.1:1234");
        assert!(config.api_key.is_none());
    }
}
