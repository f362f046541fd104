//! The page the service is currently pointed at.

use parking_lot::RwLock;
use reqwest::Client;
use serde::Serialize;
use tracing::info;
use tubescript_core::Result;
use tubescript_extract::video_id;
use tubescript_extract::{ConfigProvider, LocationProvider, PageConfig, API_KEY_FIELD};

/// Location, scraped page configuration and session bookkeeping.
///
/// Serves as both the extractor's `ConfigProvider` and its
/// `LocationProvider`, so a navigation is picked up by the next request.
pub struct PageSession {
    location: RwLock<Option<String>>,
    page_config: RwLock<PageConfig>,
    api_key_override: Option<String>,
    cookie_count: RwLock<usize>,
    loaded_at: RwLock<Option<String>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PageStatus {
    pub location: Option<String>,
    #[serde(rename = "videoId")]
    pub video_id: Option<String>,
    #[serde(rename = "hasApiKey")]
    pub has_api_key: bool,
    #[serde(rename = "cookieCount")]
    pub cookie_count: usize,
    #[serde(rename = "loadedAt")]
    pub loaded_at: Option<String>,
}

impl PageSession {
    pub fn new(api_key_override: Option<String>) -> Self {
        Self {
            location: RwLock::new(None),
            page_config: RwLock::new(PageConfig::default()),
            api_key_override,
            cookie_count: RwLock::new(0),
            loaded_at: RwLock::new(None),
        }
    }

    /// Load `url`, scrape its configuration and make it the current page.
    ///
    /// On failure the previous page stays current.
    pub async fn navigate(&self, client: &Client, url: &str) -> Result<PageStatus> {
        let config = PageConfig::fetch(client, url).await?;
        *self.page_config.write() = config;
        self.set_location(url);
        info!("Page session now at {}", url);
        Ok(self.status())
    }

    /// Point at `url` without loading it.
    pub fn set_location(&self, url: &str) {
        *self.location.write() = Some(url.to_string());
        *self.loaded_at.write() = Some(chrono::Utc::now().to_rfc3339());
    }

    pub fn record_cookies(&self, imported: usize) {
        *self.cookie_count.write() += imported;
    }

    pub fn status(&self) -> PageStatus {
        let location = self.location.read().clone();
        PageStatus {
            video_id: location.as_deref().and_then(video_id::from_location),
            location,
            has_api_key: self.get(API_KEY_FIELD).is_some_and(|k| !k.is_empty()),
            cookie_count: *self.cookie_count.read(),
            loaded_at: self.loaded_at.read().clone(),
        }
    }
}

impl ConfigProvider for PageSession {
    fn get(&self, key: &str) -> Option<String> {
        if key == API_KEY_FIELD {
            if let Some(key) = &self.api_key_override {
                return Some(key.clone());
            }
        }
        self.page_config.read().get(key)
    }
}

impl LocationProvider for PageSession {
    fn current_location(&self) -> String {
        self.location.read().clone().unwrap_or_default()
    }
}
