//! Host page runtime configuration, scraped from the page source.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use tracing::{debug, info};
use tubescript_core::{Error, Result};

use crate::provider::ConfigProvider;

/// Configuration fields kept from the page.
pub const SCRAPED_KEYS: &[&str] = &[
    "INNERTUBE_API_KEY",
    "INNERTUBE_CLIENT_VERSION",
    "VISITOR_DATA",
    "HL",
    "GL",
];

static CONFIG_PAIR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""([A-Z][A-Z0-9_]*)"\s*:\s*"((?:[^"\\]|\\.)*)""#).unwrap());

/// Read-only snapshot of the page's configuration values.
#[derive(Debug, Clone, Default)]
pub struct PageConfig {
    values: HashMap<String, String>,
}

impl PageConfig {
    /// Extract known `"KEY":"value"` pairs; the first occurrence wins.
    pub fn scrape(html: &str) -> Self {
        let mut values = HashMap::new();
        for caps in CONFIG_PAIR_RE.captures_iter(html) {
            let key = &caps[1];
            if SCRAPED_KEYS.contains(&key) && !values.contains_key(key) {
                values.insert(key.to_string(), unescape(&caps[2]));
            }
        }
        debug!("Scraped {} page config values", values.len());
        Self { values }
    }

    /// Fetch a page and scrape its configuration.
    pub async fn fetch(client: &Client, url: &str) -> Result<Self> {
        let response = client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::UpstreamUnavailable(format!("page request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::UpstreamUnavailable(format!(
                "page returned status {}",
                response.status()
            )));
        }

        let html = response
            .text()
            .await
            .map_err(|e| Error::UpstreamUnavailable(format!("page body unreadable: {}", e)))?;
        let config = Self::scrape(&html);
        info!("Loaded page config from {} ({} values)", url, config.len());
        Ok(config)
    }

    pub fn value(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl ConfigProvider for PageConfig {
    fn get(&self, key: &str) -> Option<String> {
        self.value(key).map(str::to_string)
    }
}

fn unescape(raw: &str) -> String {
    raw.replace("\\/", "/").replace("\\u0026", "&").replace("\\\"", "\"")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::API_KEY_FIELD;

    const PAGE: &str = r#"<html><script>ytcfg.set({"CLIENT_CANARY_STATE":"none","INNERTUBE_API_KEY":"AIzaSyTEST_key-123","INNERTUBE_CLIENT_VERSION":"2.20250101.00.00","VISITOR_DATA":"Cgt\/abc&x","HL":"en"});</script>
<script>ytcfg.set({"INNERTUBE_API_KEY":"second"});</script></html>"#;

    #[test]
    fn test_scrape_known_keys() {
        let config = PageConfig::scrape(PAGE);
        assert_eq!(config.get(API_KEY_FIELD).as_deref(), Some("AIzaSyTEST_key-123"));
        assert_eq!(config.value("INNERTUBE_CLIENT_VERSION"), Some("2.20250101.00.00"));
        assert_eq!(config.value("VISITOR_DATA"), Some("Cgt/abc&x"));
        assert_eq!(config.value("HL"), Some("en"));
        assert!(config.value("CLIENT_CANARY_STATE").is_none());
        assert_eq!(config.len(), 4);
    }

    #[test]
    fn test_scrape_without_config() {
        let config = PageConfig::scrape("<html><body>consent wall</body></html>");
        assert!(config.is_empty());
        assert!(config.get(API_KEY_FIELD).is_none());
    }
}
