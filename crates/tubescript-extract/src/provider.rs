//! Host-page capabilities consumed by the extractor.

use std::collections::HashMap;

/// Runtime configuration field holding the internal API key.
pub const API_KEY_FIELD: &str = "INNERTUBE_API_KEY";

/// Read-only access to the host page's runtime configuration.
pub trait ConfigProvider: Send + Sync {
    /// Look up a configuration value by name.
    fn get(&self, key: &str) -> Option<String>;
}

/// Where the page currently points.
pub trait LocationProvider: Send + Sync {
    fn current_location(&self) -> String;
}

/// Fixed set of configuration values.
#[derive(Debug, Clone, Default)]
pub struct StaticConfigProvider {
    values: HashMap<String, String>,
}

impl StaticConfigProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_api_key(key: impl Into<String>) -> Self {
        Self::new().with(API_KEY_FIELD, key)
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }
}

impl ConfigProvider for StaticConfigProvider {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }
}

/// A location that never changes.
#[derive(Debug, Clone)]
pub struct FixedLocation(pub String);

impl FixedLocation {
    pub fn new(location: impl Into<String>) -> Self {
        Self(location.into())
    }
}

impl LocationProvider for FixedLocation {
    fn current_location(&self) -> String {
        self.0.clone()
    }
}
