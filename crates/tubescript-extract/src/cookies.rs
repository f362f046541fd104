//! Session cookies imported from the companion browser extension.

use reqwest::cookie::Jar;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Cookie in the browser-extension export format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportedCookie {
    pub name: String,
    pub value: String,
    pub domain: String,
    #[serde(default = "default_path")]
    pub path: String,
    #[serde(default)]
    pub secure: bool,
    #[serde(default, rename = "httpOnly")]
    pub http_only: bool,
    #[serde(skip_serializing_if = "Option::is_none", rename = "sameSite")]
    pub same_site: Option<String>,
    /// Unix seconds; absent for session cookies.
    #[serde(skip_serializing_if = "Option::is_none", rename = "expirationDate")]
    pub expiration_date: Option<f64>,
}

fn default_path() -> String {
    "/".into()
}

impl ImportedCookie {
    pub fn is_expired(&self, now_secs: f64) -> bool {
        self.expiration_date.map_or(false, |exp| exp <= now_secs)
    }

    /// `Set-Cookie` form understood by the jar.
    fn to_set_cookie(&self) -> String {
        let mut header = format!(
            "{}={}; Domain={}; Path={}",
            self.name, self.value, self.domain, self.path
        );
        if self.secure {
            header.push_str("; Secure");
        }
        if self.http_only {
            header.push_str("; HttpOnly");
        }
        if let Some(same_site) = self.same_site_attribute() {
            header.push_str("; SameSite=");
            header.push_str(same_site);
        }
        header
    }

    /// Extension exports use `no_restriction` / `lax` / `strict` /
    /// `unspecified`; the last one maps to no attribute.
    fn same_site_attribute(&self) -> Option<&'static str> {
        match self.same_site.as_deref()?.to_ascii_lowercase().as_str() {
            "no_restriction" | "none" => Some("None"),
            "lax" => Some("Lax"),
            "strict" => Some("Strict"),
            _ => None,
        }
    }

    fn origin(&self) -> Option<Url> {
        let host = self.domain.trim_start_matches('.');
        Url::parse(&format!("https://{}{}", host, self.path)).ok()
    }
}

/// Load unexpired cookies into the jar. Returns how many were added.
pub fn import_cookies(jar: &Jar, cookies: &[ImportedCookie]) -> usize {
    let now = chrono::Utc::now().timestamp() as f64;
    let mut imported = 0;
    for cookie in cookies {
        if cookie.is_expired(now) {
            debug!("Skipping expired cookie {}", cookie.name);
            continue;
        }
        if let Some(origin) = cookie.origin() {
            jar.add_cookie_str(&cookie.to_set_cookie(), &origin);
            imported += 1;
        }
    }
    info!("Imported {} of {} session cookies", imported, cookies.len());
    imported
}
