//! Substitute client identity for the internal data API.
//!
//! The page's native web identity is subject to a proof-of-origin check and
//! gets an empty caption catalog without it. The Android client identity is
//! not, so catalog requests are sent as that client instead. The version is
//! pinned here and drifts independently of the host's own client version.

use serde::Serialize;

/// Client metadata sent as `context.client` on catalog requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientIdentity {
    pub client_name: &'static str,
    pub client_version: &'static str,
    pub android_sdk_version: u32,
    pub hl: &'static str,
    pub gl: &'static str,
    /// Numeric id for the `X-Youtube-Client-Name` header.
    #[serde(skip)]
    pub client_id: u32,
}

pub const ANDROID_CLIENT: ClientIdentity = ClientIdentity {
    client_name: "ANDROID",
    client_version: "20.10.38",
    android_sdk_version: 30,
    hl: "en",
    gl: "US",
    client_id: 3,
};

impl ClientIdentity {
    pub fn user_agent(&self) -> String {
        format!(
            "com.google.android.youtube/{} (Linux; U; Android 11) gzip",
            self.client_version
        )
    }
}
