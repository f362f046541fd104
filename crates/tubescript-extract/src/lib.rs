//! Caption extraction pipeline.
//!
//! Resolves the video id from the page location, asks the internal player
//! API for the caption catalog under a substitute client identity, picks one
//! track, downloads its payload and normalizes it into timestamped lines.
//! Host-page coupling is confined to the `ConfigProvider` and
//! `LocationProvider` capabilities.

pub mod catalog;
pub mod cookies;
pub mod entities;
pub mod extractor;
pub mod page;
pub mod parse;
pub mod provider;
pub mod render;
pub mod video_id;

pub use catalog::{select_track, CaptionTrack};
pub use cookies::{import_cookies, ImportedCookie};
pub use entities::decode_entities;
pub use extractor::{Extractor, ExtractorSettings};
pub use page::PageConfig;
pub use parse::{parse_payload, PayloadKind};
pub use provider::{ConfigProvider, FixedLocation, LocationProvider, StaticConfigProvider, API_KEY_FIELD};
pub use render::{format_timestamp, render};
