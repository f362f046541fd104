//! Shared application state.

use std::sync::Arc;

use reqwest::cookie::Jar;
use reqwest::Client;
use tracing::info;
use tubescript_bridge::{Bridge, Channel, MessageBus, TranscriptResponder};
use tubescript_core::{Result, TubeScriptConfig};
use tubescript_extract::{Extractor, ExtractorSettings};

use crate::session::PageSession;

/// Origin shared by the bridge and the responder; both live in the page
/// context.
pub const PAGE_ORIGIN: &str = "page";

/// Shared application state accessible from all route handlers.
pub struct AppState {
    pub config: TubeScriptConfig,
    pub client: Client,
    pub cookie_jar: Arc<Jar>,
    pub session: Arc<PageSession>,
    pub extractor: Arc<Extractor>,
    pub bridge: Bridge,
    _responder: TranscriptResponder,
    pub started_at: String,
}

impl AppState {
    /// Wire the extractor, responder and bridge together.
    ///
    /// Spawns the bridge dispatcher and the responder listener, so it must
    /// be called inside a tokio runtime.
    pub fn new(config: TubeScriptConfig) -> Result<Self> {
        let cookie_jar = Arc::new(Jar::default());
        let client = Extractor::build_client(cookie_jar.clone())?;
        let session = Arc::new(PageSession::new(config.api_key.clone()));

        let extractor = Arc::new(Extractor::new(
            client.clone(),
            ExtractorSettings::from_config(&config),
            session.clone(),
            session.clone(),
        ));

        let bus = MessageBus::new();
        let channel: Arc<dyn Channel> = Arc::new(bus.handle(PAGE_ORIGIN));
        let responder = TranscriptResponder::start(channel.clone(), extractor.clone());
        let bridge = Bridge::start(channel, config.bridge_timeout());

        info!(
            "Extractor ready (api base {}, payload format {:?})",
            config.api_base_url, config.payload_format
        );

        Ok(Self {
            config,
            client,
            cookie_jar,
            session,
            extractor,
            bridge,
            _responder: responder,
            started_at: chrono::Utc::now().to_rfc3339(),
        })
    }
}
