//! TubeScript core: error taxonomy, client identity, configuration.

pub mod config;
pub mod error;
pub mod identity;
pub mod transcript;

pub use config::{PayloadFormat, TubeScriptConfig};
pub use error::{Error, Result};
pub use identity::{ClientIdentity, ANDROID_CLIENT};
pub use transcript::TranscriptLine;
