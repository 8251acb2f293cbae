//! Artwork analysis pipeline.
//!
//! [`orchestrator::Analyzer`] runs one image through normalization, the
//! vision provider and [`response_parser::parse`]. [`session::Session`]
//! owns the scanner's observable state on top of it.

pub mod orchestrator;
pub mod prompts;
pub mod response_parser;
pub mod session;

pub use orchestrator::Analyzer;
pub use session::{AnalysisStatus, Phase, Session, SessionState};

use anyhow::{Context, Result};
use providers::router::ProviderRouter;
use services::settings_store::SettingsStore;
use shared::config::LensConfig;
use std::sync::Arc;

/// Wire a session to the provider the stored settings select.
///
/// The provider follows later settings changes through the store's
/// change channel.
pub fn build_session(config: LensConfig, store: Arc<SettingsStore>) -> Result<Session> {
    config.validate().context("invalid lens configuration")?;
    let router = ProviderRouter::new(&config, store.subscribe())
        .map_err(|e| anyhow::anyhow!("{}", e))?;
    let analyzer = Analyzer::new(config, Arc::new(router));
    Ok(Session::new(Arc::new(analyzer), store))
}
