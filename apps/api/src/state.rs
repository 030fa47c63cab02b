use std::sync::Arc;

use crate::llm_client::CompletionBackend;
use crate::scoring::profile::ScoringProfile;
use crate::store::Store;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Store>,
    /// Pluggable completion backend. Production: `LlmClient`; tests install
    /// a canned backend.
    pub llm: Arc<dyn CompletionBackend>,
    /// Scoring constants for this deployment.
    pub profile: Arc<ScoringProfile>,
}
