use std::sync::Arc;

use crate::auth::IdentityVerifier;
use crate::config::Config;
use crate::fetcher::PageFetcher;
use crate::llm_client::LlmClient;

/// Shared application state injected into all route handlers via Axum extractors.
/// Read-only for the life of the process; nothing here carries request data.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Page I/O. Default: `HttpPageFetcher`.
    pub fetcher: Arc<dyn PageFetcher>,
    /// Caller identity. Default: `SupabaseVerifier`.
    pub identity: Arc<dyn IdentityVerifier>,
    pub llm: LlmClient,
}
