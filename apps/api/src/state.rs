use std::sync::Arc;

use crate::careers::CareerCatalog;
use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::rag::RagBridge;

/// Shared application state injected into all route handlers via Axum
/// extractors. Constructed once at startup and threaded through explicitly;
/// there are no module-level singletons.
#[derive(Clone)]
pub struct AppState {
    /// Static career catalog, loaded once; the file never changes while the
    /// process runs.
    pub catalog: Arc<CareerCatalog>,
    /// Bridge to the retrieval worker. One instance per process; it owns the
    /// worker subprocess exclusively.
    pub rag: Arc<RagBridge>,
    pub llm: LlmClient,
    /// Kept for handlers that need runtime settings; nothing reads it yet.
    #[allow(dead_code)]
    pub config: Config,
}
