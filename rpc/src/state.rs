//! Shared handler state.

use std::sync::Arc;

use acp_store::Store;
use acp_types::{Clock, SystemClock, Timestamp};
use acp_utils::StatsCounter;
use acp_verification::{CodeVerificationEngine, ImageVerificationEngine};

/// Counter names reported by `/api/admin/stats`.
pub const REQUEST_COUNTERS: &[&str] = &[
    "verify_code",
    "verify_image",
    "rejected",
    "history",
    "admin",
];

/// Everything the handlers share. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub clock: Arc<dyn Clock>,
    pub code_engine: CodeVerificationEngine,
    pub image_engine: ImageVerificationEngine,
    /// Bearer token for `/api/admin`; admin routes refuse everything when unset.
    pub admin_token: Option<Arc<str>>,
    pub counters: Arc<StatsCounter>,
    pub started_at: Timestamp,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self::with_clock(store, Arc::new(SystemClock))
    }

    pub fn with_clock(store: Arc<dyn Store>, clock: Arc<dyn Clock>) -> Self {
        let started_at = clock.now();
        Self {
            store,
            clock,
            code_engine: CodeVerificationEngine,
            image_engine: ImageVerificationEngine::default(),
            admin_token: None,
            counters: Arc::new(StatsCounter::new(REQUEST_COUNTERS)),
            started_at,
        }
    }

    pub fn admin_token(mut self, token: Option<String>) -> Self {
        self.admin_token = token.filter(|t| !t.is_empty()).map(Arc::from);
        self
    }

    pub fn upload_prefix(mut self, prefix: &str) -> Self {
        self.image_engine = ImageVerificationEngine::new(prefix);
        self
    }
}
