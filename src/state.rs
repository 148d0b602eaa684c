//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor. The
//! session provider and profile store sit behind traits so the auth flow
//! and the gate run against in-memory doubles in tests.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::AppConfig;
use crate::services::profile::{PgProfileStore, ProfileStore};
use crate::services::session::{PgSessionProvider, SessionProvider};

/// Shared application state, injected into Axum handlers via State extractor.
/// Clone is required by Axum; all inner fields are Arc-wrapped.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub sessions: Arc<dyn SessionProvider>,
    pub profiles: Arc<dyn ProfileStore>,
}

impl AppState {
    #[must_use]
    pub fn new(config: AppConfig, sessions: Arc<dyn SessionProvider>, profiles: Arc<dyn ProfileStore>) -> Self {
        Self { config: Arc::new(config), sessions, profiles }
    }

    /// Postgres-backed state for production.
    #[must_use]
    pub fn from_pool(pool: PgPool, config: AppConfig) -> Self {
        let sessions = Arc::new(PgSessionProvider::new(pool.clone(), config.session_ttl_days));
        let profiles = Arc::new(PgProfileStore::new(pool));
        Self::new(config, sessions, profiles)
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================
