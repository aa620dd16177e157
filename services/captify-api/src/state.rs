//! Application state for the Captify API service.

use captify_billing_core::BillingService;
use captify_db::DbPool;
use std::sync::Arc;

use crate::auth::TokenValidator;
use crate::config::Config;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    /// Quota, generation, order and payment operations
    pub billing: Arc<BillingService>,
    /// Bearer token validation
    pub tokens: Arc<TokenValidator>,
    /// Database pool (readiness checks)
    pub pool: DbPool,
    /// Configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Create new application state
    pub fn new(billing: BillingService, tokens: TokenValidator, pool: DbPool, config: Config) -> Self {
        Self {
            billing: Arc::new(billing),
            tokens: Arc::new(tokens),
            pool,
            config: Arc::new(config),
        }
    }

    /// Get request timeout from config
    pub fn request_timeout(&self) -> std::time::Duration {
        self.config.request_timeout
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
