//! Backend-agnostic repository handles
//!
//! Services depend on [`Stores`] rather than the PostgreSQL types so tests can
//! swap in in-memory repositories.

use std::sync::Arc;

use crate::pg::Repositories;
use crate::repo::{PaymentRepository, SubscriptionRepository, UsageRepository};

/// Shared trait-object handles to every repository
#[derive(Clone)]
pub struct Stores {
    pub usage: Arc<dyn UsageRepository>,
    pub subscriptions: Arc<dyn SubscriptionRepository>,
    pub payments: Arc<dyn PaymentRepository>,
}

impl Stores {
    /// Bundle arbitrary repository implementations
    pub fn new(
        usage: Arc<dyn UsageRepository>,
        subscriptions: Arc<dyn SubscriptionRepository>,
        payments: Arc<dyn PaymentRepository>,
    ) -> Self {
        Self {
            usage,
            subscriptions,
            payments,
        }
    }
}

impl From<Repositories> for Stores {
    fn from(repos: Repositories) -> Self {
        Self {
            usage: Arc::new(repos.usage),
            subscriptions: Arc::new(repos.subscriptions),
            payments: Arc::new(repos.payments),
        }
    }
}

impl std::fmt::Debug for Stores {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stores").finish_non_exhaustive()
    }
}
