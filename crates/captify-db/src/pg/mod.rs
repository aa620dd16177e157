//! PostgreSQL repository implementations

mod payment;
mod subscription;
mod usage;

pub use payment::PgPaymentRepository;
pub use subscription::PgSubscriptionRepository;
pub use usage::PgUsageRepository;

use crate::DbPool;

/// All repositories bundled together
#[derive(Clone)]
pub struct Repositories {
    pub usage: PgUsageRepository,
    pub subscriptions: PgSubscriptionRepository,
    pub payments: PgPaymentRepository,
}

impl Repositories {
    /// Create all repositories from a database pool
    pub fn new(pool: DbPool) -> Self {
        Self {
            usage: PgUsageRepository::new(pool.clone()),
            subscriptions: PgSubscriptionRepository::new(pool.clone()),
            payments: PgPaymentRepository::new(pool),
        }
    }
}
