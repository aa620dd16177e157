//! Repository traits
//!
//! Define async repository interfaces for database operations.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::error::DbResult;
use crate::models::*;

/// Daily usage repository trait
///
/// Every mutating method is a single atomic statement keyed by
/// `(user_id, usage_date)`; implementations must not read-then-write.
#[async_trait]
pub trait UsageRepository: Send + Sync {
    /// Get the usage row for a user and day
    async fn get(&self, user_id: Uuid, usage_date: NaiveDate) -> DbResult<Option<DailyUsageRow>>;

    /// Reserve one generation if `generation_count + in_flight < limit`.
    ///
    /// Creates the row when absent. Returns `None` when the cap is reached.
    /// When the row has not changed for `stale_after_secs`, every reservation
    /// on it is older than that and is dropped before the cap is checked.
    async fn try_reserve(
        &self,
        user_id: Uuid,
        usage_date: NaiveDate,
        limit: i32,
        stale_after_secs: i64,
    ) -> DbResult<Option<DailyUsageRow>>;

    /// Turn one reservation into a completed generation
    async fn commit_reservation(&self, user_id: Uuid, usage_date: NaiveDate)
        -> DbResult<DailyUsageRow>;

    /// Drop one reservation without counting it
    async fn release_reservation(&self, user_id: Uuid, usage_date: NaiveDate) -> DbResult<()>;

    /// Count one completed generation without a cap (upsert)
    async fn increment(&self, user_id: Uuid, usage_date: NaiveDate) -> DbResult<DailyUsageRow>;
}

/// Subscription repository trait
#[async_trait]
pub trait SubscriptionRepository: Send + Sync {
    /// Most recently started active subscription that has not expired at `at`
    async fn find_effective(
        &self,
        user_id: Uuid,
        at: DateTime<Utc>,
    ) -> DbResult<Option<SubscriptionRow>>;

    /// Create a new subscription
    async fn create(&self, sub: CreateSubscription) -> DbResult<SubscriptionRow>;
}

/// Create subscription input
#[derive(Debug, Clone)]
pub struct CreateSubscription {
    pub id: Uuid,
    pub user_id: Uuid,
    pub tier: String,
    pub started_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub payment_reference: Option<String>,
    pub provider_order_id: Option<String>,
}

/// Payment history repository trait
#[async_trait]
pub trait PaymentRepository: Send + Sync {
    /// Record a new pending order
    async fn create(&self, order: CreatePaymentOrder) -> DbResult<PaymentOrderRow>;

    /// Find a user's order by provider order ID
    async fn find_by_provider_order_id(
        &self,
        user_id: Uuid,
        provider_order_id: &str,
    ) -> DbResult<Option<PaymentOrderRow>>;

    /// Move a pending order to a terminal status.
    ///
    /// Returns `false` when no pending order matched, so a terminal order is
    /// never overwritten.
    async fn complete(&self, completion: CompletePaymentOrder) -> DbResult<bool>;

    /// Most recent orders for a user
    async fn list_by_user_id(&self, user_id: Uuid, limit: i64) -> DbResult<Vec<PaymentOrderRow>>;
}

/// Create payment order input
#[derive(Debug, Clone)]
pub struct CreatePaymentOrder {
    pub id: Uuid,
    pub user_id: Uuid,
    pub amount: i64,
    pub currency: String,
    pub tier: String,
    pub duration_months: i32,
    pub receipt: String,
    pub provider_order_id: String,
}

/// Terminal transition of a payment order
#[derive(Debug, Clone)]
pub struct CompletePaymentOrder {
    pub user_id: Uuid,
    pub provider_order_id: String,
    pub status: String,
    pub provider_payment_id: String,
    pub provider_signature: String,
}
