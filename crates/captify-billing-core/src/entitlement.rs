//! Entitlement resolution
//!
//! Combines the newest effective subscription with today's usage counter.
//! Nothing is cached; every call reads the stores.

use chrono::{DateTime, NaiveDate, Utc};
use tracing::{debug, instrument};

use captify_db::Stores;
use captify_types::{QuotaSnapshot, Subscription, Tier, UserId};

use crate::calendar::UsageCalendar;
use crate::error::BillingError;

/// Resolves a user's tier and remaining quota
#[derive(Clone, Debug)]
pub struct EntitlementResolver {
    stores: Stores,
    freemium_limit: u32,
    calendar: UsageCalendar,
}

impl EntitlementResolver {
    /// Create a new resolver
    pub fn new(stores: Stores, freemium_limit: u32, calendar: UsageCalendar) -> Self {
        Self {
            stores,
            freemium_limit,
            calendar,
        }
    }

    /// Generations per day on the freemium tier
    pub fn freemium_limit(&self) -> u32 {
        self.freemium_limit
    }

    /// Usage day containing `at`
    pub fn usage_date(&self, at: DateTime<Utc>) -> NaiveDate {
        self.calendar.usage_date(at)
    }

    /// Most recently started subscription that is active and unexpired at `at`
    pub async fn effective_subscription(
        &self,
        user_id: &UserId,
        at: DateTime<Utc>,
    ) -> Result<Option<Subscription>, BillingError> {
        let row = self.stores.subscriptions.find_effective(user_id.0, at).await?;
        let sub = row.map(|r| r.into_domain()).transpose()?;

        // Expiry is exclusive: a subscription ending exactly at `at` is over
        Ok(sub.filter(|s| s.is_effective_at(at)))
    }

    /// Effective tier at `at`, freemium when no subscription applies
    pub async fn effective_tier(
        &self,
        user_id: &UserId,
        at: DateTime<Utc>,
    ) -> Result<Tier, BillingError> {
        Ok(self
            .effective_subscription(user_id, at)
            .await?
            .map_or(Tier::Freemium, |s| s.tier))
    }

    /// Tier, daily limit, usage and remaining quota at `as_of`
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn resolve_quota(
        &self,
        user_id: &UserId,
        as_of: DateTime<Utc>,
    ) -> Result<QuotaSnapshot, BillingError> {
        let tier = self.effective_tier(user_id, as_of).await?;
        let date = self.usage_date(as_of);

        let used_today = self
            .stores
            .usage
            .get(user_id.0, date)
            .await?
            .map_or(0, |row| row.used());

        let snapshot = QuotaSnapshot::new(tier, self.freemium_limit, used_today);
        debug!(tier = %tier, used_today, remaining = %snapshot.remaining, "Resolved quota");

        Ok(snapshot)
    }
}
