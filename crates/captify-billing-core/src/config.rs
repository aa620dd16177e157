//! Billing configuration

use captify_types::{PlanPrice, Tier};
use std::collections::HashMap;
use std::time::Duration;

const RAZORPAY_API_BASE: &str = "https://api.razorpay.com/v1";

/// Billing service configuration
#[derive(Clone)]
pub struct BillingConfig {
    /// Razorpay key ID, returned to clients for checkout
    pub razorpay_key_id: String,
    /// Razorpay key secret, used for API auth and signature checks
    pub razorpay_key_secret: String,
    /// Razorpay REST base URL
    pub razorpay_api_base: String,
    /// ISO currency code for new orders
    pub currency: String,
    /// Authoritative price schedule for purchasable tiers
    pub plans: HashMap<Tier, PlanPrice>,
    /// Generations per day on the freemium tier
    pub freemium_daily_limit: u32,
    /// Offset from UTC, in minutes, of the day boundary for usage counting
    pub usage_utc_offset_minutes: i32,
    /// Age after which an unfinished freemium reservation no longer holds a
    /// slot. Also bounds the oracle call, so it must exceed the oracle timeout.
    pub reservation_ttl: Duration,
}

impl BillingConfig {
    /// Create a new billing config with the default price schedule
    pub fn new(
        razorpay_key_id: impl Into<String>,
        razorpay_key_secret: impl Into<String>,
    ) -> Self {
        let plans = Tier::PURCHASABLE
            .iter()
            .filter_map(|tier| tier.default_plan().map(|plan| (*tier, plan)))
            .collect();

        Self {
            razorpay_key_id: razorpay_key_id.into(),
            razorpay_key_secret: razorpay_key_secret.into(),
            razorpay_api_base: RAZORPAY_API_BASE.to_string(),
            currency: "INR".to_string(),
            plans,
            freemium_daily_limit: 3,
            usage_utc_offset_minutes: 0,
            reservation_ttl: Duration::from_secs(120),
        }
    }

    /// Override the plan for a tier
    pub fn with_plan(mut self, tier: Tier, plan: PlanPrice) -> Self {
        self.plans.insert(tier, plan);
        self
    }

    /// Set the Razorpay API base URL
    pub fn with_api_base(mut self, base: impl Into<String>) -> Self {
        self.razorpay_api_base = base.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the order currency
    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
    }

    /// Set the freemium daily limit
    pub fn with_freemium_limit(mut self, limit: u32) -> Self {
        self.freemium_daily_limit = limit;
        self
    }

    /// Set the usage day boundary offset
    pub fn with_usage_offset_minutes(mut self, minutes: i32) -> Self {
        self.usage_utc_offset_minutes = minutes;
        self
    }

    /// Set the reservation time-to-live
    pub fn with_reservation_ttl(mut self, ttl: Duration) -> Self {
        self.reservation_ttl = ttl;
        self
    }

    /// Get the plan for a tier
    pub fn plan(&self, tier: Tier) -> Option<PlanPrice> {
        self.plans.get(&tier).copied()
    }
}

impl std::fmt::Debug for BillingConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BillingConfig")
            .field("razorpay_key_id", &self.razorpay_key_id)
            .field("razorpay_key_secret", &"[redacted]")
            .field("razorpay_api_base", &self.razorpay_api_base)
            .field("currency", &self.currency)
            .field("plans", &self.plans)
            .field("freemium_daily_limit", &self.freemium_daily_limit)
            .field("usage_utc_offset_minutes", &self.usage_utc_offset_minutes)
            .field("reservation_ttl", &self.reservation_ttl)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_schedule() {
        let config = BillingConfig::new("rzp_test_key", "secret");
        assert_eq!(config.plan(Tier::Monthly), Some(PlanPrice::new(99, 1)));
        assert_eq!(config.plan(Tier::SixMonths), Some(PlanPrice::new(549, 6)));
        assert_eq!(config.plan(Tier::Yearly), Some(PlanPrice::new(999, 12)));
        assert_eq!(config.plan(Tier::Freemium), None);
    }

    #[test]
    fn test_debug_redacts_secret() {
        let config = BillingConfig::new("rzp_test_key", "super-secret-value");
        let debug = format!("{config:?}");
        assert!(debug.contains("rzp_test_key"));
        assert!(!debug.contains("super-secret-value"));
    }

    #[test]
    fn test_api_base_trailing_slash() {
        let config = BillingConfig::new("k", "s").with_api_base("http://localhost:9000/v1/");
        assert_eq!(config.razorpay_api_base, "http://localhost:9000/v1");
    }
}
