//! Database row models
//!
//! These types map directly to database rows using SQLx's FromRow derive.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use captify_types::{
    DailyUsageRecord, PaymentOrder, PaymentOrderId, Subscription, SubscriptionId, UserId,
};

use crate::error::{DbError, DbResult};

/// Daily usage row from the database
#[derive(Debug, Clone, FromRow)]
pub struct DailyUsageRow {
    pub user_id: Uuid,
    pub usage_date: NaiveDate,
    pub generation_count: i32,
    pub in_flight: i32,
    pub updated_at: DateTime<Utc>,
}

/// Subscription row from the database
#[derive(Debug, Clone, FromRow)]
pub struct SubscriptionRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub tier: String,
    pub status: String,
    pub started_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub payment_reference: Option<String>,
    pub provider_order_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Payment history row from the database
#[derive(Debug, Clone, FromRow)]
pub struct PaymentOrderRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub amount: i64,
    pub currency: String,
    pub tier: String,
    pub duration_months: i32,
    pub receipt: String,
    pub provider_order_id: String,
    pub status: String,
    pub provider_payment_id: Option<String>,
    pub provider_signature: Option<String>,
    pub created_at: DateTime<Utc>,
}

// Conversion implementations from Row types to captify-types domain types

impl DailyUsageRow {
    /// Completed generations, clamped at zero
    pub fn used(&self) -> u32 {
        u32::try_from(self.generation_count).unwrap_or(0)
    }

    /// Convert to the domain record
    pub fn into_domain(self) -> DailyUsageRecord {
        DailyUsageRecord {
            user_id: UserId(self.user_id),
            usage_date: self.usage_date,
            generation_count: self.used(),
            in_flight: u32::try_from(self.in_flight).unwrap_or(0),
            updated_at: self.updated_at,
        }
    }
}

impl SubscriptionRow {
    /// Convert to the domain subscription
    pub fn into_domain(self) -> DbResult<Subscription> {
        Ok(Subscription {
            id: SubscriptionId(self.id),
            user_id: UserId(self.user_id),
            tier: self
                .tier
                .parse()
                .map_err(|e| DbError::Corrupt(format!("subscription {}: {e}", self.id)))?,
            status: self
                .status
                .parse()
                .map_err(|e| DbError::Corrupt(format!("subscription {}: {e}", self.id)))?,
            started_at: self.started_at,
            expires_at: self.expires_at,
            payment_reference: self.payment_reference,
            provider_order_id: self.provider_order_id,
        })
    }
}

impl PaymentOrderRow {
    /// Convert to the domain payment order
    pub fn into_domain(self) -> DbResult<PaymentOrder> {
        Ok(PaymentOrder {
            id: PaymentOrderId(self.id),
            user_id: UserId(self.user_id),
            amount: self.amount,
            currency: self.currency,
            tier: self
                .tier
                .parse()
                .map_err(|e| DbError::Corrupt(format!("payment {}: {e}", self.id)))?,
            duration_months: self.duration_months,
            receipt: self.receipt,
            provider_order_id: self.provider_order_id,
            status: self
                .status
                .parse()
                .map_err(|e| DbError::Corrupt(format!("payment {}: {e}", self.id)))?,
            provider_payment_id: self.provider_payment_id,
            provider_signature: self.provider_signature,
            created_at: self.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subscription_row(tier: &str, status: &str) -> SubscriptionRow {
        SubscriptionRow {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            tier: tier.to_string(),
            status: status.to_string(),
            started_at: Utc::now(),
            expires_at: None,
            payment_reference: Some("pay_123".to_string()),
            provider_order_id: Some("order_123".to_string()),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_subscription_row_converts() {
        let sub = subscription_row("six_months", "active").into_domain().unwrap();
        assert_eq!(sub.tier, captify_types::Tier::SixMonths);
        assert_eq!(sub.payment_reference.as_deref(), Some("pay_123"));
    }

    #[test]
    fn test_subscription_row_with_unknown_tier_is_corrupt() {
        let err = subscription_row("platinum", "active").into_domain().unwrap_err();
        assert!(matches!(err, DbError::Corrupt(_)));
    }

    #[test]
    fn test_negative_counts_clamp_to_zero() {
        let row = DailyUsageRow {
            user_id: Uuid::new_v4(),
            usage_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            generation_count: -1,
            in_flight: -2,
            updated_at: Utc::now(),
        };
        let record = row.into_domain();
        assert_eq!(record.generation_count, 0);
        assert_eq!(record.in_flight, 0);
    }
}
