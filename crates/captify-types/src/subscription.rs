//! Subscription types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{ParseError, Tier, UserId};

/// Unique subscription identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubscriptionId(pub Uuid);

impl SubscriptionId {
    /// Create a new random subscription ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SubscriptionId {
    fn default() -> Self {
        Self::new()
    }
}

/// Subscription status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    /// Subscription grants its tier until `expires_at`
    Active,
    /// Subscription ran out
    Expired,
    /// Subscription was cancelled
    Cancelled,
}

impl SubscriptionStatus {
    /// Database name of the status
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Expired => "expired",
            Self::Cancelled => "cancelled",
        }
    }
}

impl std::str::FromStr for SubscriptionStatus {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "expired" => Ok(Self::Expired),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(ParseError::InvalidSubscriptionStatus(s.to_string())),
        }
    }
}

/// User subscription
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subscription {
    /// Subscription ID
    pub id: SubscriptionId,
    /// User who owns the subscription
    pub user_id: UserId,
    /// Purchased tier
    pub tier: Tier,
    /// Subscription status
    pub status: SubscriptionStatus,
    /// When the entitlement started
    pub started_at: DateTime<Utc>,
    /// When the entitlement ends (`None` for freemium)
    pub expires_at: Option<DateTime<Utc>>,
    /// Provider payment ID that paid for this subscription
    pub payment_reference: Option<String>,
    /// Provider order ID the payment belonged to
    pub provider_order_id: Option<String>,
}

impl Subscription {
    /// Whether the subscription grants its tier at `at`
    pub fn is_effective_at(&self, at: DateTime<Utc>) -> bool {
        self.status == SubscriptionStatus::Active && self.expires_at.is_some_and(|exp| exp > at)
    }
}
