//! Daily usage and quota types

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::{Tier, UserId};

/// Per-user, per-day generation counter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyUsageRecord {
    /// User who generated the usage
    pub user_id: UserId,
    /// Calendar day the usage belongs to
    pub usage_date: NaiveDate,
    /// Completed generations on that day
    pub generation_count: u32,
    /// Admitted generations whose oracle call has not finished
    pub in_flight: u32,
    /// Last time the row changed
    pub updated_at: DateTime<Utc>,
}

/// A count that may be unbounded.
///
/// Serialized as a number, or `null` when unlimited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Option<u32>", into = "Option<u32>")]
pub enum Allowance {
    /// Bounded count
    Limited(u32),
    /// No bound
    Unlimited,
}

impl Allowance {
    /// The bound, if any
    pub const fn as_limit(&self) -> Option<u32> {
        match self {
            Self::Limited(n) => Some(*n),
            Self::Unlimited => None,
        }
    }

    /// Whether this allowance is unbounded
    pub const fn is_unlimited(&self) -> bool {
        matches!(self, Self::Unlimited)
    }
}

impl From<Option<u32>> for Allowance {
    fn from(value: Option<u32>) -> Self {
        value.map_or(Self::Unlimited, Self::Limited)
    }
}

impl From<Allowance> for Option<u32> {
    fn from(value: Allowance) -> Self {
        value.as_limit()
    }
}

impl std::fmt::Display for Allowance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Limited(n) => write!(f, "{n}"),
            Self::Unlimited => f.write_str("unlimited"),
        }
    }
}

/// Entitlement of a user on a given day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuotaSnapshot {
    /// Effective tier
    pub tier: Tier,
    /// Generations allowed per day
    pub daily_limit: Allowance,
    /// Generations completed today
    pub used_today: u32,
    /// Generations left today
    pub remaining: Allowance,
}

impl QuotaSnapshot {
    /// Build a snapshot for `tier`.
    ///
    /// `freemium_limit` applies only to the freemium tier; paid tiers are unlimited.
    pub fn new(tier: Tier, freemium_limit: u32, used_today: u32) -> Self {
        if tier.is_paid() {
            Self {
                tier,
                daily_limit: Allowance::Unlimited,
                used_today,
                remaining: Allowance::Unlimited,
            }
        } else {
            Self {
                tier,
                daily_limit: Allowance::Limited(freemium_limit),
                used_today,
                remaining: Allowance::Limited(freemium_limit.saturating_sub(used_today)),
            }
        }
    }

    /// Whether no generation is left today
    pub fn is_exhausted(&self) -> bool {
        matches!(self.remaining, Allowance::Limited(0))
    }
}
