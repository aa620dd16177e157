//! Subscription tier types

use serde::{Deserialize, Serialize};

use crate::ParseError;

/// Subscription tier levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    /// Free tier, limited daily generations
    Freemium,
    /// One month of unlimited generations - ₹99
    Monthly,
    /// Six months of unlimited generations - ₹549
    SixMonths,
    /// Twelve months of unlimited generations - ₹999
    Yearly,
}

impl Tier {
    /// Tiers a user can buy
    pub const PURCHASABLE: [Tier; 3] = [Tier::Monthly, Tier::SixMonths, Tier::Yearly];

    /// Wire and database name of the tier
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Freemium => "freemium",
            Self::Monthly => "monthly",
            Self::SixMonths => "six_months",
            Self::Yearly => "yearly",
        }
    }

    /// Whether this tier is a paid subscription
    pub const fn is_paid(&self) -> bool {
        !matches!(self, Self::Freemium)
    }

    /// Canonical plan for this tier, `None` for freemium
    pub const fn default_plan(&self) -> Option<PlanPrice> {
        match self {
            Self::Freemium => None,
            Self::Monthly => Some(PlanPrice::new(99, 1)),
            Self::SixMonths => Some(PlanPrice::new(549, 6)),
            Self::Yearly => Some(PlanPrice::new(999, 12)),
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Tier {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "freemium" => Ok(Self::Freemium),
            "monthly" => Ok(Self::Monthly),
            "six_months" => Ok(Self::SixMonths),
            "yearly" => Ok(Self::Yearly),
            _ => Err(ParseError::InvalidTier(s.to_string())),
        }
    }
}

/// Price and duration of a purchasable plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanPrice {
    /// Price in major currency units (rupees)
    pub amount: u32,
    /// Length of the entitlement in calendar months
    pub duration_months: u32,
}

impl PlanPrice {
    /// Create a plan price
    pub const fn new(amount: u32, duration_months: u32) -> Self {
        Self {
            amount,
            duration_months,
        }
    }

    /// Price in the smallest currency unit (paise)
    pub const fn amount_minor(&self) -> i64 {
        self.amount as i64 * 100
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_roundtrip_strings() {
        for tier in [Tier::Freemium, Tier::Monthly, Tier::SixMonths, Tier::Yearly] {
            assert_eq!(tier.as_str().parse::<Tier>().unwrap(), tier);
        }
        assert!("pro".parse::<Tier>().is_err());
        assert!("Monthly".parse::<Tier>().is_err());
    }

    #[test]
    fn test_serde_uses_snake_case() {
        let json = serde_json::to_string(&Tier::SixMonths).unwrap();
        assert_eq!(json, "\"six_months\"");
    }

    #[test]
    fn test_default_schedule() {
        assert_eq!(Tier::Freemium.default_plan(), None);
        assert_eq!(Tier::Monthly.default_plan(), Some(PlanPrice::new(99, 1)));
        assert_eq!(Tier::SixMonths.default_plan(), Some(PlanPrice::new(549, 6)));
        assert_eq!(Tier::Yearly.default_plan(), Some(PlanPrice::new(999, 12)));
        assert_eq!(PlanPrice::new(999, 12).amount_minor(), 99_900);
    }

    #[test]
    fn test_only_freemium_is_free() {
        assert!(!Tier::Freemium.is_paid());
        assert!(Tier::PURCHASABLE.iter().all(Tier::is_paid));
    }
}
