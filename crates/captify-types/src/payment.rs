//! Payment order types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{ParseError, Tier, UserId};

/// Payment order identifier (local, not the provider's)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaymentOrderId(pub Uuid);

impl PaymentOrderId {
    /// Create a new payment order ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PaymentOrderId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for PaymentOrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Payment status. `Success` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Checkout started, no verified callback yet
    Pending,
    /// Signature verified and subscription activated
    Success,
    /// Signature verified but activation failed
    Failed,
}

impl PaymentStatus {
    /// Database name of the status
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Success => "success",
            Self::Failed => "failed",
        }
    }

    /// Whether the status can no longer change
    pub const fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl std::str::FromStr for PaymentStatus {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "success" => Ok(Self::Success),
            "failed" => Ok(Self::Failed),
            _ => Err(ParseError::InvalidPaymentStatus(s.to_string())),
        }
    }
}

/// A checkout attempt recorded in payment history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentOrder {
    /// Local order ID
    pub id: PaymentOrderId,
    /// User who started the checkout
    pub user_id: UserId,
    /// Amount in the smallest currency unit
    pub amount: i64,
    /// ISO currency code (e.g., "INR")
    pub currency: String,
    /// Tier being purchased
    pub tier: Tier,
    /// Purchased duration in months
    pub duration_months: i32,
    /// Receipt sent to the provider
    pub receipt: String,
    /// Provider-side order ID
    pub provider_order_id: String,
    /// Payment status
    pub status: PaymentStatus,
    /// Provider payment ID (after verification)
    pub provider_payment_id: Option<String>,
    /// Provider signature (after verification)
    pub provider_signature: Option<String>,
    /// When the order was created
    pub created_at: DateTime<Utc>,
}
