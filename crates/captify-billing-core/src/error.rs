//! Billing errors

use captify_types::Tier;
use thiserror::Error;

/// Billing errors
#[derive(Error, Debug)]
pub enum BillingError {
    /// Caller identity missing or invalid
    #[error("unauthenticated")]
    Unauthenticated,

    /// Freemium daily limit reached
    #[error("daily limit of {daily_limit} generations reached for {tier} tier")]
    QuotaExceeded {
        /// Effective tier
        tier: Tier,
        /// Generations allowed per day
        daily_limit: u32,
    },

    /// Oracle rate limited the request
    #[error("rate limit exceeded, please try again later")]
    RateLimited,

    /// Oracle account is out of credits
    #[error("AI credits depleted")]
    CreditsDepleted,

    /// Oracle failed or returned an unusable reply
    #[error("oracle error: {0}")]
    OracleError(String),

    /// Payment signature did not verify
    #[error("invalid payment signature")]
    InvalidSignature,

    /// Requested amount differs from the price schedule
    #[error("price mismatch for {tier}: expected {expected}, got {actual}")]
    PriceMismatch {
        /// Requested tier
        tier: Tier,
        /// Scheduled amount
        expected: u32,
        /// Amount supplied by the caller
        actual: u32,
    },

    /// Malformed input
    #[error("invalid {field}: {message}")]
    Validation {
        /// Offending field, in its wire spelling
        field: &'static str,
        /// What is wrong with it
        message: String,
    },

    /// Persistent store failure
    #[error("store unavailable: {0}")]
    StoreUnavailable(#[from] captify_db::DbError),

    /// Payment provider error
    #[error("provider error: {0}")]
    ProviderError(String),

    /// Internal error
    #[error("internal error: {0}")]
    Internal(String),
}

impl BillingError {
    /// Build a validation error
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    /// Check if the caller must upgrade to continue
    pub fn is_quota_exceeded(&self) -> bool {
        matches!(self, Self::QuotaExceeded { .. })
    }

    /// Check if this error came from the oracle
    pub fn is_oracle_error(&self) -> bool {
        matches!(
            self,
            Self::RateLimited | Self::CreditsDepleted | Self::OracleError(_)
        )
    }

    /// Check if this error is caused by the request rather than the system
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::Unauthenticated
                | Self::QuotaExceeded { .. }
                | Self::InvalidSignature
                | Self::PriceMismatch { .. }
                | Self::Validation { .. }
        )
    }

    /// Short label for metrics
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Unauthenticated => "unauthenticated",
            Self::QuotaExceeded { .. } => "quota_exceeded",
            Self::RateLimited => "rate_limited",
            Self::CreditsDepleted => "credits_depleted",
            Self::OracleError(_) => "oracle_error",
            Self::InvalidSignature => "invalid_signature",
            Self::PriceMismatch { .. } => "price_mismatch",
            Self::Validation { .. } => "validation",
            Self::StoreUnavailable(_) => "store_unavailable",
            Self::ProviderError(_) => "provider_error",
            Self::Internal(_) => "internal",
        }
    }
}
