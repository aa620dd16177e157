//! Parse errors for domain enums

use thiserror::Error;

/// Error parsing a domain enum from its wire/database string
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Unknown tier name
    #[error("invalid tier: {0}")]
    InvalidTier(String),

    /// Unknown subscription status
    #[error("invalid subscription status: {0}")]
    InvalidSubscriptionStatus(String),

    /// Unknown payment status
    #[error("invalid payment status: {0}")]
    InvalidPaymentStatus(String),
}
