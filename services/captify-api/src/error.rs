//! Error types for the Captify API service.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use captify_billing_core::BillingError;
use serde::Serialize;
use serde_json::json;

/// API error response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub error: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upgrade_required: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// API error type
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Authentication required: {0}")]
    Unauthenticated(&'static str),

    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    #[error(transparent)]
    Billing(#[from] BillingError),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::InvalidBody(rejection.body_text())
    }
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            Self::InvalidBody(_) => StatusCode::BAD_REQUEST,
            Self::Billing(e) => match e {
                BillingError::Unauthenticated => StatusCode::UNAUTHORIZED,
                BillingError::QuotaExceeded { .. } | BillingError::RateLimited => {
                    StatusCode::TOO_MANY_REQUESTS
                }
                BillingError::CreditsDepleted => StatusCode::PAYMENT_REQUIRED,
                BillingError::Validation { .. }
                | BillingError::PriceMismatch { .. }
                | BillingError::InvalidSignature => StatusCode::BAD_REQUEST,
                BillingError::OracleError(_)
                | BillingError::StoreUnavailable(_)
                | BillingError::ProviderError(_)
                | BillingError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Unauthenticated(_) => "UNAUTHENTICATED",
            Self::InvalidBody(_) => "VALIDATION_ERROR",
            Self::Billing(e) => match e {
                BillingError::Unauthenticated => "UNAUTHENTICATED",
                BillingError::QuotaExceeded { .. } => "QUOTA_EXCEEDED",
                BillingError::RateLimited => "RATE_LIMITED",
                BillingError::CreditsDepleted => "CREDITS_DEPLETED",
                BillingError::OracleError(_) => "ORACLE_ERROR",
                BillingError::InvalidSignature => "INVALID_SIGNATURE",
                BillingError::PriceMismatch { .. } => "PRICE_MISMATCH",
                BillingError::Validation { .. } => "VALIDATION_ERROR",
                BillingError::StoreUnavailable(_) => "STORE_UNAVAILABLE",
                BillingError::ProviderError(_) => "PROVIDER_ERROR",
                BillingError::Internal(_) => "INTERNAL_ERROR",
            },
        }
    }

    fn is_internal(&self) -> bool {
        self.status_code() == StatusCode::INTERNAL_SERVER_ERROR
    }

    fn message(&self) -> String {
        match self {
            Self::Billing(BillingError::QuotaExceeded { daily_limit, .. }) => format!(
                "You've used all {daily_limit} free generations for today. Upgrade for unlimited generations."
            ),
            Self::Billing(BillingError::RateLimited) => {
                "Rate limit exceeded. Please try again in a moment.".to_string()
            }
            Self::Billing(BillingError::CreditsDepleted) => {
                "AI credits depleted. Please try again later.".to_string()
            }
            Self::Billing(BillingError::OracleError(_)) => {
                "Content generation failed. Please try again.".to_string()
            }
            Self::Billing(BillingError::StoreUnavailable(_))
            | Self::Billing(BillingError::ProviderError(_))
            | Self::Billing(BillingError::Internal(_)) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            Self::Billing(BillingError::QuotaExceeded { tier, daily_limit }) => Some(json!({
                "tier": tier,
                "dailyLimit": daily_limit,
            })),
            Self::Billing(BillingError::Validation { field, .. }) => {
                Some(json!({ "field": field }))
            }
            Self::Billing(BillingError::PriceMismatch {
                tier,
                expected,
                actual,
            }) => Some(json!({
                "tier": tier,
                "expected": expected,
                "actual": actual,
            })),
            _ => None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Log internal errors
        if self.is_internal() {
            tracing::error!(error = ?self, "Internal API error");
        }

        let body = ErrorResponse {
            error: self.error_code(),
            message: self.message(),
            upgrade_required: matches!(self, Self::Billing(BillingError::QuotaExceeded { .. }))
                .then_some(true),
            details: self.details(),
        };

        (status, Json(body)).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
