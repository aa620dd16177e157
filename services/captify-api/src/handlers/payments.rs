//! Payment verification handler

use axum::extract::State;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Instant;

use captify_billing_core::VerifyPaymentRequest;
use captify_types::Tier;

use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::handlers::shared::{record_op_duration, ApiJson};
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyPaymentResponse {
    pub success: bool,
    pub tier: Tier,
    pub expires_at: Option<DateTime<Utc>>,
}

/// POST /functions/v1/verify-razorpay-payment
pub async fn verify_razorpay_payment(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiJson(req): ApiJson<VerifyPaymentRequest>,
) -> ApiResult<Json<VerifyPaymentResponse>> {
    let start = Instant::now();

    let result = state.billing.verify_payment(&auth.user_id, req).await;
    record_op_duration("verify_payment", start, result.is_ok());

    let label = match &result {
        Ok(_) => "ok",
        Err(e) => e.kind(),
    };
    metrics::counter!("captify_payments_verified_total", "result" => label).increment(1);

    let verified = result?;
    Ok(Json(VerifyPaymentResponse {
        success: true,
        tier: verified.subscription.tier,
        expires_at: verified.subscription.expires_at,
    }))
}
