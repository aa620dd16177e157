//! Quota, subscription and payment history reads

use axum::extract::State;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Instant;

use captify_types::{PaymentOrder, PaymentStatus, QuotaSnapshot, Tier};

use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::handlers::shared::record_op_duration;
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionResponse {
    pub tier: Tier,
    pub status: &'static str,
    pub started_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentHistoryEntry {
    pub id: String,
    pub amount: i64,
    pub currency: String,
    pub tier: Tier,
    pub duration_months: i32,
    pub status: PaymentStatus,
    pub provider_order_id: String,
    pub created_at: DateTime<Utc>,
}

impl From<PaymentOrder> for PaymentHistoryEntry {
    fn from(order: PaymentOrder) -> Self {
        Self {
            id: order.id.0.to_string(),
            amount: order.amount,
            currency: order.currency,
            tier: order.tier,
            duration_months: order.duration_months,
            status: order.status,
            provider_order_id: order.provider_order_id,
            created_at: order.created_at,
        }
    }
}

/// GET /functions/v1/quota
pub async fn get_quota(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<QuotaSnapshot>> {
    let start = Instant::now();
    let result = state.billing.quota(&auth.user_id).await;
    record_op_duration("get_quota", start, result.is_ok());
    Ok(Json(result?))
}

/// GET /functions/v1/subscription
pub async fn get_subscription(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<SubscriptionResponse>> {
    let start = Instant::now();
    let result = state.billing.current_subscription(&auth.user_id).await;
    record_op_duration("get_subscription", start, result.is_ok());

    let response = match result? {
        Some(sub) => SubscriptionResponse {
            tier: sub.tier,
            status: sub.status.as_str(),
            started_at: Some(sub.started_at),
            expires_at: sub.expires_at,
        },
        None => SubscriptionResponse {
            tier: Tier::Freemium,
            status: "active",
            started_at: None,
            expires_at: None,
        },
    };

    Ok(Json(response))
}

/// GET /functions/v1/payment-history
pub async fn get_payment_history(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<Vec<PaymentHistoryEntry>>> {
    let start = Instant::now();
    let result = state.billing.payment_history(&auth.user_id).await;
    record_op_duration("payment_history", start, result.is_ok());

    Ok(Json(result?.into_iter().map(Into::into).collect()))
}
