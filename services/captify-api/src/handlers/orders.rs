//! Payment order handler

use axum::extract::State;
use axum::Json;
use std::time::Instant;

use captify_billing_core::{CreateOrderRequest, CreatedOrder};

use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::handlers::shared::{record_op_duration, ApiJson};
use crate::state::AppState;

/// POST /functions/v1/create-razorpay-order
pub async fn create_razorpay_order(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiJson(req): ApiJson<CreateOrderRequest>,
) -> ApiResult<Json<CreatedOrder>> {
    let start = Instant::now();
    let tier = req.tier;

    let result = state.billing.create_order(&auth.user_id, req).await;
    record_op_duration("create_order", start, result.is_ok());

    let order = result?;
    metrics::counter!("captify_orders_created_total", "tier" => tier.as_str()).increment(1);

    Ok(Json(order))
}
