//! Health check handlers

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use crate::state::AppState;

/// Tables the usage, subscription and payment stores need
const REQUIRED_TABLES: [&str; 3] = ["daily_usage", "subscriptions", "payment_history"];

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadyResponse {
    pub status: &'static str,
    pub usage_store: &'static str,
    pub payments_mode: &'static str,
    pub freemium_daily_limit: u32,
}

/// Liveness probe
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Readiness probe: the store must be reachable and migrated
pub async fn ready(State(state): State<AppState>) -> Result<Json<ReadyResponse>, StatusCode> {
    let found: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM information_schema.tables \
         WHERE table_schema = current_schema() AND table_name = ANY($1)",
    )
    .bind(&REQUIRED_TABLES[..])
    .fetch_one(&state.pool)
    .await
    .map_err(|e| {
        tracing::error!(error = ?e, "Usage store readiness check failed");
        StatusCode::SERVICE_UNAVAILABLE
    })?;

    if found < REQUIRED_TABLES.len() as i64 {
        tracing::warn!(found, "Usage store schema is not migrated");
        return Err(StatusCode::SERVICE_UNAVAILABLE);
    }

    let billing = &state.config.billing;
    Ok(Json(ReadyResponse {
        status: "ready",
        usage_store: "migrated",
        payments_mode: payments_mode(&billing.razorpay_key_id),
        freemium_daily_limit: billing.freemium_daily_limit,
    }))
}

/// Razorpay live keys start with `rzp_live_`
fn payments_mode(key_id: &str) -> &'static str {
    if key_id.starts_with("rzp_live_") {
        "live"
    } else {
        "test"
    }
}
