//! Caption generation handler

use axum::extract::State;
use axum::Json;
use serde::Serialize;
use std::time::Instant;

use captify_billing_core::{BillingError, GenerationRequest};
use captify_types::{Allowance, QuotaSnapshot};

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::handlers::shared::{record_op_duration, ApiJson};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct UsageSummary {
    pub used: u32,
    pub limit: Allowance,
    pub remaining: Allowance,
}

impl From<QuotaSnapshot> for UsageSummary {
    fn from(snapshot: QuotaSnapshot) -> Self {
        Self {
            used: snapshot.used_today,
            limit: snapshot.daily_limit,
            remaining: snapshot.remaining,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub captions: Vec<String>,
    pub hashtags: Vec<String>,
    pub usage: UsageSummary,
}

/// POST /functions/v1/generate-content
pub async fn generate_content(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiJson(req): ApiJson<GenerationRequest>,
) -> ApiResult<Json<GenerateResponse>> {
    let start = Instant::now();

    let result = state.billing.generate(auth.user_id, req).await;
    record_op_duration("generate_content", start, result.is_ok());

    let outcome = match result {
        Ok(outcome) => {
            metrics::counter!("captify_generations_total", "result" => "ok").increment(1);
            outcome
        }
        Err(e) => {
            if matches!(e, BillingError::QuotaExceeded { .. }) {
                metrics::counter!("captify_quota_rejections_total").increment(1);
            }
            metrics::counter!("captify_generations_total", "result" => e.kind()).increment(1);
            return Err(ApiError::from(e));
        }
    };

    Ok(Json(GenerateResponse {
        captions: outcome.content.captions,
        hashtags: outcome.content.hashtags,
        usage: outcome.usage.into(),
    }))
}
