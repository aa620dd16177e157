//! Trending hashtag handler

use axum::extract::State;
use axum::Json;
use serde::Serialize;
use std::time::Instant;

use captify_billing_core::HashtagRequest;

use crate::error::ApiResult;
use crate::handlers::shared::{record_op_duration, ApiJson};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HashtagsResponse {
    pub hashtags: Vec<String>,
}

/// POST /functions/v1/get-trending-hashtags
pub async fn get_trending_hashtags(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<HashtagRequest>,
) -> ApiResult<Json<HashtagsResponse>> {
    let start = Instant::now();

    let result = state.billing.trending_hashtags(req).await;
    record_op_duration("trending_hashtags", start, result.is_ok());

    Ok(Json(HashtagsResponse { hashtags: result? }))
}
