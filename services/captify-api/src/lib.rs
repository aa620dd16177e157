//! Captify API
//!
//! HTTP surface for quota-gated caption generation and Razorpay checkout.
//!
//! ## Endpoints (under `/functions/v1`)
//!
//! - `POST /generate-content` - Quota-gated caption generation
//! - `POST /create-razorpay-order` - Open a checkout order
//! - `POST /verify-razorpay-payment` - Verify a checkout and activate the plan
//! - `POST /get-trending-hashtags` - Trending hashtags (no auth)
//! - `GET /quota` - Today's usage and allowance
//! - `GET /subscription` - Current plan
//! - `GET /payment-history` - Recent orders
//!
//! ## Health Endpoints
//!
//! - `GET /health` - Liveness probe
//! - `GET /ready` - Readiness probe
//! - `GET /metrics` - Prometheus metrics

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod state;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::handlers::{health, ready};
use crate::state::AppState;

pub use crate::auth::{AccessClaims, AuthUser, TokenValidator};
pub use crate::config::{Config, ConfigError};
pub use crate::error::{ApiError, ApiResult, ErrorResponse};

/// Body limit for generation requests: a 20 MiB media file base64-encodes to
/// about 27 MiB, plus the other JSON fields
pub const GENERATE_BODY_LIMIT: usize = 32 * 1024 * 1024;

/// Build the HTTP router
pub fn build_router(state: AppState, metrics_handle: Option<PrometheusHandle>) -> Router {
    let request_timeout = state.request_timeout();

    let functions = Router::new()
        .route(
            "/generate-content",
            post(handlers::generate_content).layer(DefaultBodyLimit::max(GENERATE_BODY_LIMIT)),
        )
        .route("/create-razorpay-order", post(handlers::create_razorpay_order))
        .route("/verify-razorpay-payment", post(handlers::verify_razorpay_payment))
        .route("/get-trending-hashtags", post(handlers::get_trending_hashtags))
        .route("/quota", get(handlers::get_quota))
        .route("/subscription", get(handlers::get_subscription))
        .route("/payment-history", get(handlers::get_payment_history));

    // Health routes (no timeout - must always respond quickly)
    let health_routes = Router::new()
        .route("/health", get(health))
        .route("/ready", get(ready));

    let metrics_route = if let Some(handle) = metrics_handle {
        Router::new().route("/metrics", get(move || async move { handle.render() }))
    } else {
        Router::new()
    };

    // Outermost first
    let middleware = ServiceBuilder::new()
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TimeoutLayer::new(request_timeout));

    Router::new()
        .nest("/functions/v1", functions)
        .layer(middleware)
        .merge(health_routes)
        .merge(metrics_route)
        .with_state(state)
}

/// Install the Prometheus recorder and describe service metrics
pub fn setup_metrics() -> anyhow::Result<PrometheusHandle> {
    // Generation latency is dominated by the AI gateway round trip
    let latency_buckets = &[0.005, 0.025, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0];

    let handle = PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full("captify_operation_duration_seconds".to_string()),
            latency_buckets,
        )?
        .install_recorder()?;

    metrics::describe_counter!(
        "captify_generations_total",
        "Caption generations by result"
    );
    metrics::describe_counter!(
        "captify_quota_rejections_total",
        "Generations refused because the daily allowance was spent"
    );
    metrics::describe_counter!(
        "captify_orders_created_total",
        "Checkout orders created by tier"
    );
    metrics::describe_counter!(
        "captify_payments_verified_total",
        "Payment verifications by result"
    );
    metrics::describe_histogram!(
        "captify_operation_duration_seconds",
        "Operation latency in seconds by operation and result"
    );

    Ok(handle)
}
