//! Configuration for the Captify API service.

use captify_billing_core::{AiGatewayConfig, BillingConfig};
use std::time::Duration;

/// Captify API configuration
#[derive(Clone)]
pub struct Config {
    /// HTTP server port
    pub http_port: u16,
    /// Database URL
    pub database_url: String,
    /// HS256 secret for bearer tokens
    pub jwt_secret: String,
    /// Expected `aud` claim of bearer tokens
    pub jwt_audience: String,
    /// Billing core configuration
    pub billing: BillingConfig,
    /// AI gateway configuration
    pub ai: AiGatewayConfig,
    /// Request timeout
    pub request_timeout: Duration,
    /// Metrics enabled
    pub metrics_enabled: bool,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source
    pub fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let required = |key: &'static str| var(key).ok_or(ConfigError::Missing(key));
        let or_default = |key: &str, default: &str| var(key).unwrap_or_else(|| default.to_string());

        // Database
        let database_url = required("DATABASE_URL")?;

        // Server
        let http_port = or_default("HTTP_PORT", "8080")
            .parse()
            .map_err(|_| ConfigError::Invalid("HTTP_PORT"))?;

        // Auth
        let jwt_secret = required("AUTH_JWT_SECRET")?;
        if jwt_secret.len() < 32 {
            return Err(ConfigError::Invalid("AUTH_JWT_SECRET"));
        }
        let jwt_audience = or_default("AUTH_JWT_AUDIENCE", "authenticated");

        // Razorpay
        let key_id = required("RAZORPAY_KEY_ID")?;
        let key_secret = required("RAZORPAY_KEY_SECRET")?;
        let api_base = or_default("RAZORPAY_API_BASE", "https://api.razorpay.com/v1");
        let currency = or_default("PAYMENT_CURRENCY", "INR");

        // Quota
        let freemium_daily_limit: u32 = or_default("FREEMIUM_DAILY_LIMIT", "3")
            .parse()
            .map_err(|_| ConfigError::Invalid("FREEMIUM_DAILY_LIMIT"))?;
        if freemium_daily_limit == 0 {
            return Err(ConfigError::Invalid("FREEMIUM_DAILY_LIMIT"));
        }
        let usage_offset: i32 = or_default("USAGE_UTC_OFFSET_MINUTES", "0")
            .parse()
            .map_err(|_| ConfigError::Invalid("USAGE_UTC_OFFSET_MINUTES"))?;
        if usage_offset.abs() >= 24 * 60 {
            return Err(ConfigError::Invalid("USAGE_UTC_OFFSET_MINUTES"));
        }
        let reservation_ttl_secs: u64 = or_default("QUOTA_RESERVATION_TTL_SECS", "120")
            .parse()
            .map_err(|_| ConfigError::Invalid("QUOTA_RESERVATION_TTL_SECS"))?;
        if reservation_ttl_secs == 0 {
            return Err(ConfigError::Invalid("QUOTA_RESERVATION_TTL_SECS"));
        }

        // AI gateway
        let ai_key = required("AI_GATEWAY_API_KEY")?;
        let mut ai = AiGatewayConfig::new(ai_key);
        if let Some(url) = var("AI_GATEWAY_URL") {
            ai = ai.with_url(url);
        }
        if let Some(model) = var("AI_MODEL") {
            ai = ai.with_model(model);
        }

        // Request timeout
        let request_timeout_secs: u64 = or_default("REQUEST_TIMEOUT_SECS", "60")
            .parse()
            .map_err(|_| ConfigError::Invalid("REQUEST_TIMEOUT_SECS"))?;

        // Metrics
        let metrics_enabled = or_default("METRICS_ENABLED", "true")
            .parse()
            .unwrap_or(true);

        // Build billing config
        let billing = BillingConfig::new(key_id, key_secret)
            .with_api_base(api_base)
            .with_currency(currency)
            .with_freemium_limit(freemium_daily_limit)
            .with_usage_offset_minutes(usage_offset)
            .with_reservation_ttl(Duration::from_secs(reservation_ttl_secs));

        Ok(Self {
            http_port,
            database_url,
            jwt_secret,
            jwt_audience,
            billing,
            ai,
            request_timeout: Duration::from_secs(request_timeout_secs),
            metrics_enabled,
        })
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("http_port", &self.http_port)
            .field("jwt_audience", &self.jwt_audience)
            .field("billing", &self.billing)
            .field("ai", &self.ai)
            .field("request_timeout", &self.request_timeout)
            .field("metrics_enabled", &self.metrics_enabled)
            .finish_non_exhaustive()
    }
}

/// Configuration error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),
}
