//! Captify Billing Core - Quota and subscription business logic
//!
//! Entitlement resolution, quota-gated caption generation, Razorpay order
//! creation and payment verification.
//!
//! # Example
//!
//! ```rust,ignore
//! use captify_billing_core::{AiGatewayConfig, AiGatewayOracle, BillingConfig, BillingService, RazorpayProvider};
//! use captify_db::{Repositories, Stores};
//!
//! let config = BillingConfig::new("rzp_test_...", "secret").with_freemium_limit(3);
//! let provider = Arc::new(RazorpayProvider::new(&config)?);
//! let oracle = Arc::new(AiGatewayOracle::new(AiGatewayConfig::new("key"))?);
//!
//! let billing = BillingService::new(Stores::from(Repositories::new(pool)), config, provider, oracle)?;
//!
//! // Fails with QuotaExceeded once the freemium allowance is spent
//! let outcome = billing.generate(user_id, request).await?;
//! ```

pub mod ai_gateway;
pub mod calendar;
pub mod config;
pub mod entitlement;
pub mod error;
pub mod gateway;
pub mod oracle;
pub mod orders;
pub mod payments;
pub mod provider;
pub mod razorpay;
pub mod service;
pub mod signature;

pub use ai_gateway::{AiGatewayConfig, AiGatewayOracle};
pub use calendar::{add_months_rolling, UsageCalendar};
pub use config::BillingConfig;
pub use entitlement::EntitlementResolver;
pub use error::BillingError;
pub use gateway::{GenerationGateway, GenerationOutcome};
pub use oracle::{
    CaptionLengths, CaptionOracle, GeneratedContent, GenerationRequest, HashtagRequest, Mood,
    Platform,
};
pub use orders::{CreateOrderRequest, CreatedOrder, OrderService};
pub use payments::{PaymentVerifier, VerifiedPayment, VerifyPaymentRequest};
pub use provider::{OrderNotes, OrderRequest, PaymentProvider, ProviderOrder};
pub use razorpay::RazorpayProvider;
pub use service::{BillingService, PAYMENT_HISTORY_LIMIT};
pub use signature::SignatureVerifier;
