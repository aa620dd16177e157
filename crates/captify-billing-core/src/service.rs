//! Billing service
//!
//! Wires the resolver, gateway, order service and payment verifier over one
//! set of stores.

use std::sync::Arc;

use chrono::Utc;

use captify_db::Stores;
use captify_types::{PaymentOrder, QuotaSnapshot, Subscription, UserId};

use crate::calendar::UsageCalendar;
use crate::config::BillingConfig;
use crate::entitlement::EntitlementResolver;
use crate::error::BillingError;
use crate::gateway::{GenerationGateway, GenerationOutcome};
use crate::oracle::{CaptionOracle, GenerationRequest, HashtagRequest};
use crate::orders::{CreateOrderRequest, CreatedOrder, OrderService};
use crate::payments::{PaymentVerifier, VerifiedPayment, VerifyPaymentRequest};
use crate::provider::PaymentProvider;
use crate::signature::SignatureVerifier;

/// Payment history entries returned per request
pub const PAYMENT_HISTORY_LIMIT: i64 = 10;

/// Billing service
#[derive(Clone)]
pub struct BillingService {
    stores: Stores,
    resolver: EntitlementResolver,
    gateway: GenerationGateway,
    orders: OrderService,
    payments: PaymentVerifier,
    oracle: Arc<dyn CaptionOracle>,
}

impl BillingService {
    /// Create a new billing service
    pub fn new(
        stores: Stores,
        config: BillingConfig,
        provider: Arc<dyn PaymentProvider>,
        oracle: Arc<dyn CaptionOracle>,
    ) -> Result<Self, BillingError> {
        if config.freemium_daily_limit == 0 {
            return Err(BillingError::Internal(
                "freemium daily limit must be at least 1".to_string(),
            ));
        }
        if config.reservation_ttl.as_secs() == 0 {
            return Err(BillingError::Internal(
                "reservation ttl must be at least one second".to_string(),
            ));
        }
        let calendar = UsageCalendar::with_offset_minutes(config.usage_utc_offset_minutes)
            .ok_or_else(|| BillingError::Internal("usage offset out of range".to_string()))?;

        let config = Arc::new(config);
        let resolver =
            EntitlementResolver::new(stores.clone(), config.freemium_daily_limit, calendar);
        let gateway = GenerationGateway::new(resolver.clone(), stores.clone(), oracle.clone())
            .with_reservation_ttl(config.reservation_ttl);
        let orders = OrderService::new(stores.clone(), provider, config.clone());
        let payments = PaymentVerifier::new(
            stores.clone(),
            SignatureVerifier::new(config.razorpay_key_secret.clone()),
        );

        Ok(Self {
            stores,
            resolver,
            gateway,
            orders,
            payments,
            oracle,
        })
    }

    /// Current entitlement
    pub async fn quota(&self, user_id: &UserId) -> Result<QuotaSnapshot, BillingError> {
        self.resolver.resolve_quota(user_id, Utc::now()).await
    }

    /// Subscription granting the current tier, if any
    pub async fn current_subscription(
        &self,
        user_id: &UserId,
    ) -> Result<Option<Subscription>, BillingError> {
        self.resolver
            .effective_subscription(user_id, Utc::now())
            .await
    }

    /// Quota-gated caption generation
    pub async fn generate(
        &self,
        user_id: UserId,
        request: GenerationRequest,
    ) -> Result<GenerationOutcome, BillingError> {
        self.gateway.perform_gated_generation(user_id, request).await
    }

    /// Trending hashtags, not metered
    pub async fn trending_hashtags(
        &self,
        request: HashtagRequest,
    ) -> Result<Vec<String>, BillingError> {
        request.validate()?;
        self.oracle.trending_hashtags(&request).await
    }

    /// Open a checkout order
    pub async fn create_order(
        &self,
        user_id: &UserId,
        request: CreateOrderRequest,
    ) -> Result<CreatedOrder, BillingError> {
        self.orders.create_order(user_id, request).await
    }

    /// Verify a checkout and activate the subscription
    pub async fn verify_payment(
        &self,
        user_id: &UserId,
        request: VerifyPaymentRequest,
    ) -> Result<VerifiedPayment, BillingError> {
        self.payments.verify_payment(user_id, request).await
    }

    /// Most recent payment orders, newest first
    pub async fn payment_history(&self, user_id: &UserId) -> Result<Vec<PaymentOrder>, BillingError> {
        let rows = self
            .stores
            .payments
            .list_by_user_id(user_id.0, PAYMENT_HISTORY_LIMIT)
            .await?;

        rows.into_iter()
            .map(|row| row.into_domain().map_err(BillingError::from))
            .collect()
    }
}

impl std::fmt::Debug for BillingService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BillingService")
            .field("resolver", &self.resolver)
            .field("orders", &self.orders)
            .finish_non_exhaustive()
    }
}
