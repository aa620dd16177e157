//! Payment order creation

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument};

use captify_db::{CreatePaymentOrder, Stores};
use captify_types::{PaymentOrderId, Tier, UserId};

use crate::config::BillingConfig;
use crate::error::BillingError;
use crate::provider::{OrderNotes, OrderRequest, PaymentProvider};

const MAX_AMOUNT: u32 = 1_000_000;
const MAX_DURATION_MONTHS: u32 = 12;
const MAX_RECEIPT_LEN: usize = 40;

/// Checkout request from the client
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateOrderRequest {
    /// Price in major currency units
    pub amount: u32,
    /// Tier being purchased
    pub tier: Tier,
    /// Purchased duration in months
    pub duration_months: u32,
}

/// Order ready for client-side checkout
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedOrder {
    /// Provider order ID the client pays against
    pub order_id: String,
    /// Amount in the smallest currency unit
    pub amount: i64,
    /// ISO currency code
    pub currency: String,
    /// Public provider key for the checkout widget
    pub key_id: String,
    /// Local payment history ID
    #[serde(skip)]
    pub local_id: PaymentOrderId,
    /// Whether the pending order reached payment history
    #[serde(skip)]
    pub recorded: bool,
}

/// Creates provider orders at server-side prices and records them as pending
#[derive(Clone)]
pub struct OrderService {
    stores: Stores,
    provider: Arc<dyn PaymentProvider>,
    config: Arc<BillingConfig>,
}

impl OrderService {
    /// Create a new order service
    pub fn new(stores: Stores, provider: Arc<dyn PaymentProvider>, config: Arc<BillingConfig>) -> Self {
        Self {
            stores,
            provider,
            config,
        }
    }

    /// Validate a checkout request against the price schedule and open a
    /// provider order for it.
    ///
    /// A failure to record the pending order is logged, not returned: the
    /// provider order already exists and the client can still pay it.
    #[instrument(skip(self, request), fields(user_id = %user_id, tier = %request.tier))]
    pub async fn create_order(
        &self,
        user_id: &UserId,
        request: CreateOrderRequest,
    ) -> Result<CreatedOrder, BillingError> {
        self.check_price(&request)?;

        let now = Utc::now();
        let receipt = receipt_for(user_id, now);
        let provider_request = OrderRequest {
            amount: i64::from(request.amount) * 100,
            currency: self.config.currency.clone(),
            receipt: receipt.clone(),
            notes: OrderNotes {
                user_id: user_id.to_string(),
                tier: request.tier.as_str().to_string(),
                duration_months: request.duration_months.to_string(),
            },
        };

        let order = self.provider.create_order(&provider_request).await?;
        info!(provider_order_id = %order.id, amount = order.amount, "Provider order created");

        let local_id = PaymentOrderId::new();
        let record = CreatePaymentOrder {
            id: local_id.0,
            user_id: user_id.0,
            amount: order.amount,
            currency: order.currency.clone(),
            tier: request.tier.as_str().to_string(),
            duration_months: i32::try_from(request.duration_months).unwrap_or(i32::MAX),
            receipt,
            provider_order_id: order.id.clone(),
        };

        let recorded = match self.stores.payments.create(record).await {
            Ok(_) => true,
            Err(e) => {
                error!(
                    error = %e,
                    reconciliation = true,
                    provider_order_id = %order.id,
                    "Failed to record pending order"
                );
                false
            }
        };

        Ok(CreatedOrder {
            order_id: order.id,
            amount: order.amount,
            currency: order.currency,
            key_id: self.provider.key_id().to_string(),
            local_id,
            recorded,
        })
    }

    fn check_price(&self, request: &CreateOrderRequest) -> Result<(), BillingError> {
        if request.amount == 0 || request.amount > MAX_AMOUNT {
            return Err(BillingError::validation(
                "amount",
                format!("must be between 1 and {MAX_AMOUNT}"),
            ));
        }
        if request.duration_months == 0 || request.duration_months > MAX_DURATION_MONTHS {
            return Err(BillingError::validation(
                "durationMonths",
                format!("must be between 1 and {MAX_DURATION_MONTHS}"),
            ));
        }

        let plan = self
            .config
            .plan(request.tier)
            .ok_or_else(|| BillingError::validation("tier", "tier is not purchasable"))?;

        if plan.amount != request.amount {
            return Err(BillingError::PriceMismatch {
                tier: request.tier,
                expected: plan.amount,
                actual: request.amount,
            });
        }
        if plan.duration_months != request.duration_months {
            return Err(BillingError::validation(
                "durationMonths",
                format!(
                    "{} is sold for {} months",
                    request.tier, plan.duration_months
                ),
            ));
        }

        Ok(())
    }
}

impl std::fmt::Debug for OrderService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderService")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Merchant receipt: `ord_<user prefix>_<last 8 digits of epoch millis>`
pub fn receipt_for(user_id: &UserId, at: DateTime<Utc>) -> String {
    let millis = at.timestamp_millis().unsigned_abs().to_string();
    let suffix = &millis[millis.len().saturating_sub(8)..];
    let mut receipt = format!("ord_{}_{suffix}", user_id.short_prefix());
    receipt.truncate(MAX_RECEIPT_LEN);
    receipt
}
