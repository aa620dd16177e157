//! Payment verification and subscription activation

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument, warn};

use captify_db::{CompletePaymentOrder, CreateSubscription, Stores};
use captify_types::{PaymentStatus, Subscription, SubscriptionId, Tier, UserId};

use crate::calendar::add_months_rolling;
use crate::error::BillingError;
use crate::signature::SignatureVerifier;

const MAX_ID_LEN: usize = 64;
const MAX_DURATION_MONTHS: u32 = 12;

/// Checkout completion reported by the client
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VerifyPaymentRequest {
    pub razorpay_order_id: String,
    pub razorpay_payment_id: String,
    pub razorpay_signature: String,
    pub tier: Tier,
    #[serde(rename = "durationMonths")]
    pub duration_months: u32,
}

impl VerifyPaymentRequest {
    fn validate(&self) -> Result<(), BillingError> {
        // The signature is left to the verifier so every malformed value
        // reports as InvalidSignature
        for (field, value) in [
            ("razorpay_order_id", &self.razorpay_order_id),
            ("razorpay_payment_id", &self.razorpay_payment_id),
        ] {
            if value.is_empty() || value.len() > MAX_ID_LEN {
                return Err(BillingError::validation(
                    field,
                    format!("must be 1 to {MAX_ID_LEN} characters"),
                ));
            }
        }
        if !self.tier.is_paid() {
            return Err(BillingError::validation("tier", "tier is not purchasable"));
        }
        if self.duration_months == 0 || self.duration_months > MAX_DURATION_MONTHS {
            return Err(BillingError::validation(
                "durationMonths",
                format!("must be between 1 and {MAX_DURATION_MONTHS}"),
            ));
        }
        Ok(())
    }
}

/// Outcome of a verified payment
#[derive(Debug, Clone)]
pub struct VerifiedPayment {
    /// Newly created subscription
    pub subscription: Subscription,
    /// Whether a pending order was moved to `success`
    pub order_completed: bool,
}

/// Verifies checkout signatures and activates the purchased tier
#[derive(Clone, Debug)]
pub struct PaymentVerifier {
    stores: Stores,
    signatures: SignatureVerifier,
}

impl PaymentVerifier {
    /// Create a new verifier
    pub fn new(stores: Stores, signatures: SignatureVerifier) -> Self {
        Self { stores, signatures }
    }

    /// Verify a payment and activate its subscription starting now
    pub async fn verify_payment(
        &self,
        user_id: &UserId,
        request: VerifyPaymentRequest,
    ) -> Result<VerifiedPayment, BillingError> {
        self.verify_payment_at(user_id, request, Utc::now()).await
    }

    /// Verify a payment and activate its subscription starting at `now`.
    ///
    /// Nothing is written unless the signature verifies. When the pending
    /// order exists its tier and duration are authoritative.
    #[instrument(
        skip(self, request, now),
        fields(user_id = %user_id, provider_order_id = %request.razorpay_order_id)
    )]
    pub async fn verify_payment_at(
        &self,
        user_id: &UserId,
        request: VerifyPaymentRequest,
        now: DateTime<Utc>,
    ) -> Result<VerifiedPayment, BillingError> {
        request.validate()?;

        self.signatures.verify(
            &request.razorpay_order_id,
            &request.razorpay_payment_id,
            &request.razorpay_signature,
        )?;

        let pending = self
            .stores
            .payments
            .find_by_provider_order_id(user_id.0, &request.razorpay_order_id)
            .await?
            .map(|row| row.into_domain())
            .transpose()?;

        match &pending {
            Some(order) => {
                let duration = u32::try_from(order.duration_months).unwrap_or(0);
                if order.tier != request.tier {
                    warn!(
                        order_tier = %order.tier,
                        requested_tier = %request.tier,
                        "Verification does not match the ordered plan"
                    );
                    return Err(BillingError::validation(
                        "tier",
                        "does not match the order being paid",
                    ));
                }
                if duration != request.duration_months {
                    warn!(
                        order_duration = duration,
                        requested_duration = request.duration_months,
                        "Verification does not match the ordered duration"
                    );
                    return Err(BillingError::validation(
                        "durationMonths",
                        "does not match the order being paid",
                    ));
                }
                if order.status.is_terminal() {
                    warn!(status = order.status.as_str(), "Order already completed");
                }
            }
            None => warn!("No recorded order for verified payment"),
        }

        let expires_at = add_months_rolling(now, request.duration_months)
            .ok_or_else(|| BillingError::Internal("subscription expiry out of range".to_string()))?;

        let created = self
            .stores
            .subscriptions
            .create(CreateSubscription {
                id: SubscriptionId::new().0,
                user_id: user_id.0,
                tier: request.tier.as_str().to_string(),
                started_at: now,
                expires_at: Some(expires_at),
                payment_reference: Some(request.razorpay_payment_id.clone()),
                provider_order_id: Some(request.razorpay_order_id.clone()),
            })
            .await;

        let subscription = match created {
            Ok(row) => row.into_domain()?,
            Err(e) => {
                error!(error = %e, "Failed to activate subscription");
                self.complete_order(user_id, &request, PaymentStatus::Failed).await;
                return Err(e.into());
            }
        };

        let order_completed = self
            .complete_order(user_id, &request, PaymentStatus::Success)
            .await;

        info!(
            tier = %subscription.tier,
            expires_at = %expires_at,
            "Subscription activated"
        );

        Ok(VerifiedPayment {
            subscription,
            order_completed,
        })
    }

    /// Move the pending order to `status`, logging instead of failing
    async fn complete_order(
        &self,
        user_id: &UserId,
        request: &VerifyPaymentRequest,
        status: PaymentStatus,
    ) -> bool {
        let completion = CompletePaymentOrder {
            user_id: user_id.0,
            provider_order_id: request.razorpay_order_id.clone(),
            status: status.as_str().to_string(),
            provider_payment_id: request.razorpay_payment_id.clone(),
            provider_signature: request.razorpay_signature.clone(),
        };

        match self.stores.payments.complete(completion).await {
            Ok(true) => true,
            Ok(false) => {
                warn!(status = status.as_str(), "No pending order to complete");
                false
            }
            Err(e) => {
                error!(
                    error = %e,
                    reconciliation = true,
                    status = status.as_str(),
                    "Failed to update payment history"
                );
                false
            }
        }
    }
}
