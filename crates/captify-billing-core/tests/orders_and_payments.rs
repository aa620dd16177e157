//! Integration tests for order creation and payment verification
//!
//! These tests verify:
//! - Orders are priced from the server-side schedule
//! - Verified payments activate a subscription of the ordered length
//! - Tampered signatures write nothing
//! - The pending order decides which tier a payment buys

mod common;

use std::sync::Arc;

use captify_billing_core::{
    BillingConfig, BillingError, BillingService, CreateOrderRequest, PaymentVerifier,
    SignatureVerifier, VerifyPaymentRequest,
};
use captify_types::{Tier, UserId};
use chrono::{TimeZone, Utc};
use common::{MockOracle, MockProvider, MockStores, TEST_KEY_ID, TEST_KEY_SECRET};

struct Harness {
    mocks: MockStores,
    provider: MockProvider,
    billing: BillingService,
}

fn harness() -> Harness {
    let mocks = MockStores::new();
    let provider = MockProvider::new();
    let billing = BillingService::new(
        mocks.stores(),
        BillingConfig::new(TEST_KEY_ID, TEST_KEY_SECRET),
        Arc::new(provider.clone()),
        Arc::new(MockOracle::new()),
    )
    .unwrap();
    Harness {
        mocks,
        provider,
        billing,
    }
}

fn order(tier: Tier, amount: u32, duration_months: u32) -> CreateOrderRequest {
    CreateOrderRequest {
        amount,
        tier,
        duration_months,
    }
}

fn signed(order_id: &str, payment_id: &str, tier: Tier, months: u32) -> VerifyPaymentRequest {
    let signature = SignatureVerifier::new(TEST_KEY_SECRET)
        .sign(order_id, payment_id)
        .unwrap();
    VerifyPaymentRequest {
        razorpay_order_id: order_id.to_string(),
        razorpay_payment_id: payment_id.to_string(),
        razorpay_signature: signature,
        tier,
        duration_months: months,
    }
}

#[tokio::test]
async fn test_yearly_order_at_schedule_price() {
    let h = harness();
    let user = UserId::new();

    let created = h
        .billing
        .create_order(&user, order(Tier::Yearly, 999, 12))
        .await
        .unwrap();

    assert_eq!(created.amount, 99_900);
    assert_eq!(created.currency, "INR");
    assert_eq!(created.key_id, TEST_KEY_ID);
    assert!(created.recorded);

    let sent = h.provider.requests();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].amount, 99_900);
    assert_eq!(sent[0].notes.tier, "yearly");
    assert_eq!(sent[0].notes.duration_months, "12");
    assert!(sent[0].receipt.starts_with(&format!("ord_{}_", user.short_prefix())));
    assert!(sent[0].receipt.len() <= 40);

    let row = h.mocks.payments.order(&created.order_id).unwrap();
    assert_eq!(row.status, "pending");
    assert_eq!(row.amount, 99_900);
    assert_eq!(row.user_id, user.0);
}

#[tokio::test]
async fn test_tampered_amount_is_price_mismatch() {
    let h = harness();
    let user = UserId::new();

    let result = h
        .billing
        .create_order(&user, order(Tier::Yearly, 1, 12))
        .await;

    match result {
        Err(BillingError::PriceMismatch {
            tier,
            expected,
            actual,
        }) => {
            assert_eq!(tier, Tier::Yearly);
            assert_eq!(expected, 999);
            assert_eq!(actual, 1);
        }
        other => panic!("Expected PriceMismatch, got: {:?}", other),
    }
    assert!(h.provider.requests().is_empty());
    assert_eq!(h.mocks.payments.len(), 0);
}

#[tokio::test]
async fn test_order_rejects_bad_plans() {
    let h = harness();
    let user = UserId::new();

    let freemium = h.billing.create_order(&user, order(Tier::Freemium, 99, 1)).await;
    assert!(matches!(
        freemium,
        Err(BillingError::Validation { field: "tier", .. })
    ));

    let wrong_length = h.billing.create_order(&user, order(Tier::SixMonths, 549, 3)).await;
    assert!(matches!(
        wrong_length,
        Err(BillingError::Validation {
            field: "durationMonths",
            ..
        })
    ));

    let out_of_range = h.billing.create_order(&user, order(Tier::Monthly, 2_000_000, 1)).await;
    assert!(matches!(
        out_of_range,
        Err(BillingError::Validation { field: "amount", .. })
    ));

    assert!(h.provider.requests().is_empty());
}

#[tokio::test]
async fn test_order_survives_history_write_failure() {
    let h = harness();
    let user = UserId::new();
    h.mocks.payments.fail_creates(true);

    let created = h
        .billing
        .create_order(&user, order(Tier::Monthly, 99, 1))
        .await
        .unwrap();

    assert!(!created.recorded);
    assert_eq!(created.amount, 9_900);
    assert_eq!(h.provider.requests().len(), 1);
}

#[tokio::test]
async fn test_order_then_verify_activates_subscription() {
    let h = harness();
    let user = UserId::new();

    let created = h
        .billing
        .create_order(&user, order(Tier::Monthly, 99, 1))
        .await
        .unwrap();

    let verified = h
        .billing
        .verify_payment(&user, signed(&created.order_id, "pay_001", Tier::Monthly, 1))
        .await
        .unwrap();

    assert!(verified.order_completed);
    assert_eq!(verified.subscription.tier, Tier::Monthly);
    assert_eq!(
        verified.subscription.payment_reference.as_deref(),
        Some("pay_001")
    );

    let row = h.mocks.payments.order(&created.order_id).unwrap();
    assert_eq!(row.status, "success");
    assert_eq!(row.provider_payment_id.as_deref(), Some("pay_001"));

    let quota = h.billing.quota(&user).await.unwrap();
    assert_eq!(quota.tier, Tier::Monthly);
    assert!(quota.daily_limit.is_unlimited());

    let history = h.billing.payment_history(&user).await.unwrap();
    assert_eq!(history.len(), 1);
}

#[tokio::test]
async fn test_month_end_expiry_rolls_over() {
    let mocks = MockStores::new();
    let verifier = PaymentVerifier::new(mocks.stores(), SignatureVerifier::new(TEST_KEY_SECRET));
    let user = UserId::new();
    let now = Utc.with_ymd_and_hms(2025, 1, 31, 9, 15, 0).unwrap();

    let verified = verifier
        .verify_payment_at(&user, signed("order_jan", "pay_jan", Tier::Monthly, 1), now)
        .await
        .unwrap();

    assert_eq!(verified.subscription.started_at, now);
    assert_eq!(
        verified.subscription.expires_at,
        Some(Utc.with_ymd_and_hms(2025, 3, 3, 9, 15, 0).unwrap())
    );
    assert!(!verified.order_completed);
}

#[tokio::test]
async fn test_bad_signature_writes_nothing() {
    let h = harness();
    let user = UserId::new();
    let created = h
        .billing
        .create_order(&user, order(Tier::Monthly, 99, 1))
        .await
        .unwrap();

    let mut request = signed(&created.order_id, "pay_001", Tier::Monthly, 1);
    request.razorpay_payment_id = "pay_002".to_string();

    let result = h.billing.verify_payment(&user, request).await;
    assert!(matches!(result, Err(BillingError::InvalidSignature)));
    assert!(h.mocks.subscriptions.for_user(user.0).is_empty());
    assert_eq!(
        h.mocks.payments.order(&created.order_id).unwrap().status,
        "pending"
    );
}

#[tokio::test]
async fn test_verify_cannot_upgrade_ordered_tier() {
    let h = harness();
    let user = UserId::new();
    let created = h
        .billing
        .create_order(&user, order(Tier::Monthly, 99, 1))
        .await
        .unwrap();

    let result = h
        .billing
        .verify_payment(&user, signed(&created.order_id, "pay_001", Tier::Yearly, 12))
        .await;

    assert!(matches!(result, Err(BillingError::Validation { .. })));
    assert!(h.mocks.subscriptions.for_user(user.0).is_empty());
}

#[tokio::test]
async fn test_subscription_write_failure_marks_order_failed() {
    let h = harness();
    let user = UserId::new();
    let created = h
        .billing
        .create_order(&user, order(Tier::SixMonths, 549, 6))
        .await
        .unwrap();
    h.mocks.subscriptions.fail_creates(true);

    let result = h
        .billing
        .verify_payment(&user, signed(&created.order_id, "pay_001", Tier::SixMonths, 6))
        .await;

    assert!(matches!(result, Err(BillingError::StoreUnavailable(_))));
    assert_eq!(
        h.mocks.payments.order(&created.order_id).unwrap().status,
        "failed"
    );
}

#[tokio::test]
async fn test_verify_rejects_freemium_tier() {
    let h = harness();
    let user = UserId::new();

    let result = h
        .billing
        .verify_payment(&user, signed("order_x", "pay_x", Tier::Freemium, 1))
        .await;

    assert!(matches!(
        result,
        Err(BillingError::Validation { field: "tier", .. })
    ));
}

#[tokio::test]
async fn test_verify_reports_duration_mismatch() {
    let h = harness();
    let user = UserId::new();
    let created = h
        .billing
        .create_order(&user, order(Tier::SixMonths, 549, 6))
        .await
        .unwrap();

    let result = h
        .billing
        .verify_payment(&user, signed(&created.order_id, "pay_001", Tier::SixMonths, 12))
        .await;

    assert!(matches!(
        result,
        Err(BillingError::Validation { field: "durationMonths", .. })
    ));
    assert!(h.mocks.subscriptions.for_user(user.0).is_empty());
}

#[tokio::test]
async fn test_malformed_signatures_are_invalid_signature() {
    let h = harness();
    let user = UserId::new();
    let valid = signed("order_001", "pay_001", Tier::Monthly, 1);

    let mut truncated = valid.clone();
    truncated.razorpay_signature.pop();
    let mut extended = valid.clone();
    extended.razorpay_signature.push('0');
    let mut empty = valid.clone();
    empty.razorpay_signature.clear();
    let mut oversized = valid;
    oversized.razorpay_signature = "a".repeat(512);

    for request in [truncated, extended, empty, oversized] {
        let result = h.billing.verify_payment(&user, request).await;
        assert!(matches!(result, Err(BillingError::InvalidSignature)));
    }
    assert!(h.mocks.subscriptions.for_user(user.0).is_empty());
}
