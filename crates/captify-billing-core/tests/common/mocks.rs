//! Mock oracle and payment provider for testing

use async_trait::async_trait;
use captify_billing_core::{
    BillingError, CaptionOracle, GeneratedContent, GenerationRequest, HashtagRequest,
    OrderRequest, PaymentProvider, ProviderOrder,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// What the mock oracle answers with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OracleMode {
    Succeed,
    RateLimited,
    CreditsDepleted,
    Fail,
}

/// Oracle that counts calls and optionally stalls
#[derive(Clone)]
pub struct MockOracle {
    calls: Arc<AtomicUsize>,
    mode: Arc<Mutex<OracleMode>>,
    delay: Duration,
}

impl MockOracle {
    pub fn new() -> Self {
        Self::with_delay(Duration::ZERO)
    }

    pub fn with_delay(delay: Duration) -> Self {
        Self {
            calls: Arc::new(AtomicUsize::new(0)),
            mode: Arc::new(Mutex::new(OracleMode::Succeed)),
            delay,
        }
    }

    pub fn set_mode(&self, mode: OracleMode) {
        *self.mode.lock().unwrap() = mode;
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CaptionOracle for MockOracle {
    async fn generate(&self, request: &GenerationRequest) -> Result<GeneratedContent, BillingError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let mode = *self.mode.lock().unwrap();
        match mode {
            OracleMode::Succeed => Ok(GeneratedContent {
                captions: vec![format!("A {} caption about {}", request.mood, request.niche)],
                hashtags: vec!["#test".to_string()],
            }),
            OracleMode::RateLimited => Err(BillingError::RateLimited),
            OracleMode::CreditsDepleted => Err(BillingError::CreditsDepleted),
            OracleMode::Fail => Err(BillingError::OracleError("boom".to_string())),
        }
    }

    async fn trending_hashtags(
        &self,
        request: &HashtagRequest,
    ) -> Result<Vec<String>, BillingError> {
        Ok(vec![format!("#{}", request.niche.replace(' ', ""))])
    }
}

/// Provider that echoes orders back and records what it was sent
#[derive(Clone, Default)]
pub struct MockProvider {
    requests: Arc<Mutex<Vec<OrderRequest>>>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn requests(&self) -> Vec<OrderRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl PaymentProvider for MockProvider {
    async fn create_order(&self, request: &OrderRequest) -> Result<ProviderOrder, BillingError> {
        let mut requests = self.requests.lock().unwrap();
        requests.push(request.clone());
        Ok(ProviderOrder {
            id: format!("order_mock{:04}", requests.len()),
            amount: request.amount,
            currency: request.currency.clone(),
            receipt: Some(request.receipt.clone()),
            status: Some("created".to_string()),
        })
    }

    fn key_id(&self) -> &str {
        super::TEST_KEY_ID
    }
}
