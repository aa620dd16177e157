//! Razorpay payment provider implementation

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, error, instrument};

use crate::config::BillingConfig;
use crate::error::BillingError;
use crate::provider::{OrderRequest, PaymentProvider, ProviderOrder};

/// Razorpay payment provider
#[derive(Clone)]
pub struct RazorpayProvider {
    client: Client,
    key_id: String,
    key_secret: String,
    api_base: String,
}

impl RazorpayProvider {
    /// Create a new Razorpay provider
    pub fn new(config: &BillingConfig) -> Result<Self, BillingError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .map_err(|e| BillingError::Internal(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            key_id: config.razorpay_key_id.clone(),
            key_secret: config.razorpay_key_secret.clone(),
            api_base: config.razorpay_api_base.clone(),
        })
    }

    /// Make authenticated request to Razorpay
    async fn razorpay_request<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: reqwest::Method,
        endpoint: &str,
        body: Option<&B>,
    ) -> Result<T, BillingError> {
        let url = format!("{}{endpoint}", self.api_base);

        let mut request = self
            .client
            .request(method, &url)
            .basic_auth(&self.key_id, Some(&self.key_secret));

        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| {
            error!(error = %e, "Razorpay API request failed");
            BillingError::ProviderError(e.to_string())
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %error_body, "Razorpay API error");
            return Err(BillingError::ProviderError(format!(
                "Razorpay API error: {status}"
            )));
        }

        response.json::<T>().await.map_err(|e| {
            error!(error = %e, "Failed to parse Razorpay response");
            BillingError::ProviderError(format!("invalid Razorpay response: {e}"))
        })
    }
}

#[async_trait]
impl PaymentProvider for RazorpayProvider {
    #[instrument(skip(self, request), fields(receipt = %request.receipt, amount = request.amount))]
    async fn create_order(&self, request: &OrderRequest) -> Result<ProviderOrder, BillingError> {
        debug!("Creating Razorpay order");

        self.razorpay_request(reqwest::Method::POST, "/orders", Some(request))
            .await
    }

    fn key_id(&self) -> &str {
        &self.key_id
    }
}

impl std::fmt::Debug for RazorpayProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RazorpayProvider")
            .field("key_id", &self.key_id)
            .field("api_base", &self.api_base)
            .finish_non_exhaustive()
    }
}
