//! Payment provider abstraction

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::BillingError;

/// Payment provider trait
///
/// Abstracts order creation so the order service can run against Razorpay
/// or a test double.
#[async_trait]
pub trait PaymentProvider: Send + Sync {
    /// Create an order the client can pay against
    async fn create_order(&self, request: &OrderRequest) -> Result<ProviderOrder, BillingError>;

    /// Public key ID handed to the checkout client
    fn key_id(&self) -> &str;
}

/// Order creation request sent to the provider
#[derive(Debug, Clone, Serialize)]
pub struct OrderRequest {
    /// Amount in the smallest currency unit
    pub amount: i64,
    /// ISO currency code
    pub currency: String,
    /// Merchant receipt reference
    pub receipt: String,
    /// Free-form metadata stored with the order
    pub notes: OrderNotes,
}

/// Metadata attached to a provider order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderNotes {
    pub user_id: String,
    pub tier: String,
    pub duration_months: String,
}

/// Order as created by the provider
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderOrder {
    /// Provider order ID
    pub id: String,
    /// Amount in the smallest currency unit
    pub amount: i64,
    /// ISO currency code
    pub currency: String,
    /// Merchant receipt reference
    #[serde(default)]
    pub receipt: Option<String>,
    /// Provider-side order status
    #[serde(default)]
    pub status: Option<String>,
}
