//! Razorpay payment signature verification

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use tracing::warn;

use crate::error::BillingError;

type HmacSha256 = Hmac<Sha256>;

/// Verifies checkout signatures of the form
/// `hex(HMAC-SHA256(key_secret, "{order_id}|{payment_id}"))`
#[derive(Clone)]
pub struct SignatureVerifier {
    key_secret: String,
}

impl SignatureVerifier {
    /// Create a verifier for a key secret
    pub fn new(key_secret: impl Into<String>) -> Self {
        Self {
            key_secret: key_secret.into(),
        }
    }

    /// Lowercase hex signature for an order/payment pair
    pub fn sign(&self, order_id: &str, payment_id: &str) -> Result<String, BillingError> {
        let mut mac = HmacSha256::new_from_slice(self.key_secret.as_bytes())
            .map_err(|_| BillingError::Internal("HMAC error".to_string()))?;
        mac.update(order_id.as_bytes());
        mac.update(b"|");
        mac.update(payment_id.as_bytes());
        Ok(hex::encode(mac.finalize().into_bytes()))
    }

    /// Check a signature in constant time
    pub fn verify(
        &self,
        order_id: &str,
        payment_id: &str,
        signature: &str,
    ) -> Result<(), BillingError> {
        let expected = self.sign(order_id, payment_id)?;

        if !bool::from(expected.as_bytes().ct_eq(signature.as_bytes())) {
            warn!(order_id = %order_id, "Payment signature verification failed");
            return Err(BillingError::InvalidSignature);
        }

        Ok(())
    }
}

impl std::fmt::Debug for SignatureVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignatureVerifier").finish_non_exhaustive()
    }
}
