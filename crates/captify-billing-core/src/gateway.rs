//! Quota-gated caption generation
//!
//! Freemium generations reserve a slot before the oracle is called and
//! commit or release it afterwards, so concurrent requests can never admit
//! more than the remaining quota. Paid generations are counted after the
//! oracle succeeds.
//!
//! A reservation that is never committed or released (failed release, process
//! stopped mid-call) stops holding its slot once the usage row has been idle
//! for the reservation TTL.

use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, Utc};
use tracing::{debug, error, info, instrument, warn, Instrument};

use captify_db::Stores;
use captify_types::{QuotaSnapshot, UserId};

use crate::entitlement::EntitlementResolver;
use crate::error::BillingError;
use crate::oracle::{CaptionOracle, GeneratedContent, GenerationRequest};

/// Result of a successful gated generation
#[derive(Debug, Clone)]
pub struct GenerationOutcome {
    /// Oracle output
    pub content: GeneratedContent,
    /// Entitlement after this generation was counted
    pub usage: QuotaSnapshot,
}

/// How a request was let through the gate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Admission {
    /// Holds one freemium reservation
    Reserved,
    /// Paid tier, counted after success
    Unmetered,
}

/// Runs the oracle only for users with quota left, and counts what it produces
#[derive(Clone)]
pub struct GenerationGateway {
    resolver: EntitlementResolver,
    stores: Stores,
    oracle: Arc<dyn CaptionOracle>,
    reservation_ttl: Duration,
}

const DEFAULT_RESERVATION_TTL: Duration = Duration::from_secs(120);

impl GenerationGateway {
    /// Create a new gateway
    pub fn new(resolver: EntitlementResolver, stores: Stores, oracle: Arc<dyn CaptionOracle>) -> Self {
        Self {
            resolver,
            stores,
            oracle,
            reservation_ttl: DEFAULT_RESERVATION_TTL,
        }
    }

    /// Set how long an unfinished reservation holds its slot
    pub fn with_reservation_ttl(mut self, ttl: Duration) -> Self {
        self.reservation_ttl = ttl;
        self
    }

    /// Generate captions if the user's entitlement allows it.
    ///
    /// Rejected requests never reach the oracle. Once admitted, the oracle
    /// call and its accounting run on a separate task and finish even if the
    /// caller goes away.
    #[instrument(skip(self, request), fields(user_id = %user_id))]
    pub async fn perform_gated_generation(
        &self,
        user_id: UserId,
        request: GenerationRequest,
    ) -> Result<GenerationOutcome, BillingError> {
        let request = request.normalized();
        request.validate()?;

        let now = Utc::now();
        let snapshot = self.resolver.resolve_quota(&user_id, now).await?;
        let date = self.resolver.usage_date(now);

        let admission = self.admit(&user_id, date, &snapshot).await?;
        debug!(tier = %snapshot.tier, ?admission, "Generation admitted");

        let this = self.clone();
        let task = tokio::spawn(
            async move {
                this.generate_and_account(user_id, date, snapshot, admission, request)
                    .await
            }
            .in_current_span(),
        );

        task.await.map_err(|e| {
            error!(error = %e, "Generation task failed");
            BillingError::Internal(format!("generation task failed: {e}"))
        })?
    }

    async fn admit(
        &self,
        user_id: &UserId,
        date: NaiveDate,
        snapshot: &QuotaSnapshot,
    ) -> Result<Admission, BillingError> {
        if snapshot.tier.is_paid() {
            return Ok(Admission::Unmetered);
        }

        let limit = self.resolver.freemium_limit();
        let exceeded = BillingError::QuotaExceeded {
            tier: snapshot.tier,
            daily_limit: limit,
        };

        if snapshot.is_exhausted() {
            info!(used_today = snapshot.used_today, "Daily quota exhausted");
            return Err(exceeded);
        }

        let cap = i32::try_from(limit).unwrap_or(i32::MAX);
        let stale_after = i64::try_from(self.reservation_ttl.as_secs()).unwrap_or(i64::MAX);
        match self
            .stores
            .usage
            .try_reserve(user_id.0, date, cap, stale_after)
            .await?
        {
            Some(_) => Ok(Admission::Reserved),
            None => {
                info!("Daily quota taken by concurrent requests");
                Err(exceeded)
            }
        }
    }

    async fn generate_and_account(
        &self,
        user_id: UserId,
        date: NaiveDate,
        snapshot: QuotaSnapshot,
        admission: Admission,
        request: GenerationRequest,
    ) -> Result<GenerationOutcome, BillingError> {
        // Past the TTL the slot may already be reclaimed, so the call is not counted
        let generated = tokio::time::timeout(self.reservation_ttl, self.oracle.generate(&request))
            .await
            .unwrap_or_else(|_| {
                Err(BillingError::OracleError(
                    "caption generation timed out".to_string(),
                ))
            });

        let content = match generated {
            Ok(content) => content,
            Err(e) => {
                warn!(error = %e, "Oracle call failed");
                if admission == Admission::Reserved {
                    if let Err(release) = self.stores.usage.release_reservation(user_id.0, date).await {
                        error!(
                            error = %release,
                            reconciliation = true,
                            usage_date = %date,
                            "Failed to release quota reservation"
                        );
                    }
                }
                return Err(e);
            }
        };

        let counted = match admission {
            Admission::Reserved => self.stores.usage.commit_reservation(user_id.0, date).await,
            Admission::Unmetered => self.stores.usage.increment(user_id.0, date).await,
        };

        let used_today = match counted {
            Ok(row) => row.used(),
            Err(e) => {
                error!(
                    error = %e,
                    reconciliation = true,
                    usage_date = %date,
                    "Failed to record generation usage"
                );
                snapshot.used_today.saturating_add(1)
            }
        };

        let usage = QuotaSnapshot::new(snapshot.tier, self.resolver.freemium_limit(), used_today);
        info!(tier = %usage.tier, used_today, "Generation completed");

        Ok(GenerationOutcome { content, usage })
    }
}

impl std::fmt::Debug for GenerationGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenerationGateway")
            .field("resolver", &self.resolver)
            .field("reservation_ttl", &self.reservation_ttl)
            .finish_non_exhaustive()
    }
}
