//! PostgreSQL subscription repository implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::DbResult;
use crate::models::SubscriptionRow;
use crate::repo::{CreateSubscription, SubscriptionRepository};

/// PostgreSQL subscription repository
#[derive(Clone)]
pub struct PgSubscriptionRepository {
    pool: PgPool,
}

impl PgSubscriptionRepository {
    /// Create a new subscription repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SubscriptionRepository for PgSubscriptionRepository {
    async fn find_effective(
        &self,
        user_id: Uuid,
        at: DateTime<Utc>,
    ) -> DbResult<Option<SubscriptionRow>> {
        let sub = sqlx::query_as::<_, SubscriptionRow>(
            r#"
            SELECT id, user_id, tier, status, started_at, expires_at,
                   payment_reference, provider_order_id, created_at
            FROM subscriptions
            WHERE user_id = $1 AND status = 'active' AND expires_at > $2
            ORDER BY started_at DESC, created_at DESC
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .bind(at)
        .fetch_optional(&self.pool)
        .await?;

        Ok(sub)
    }

    async fn create(&self, sub: CreateSubscription) -> DbResult<SubscriptionRow> {
        let row = sqlx::query_as::<_, SubscriptionRow>(
            r#"
            INSERT INTO subscriptions (id, user_id, tier, status, started_at, expires_at,
                                       payment_reference, provider_order_id)
            VALUES ($1, $2, $3, 'active', $4, $5, $6, $7)
            RETURNING id, user_id, tier, status, started_at, expires_at,
                      payment_reference, provider_order_id, created_at
            "#,
        )
        .bind(sub.id)
        .bind(sub.user_id)
        .bind(&sub.tier)
        .bind(sub.started_at)
        .bind(sub.expires_at)
        .bind(&sub.payment_reference)
        .bind(&sub.provider_order_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }
}
