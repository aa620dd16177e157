//! PostgreSQL payment history repository implementation

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::DbResult;
use crate::models::PaymentOrderRow;
use crate::repo::{CompletePaymentOrder, CreatePaymentOrder, PaymentRepository};

/// PostgreSQL payment history repository
#[derive(Clone)]
pub struct PgPaymentRepository {
    pool: PgPool,
}

impl PgPaymentRepository {
    /// Create a new payment repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PaymentRepository for PgPaymentRepository {
    async fn create(&self, order: CreatePaymentOrder) -> DbResult<PaymentOrderRow> {
        let row = sqlx::query_as::<_, PaymentOrderRow>(
            r#"
            INSERT INTO payment_history (id, user_id, amount, currency, tier, duration_months,
                                         receipt, provider_order_id, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 'pending')
            RETURNING id, user_id, amount, currency, tier, duration_months, receipt,
                      provider_order_id, status, provider_payment_id, provider_signature,
                      created_at
            "#,
        )
        .bind(order.id)
        .bind(order.user_id)
        .bind(order.amount)
        .bind(&order.currency)
        .bind(&order.tier)
        .bind(order.duration_months)
        .bind(&order.receipt)
        .bind(&order.provider_order_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    async fn find_by_provider_order_id(
        &self,
        user_id: Uuid,
        provider_order_id: &str,
    ) -> DbResult<Option<PaymentOrderRow>> {
        let order = sqlx::query_as::<_, PaymentOrderRow>(
            r#"
            SELECT id, user_id, amount, currency, tier, duration_months, receipt,
                   provider_order_id, status, provider_payment_id, provider_signature,
                   created_at
            FROM payment_history
            WHERE user_id = $1 AND provider_order_id = $2
            "#,
        )
        .bind(user_id)
        .bind(provider_order_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(order)
    }

    async fn complete(&self, completion: CompletePaymentOrder) -> DbResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE payment_history
            SET status = $3, provider_payment_id = $4, provider_signature = $5, updated_at = NOW()
            WHERE user_id = $1 AND provider_order_id = $2 AND status = 'pending'
            "#,
        )
        .bind(completion.user_id)
        .bind(&completion.provider_order_id)
        .bind(&completion.status)
        .bind(&completion.provider_payment_id)
        .bind(&completion.provider_signature)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn list_by_user_id(&self, user_id: Uuid, limit: i64) -> DbResult<Vec<PaymentOrderRow>> {
        let orders = sqlx::query_as::<_, PaymentOrderRow>(
            r#"
            SELECT id, user_id, amount, currency, tier, duration_months, receipt,
                   provider_order_id, status, provider_payment_id, provider_signature,
                   created_at
            FROM payment_history
            WHERE user_id = $1
            ORDER BY created_at DESC
            LIMIT $2
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(orders)
    }
}
