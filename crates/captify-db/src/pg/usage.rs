//! PostgreSQL daily usage repository implementation

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::models::DailyUsageRow;
use crate::repo::UsageRepository;

/// PostgreSQL daily usage repository
#[derive(Clone)]
pub struct PgUsageRepository {
    pool: PgPool,
}

impl PgUsageRepository {
    /// Create a new usage repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UsageRepository for PgUsageRepository {
    async fn get(&self, user_id: Uuid, usage_date: NaiveDate) -> DbResult<Option<DailyUsageRow>> {
        let usage = sqlx::query_as::<_, DailyUsageRow>(
            r#"
            SELECT user_id, usage_date, generation_count, in_flight, updated_at
            FROM daily_usage
            WHERE user_id = $1 AND usage_date = $2
            "#,
        )
        .bind(user_id)
        .bind(usage_date)
        .fetch_optional(&self.pool)
        .await?;

        Ok(usage)
    }

    async fn try_reserve(
        &self,
        user_id: Uuid,
        usage_date: NaiveDate,
        limit: i32,
        stale_after_secs: i64,
    ) -> DbResult<Option<DailyUsageRow>> {
        // The insert branch would bypass the WHERE clause below
        if limit <= 0 {
            return Ok(None);
        }

        // The conflict branch locks the row and re-evaluates the cap against
        // the latest committed counts, so concurrent callers serialize here.
        // Every reservation bumps updated_at, so an idle row holds only
        // abandoned reservations.
        let usage = sqlx::query_as::<_, DailyUsageRow>(
            r#"
            INSERT INTO daily_usage (user_id, usage_date, generation_count, in_flight)
            VALUES ($1, $2, 0, 1)
            ON CONFLICT (user_id, usage_date)
            DO UPDATE SET
                in_flight = CASE
                    WHEN daily_usage.updated_at < NOW() - make_interval(secs => $4) THEN 1
                    ELSE daily_usage.in_flight + 1
                END,
                updated_at = NOW()
            WHERE daily_usage.generation_count + CASE
                    WHEN daily_usage.updated_at < NOW() - make_interval(secs => $4) THEN 0
                    ELSE daily_usage.in_flight
                END < $3
            RETURNING user_id, usage_date, generation_count, in_flight, updated_at
            "#,
        )
        .bind(user_id)
        .bind(usage_date)
        .bind(limit)
        .bind(stale_after_secs as f64)
        .fetch_optional(&self.pool)
        .await?;

        Ok(usage)
    }

    async fn commit_reservation(
        &self,
        user_id: Uuid,
        usage_date: NaiveDate,
    ) -> DbResult<DailyUsageRow> {
        sqlx::query_as::<_, DailyUsageRow>(
            r#"
            UPDATE daily_usage
            SET generation_count = generation_count + 1,
                in_flight = GREATEST(in_flight - 1, 0),
                updated_at = NOW()
            WHERE user_id = $1 AND usage_date = $2
            RETURNING user_id, usage_date, generation_count, in_flight, updated_at
            "#,
        )
        .bind(user_id)
        .bind(usage_date)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(DbError::NotFound)
    }

    async fn release_reservation(&self, user_id: Uuid, usage_date: NaiveDate) -> DbResult<()> {
        sqlx::query(
            r#"
            UPDATE daily_usage
            SET in_flight = GREATEST(in_flight - 1, 0), updated_at = NOW()
            WHERE user_id = $1 AND usage_date = $2
            "#,
        )
        .bind(user_id)
        .bind(usage_date)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn increment(&self, user_id: Uuid, usage_date: NaiveDate) -> DbResult<DailyUsageRow> {
        let usage = sqlx::query_as::<_, DailyUsageRow>(
            r#"
            INSERT INTO daily_usage (user_id, usage_date, generation_count, in_flight)
            VALUES ($1, $2, 1, 0)
            ON CONFLICT (user_id, usage_date)
            DO UPDATE SET generation_count = daily_usage.generation_count + 1, updated_at = NOW()
            RETURNING user_id, usage_date, generation_count, in_flight, updated_at
            "#,
        )
        .bind(user_id)
        .bind(usage_date)
        .fetch_one(&self.pool)
        .await?;

        Ok(usage)
    }
}
