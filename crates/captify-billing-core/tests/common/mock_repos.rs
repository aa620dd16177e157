//! Mock repositories for testing
//!
//! Every mutation goes through a single `DashMap` entry, which holds the shard
//! lock for the duration of the closure, so check-and-update is atomic like
//! the SQL upserts.

use captify_db::{
    CompletePaymentOrder, CreatePaymentOrder, CreateSubscription, DailyUsageRow, DbError,
    DbResult, PaymentOrderRow, PaymentRepository, Stores, SubscriptionRepository, SubscriptionRow,
    UsageRepository,
};
use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use uuid::Uuid;

fn unavailable() -> DbError {
    DbError::Sqlx(sqlx::Error::PoolTimedOut)
}

/// In-memory daily usage repository for testing
#[derive(Default, Clone)]
pub struct MockUsageRepository {
    rows: Arc<DashMap<(Uuid, NaiveDate), DailyUsageRow>>,
    fail_commits: Arc<AtomicBool>,
    fail_releases: Arc<AtomicBool>,
    fail_reads: Arc<AtomicBool>,
}

impl MockUsageRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a completed count for a day
    pub fn set_count(&self, user_id: Uuid, usage_date: NaiveDate, count: i32) {
        let mut row = self
            .rows
            .entry((user_id, usage_date))
            .or_insert_with(|| empty_row(user_id, usage_date));
        row.generation_count = count;
    }

    /// Current row for a day
    pub fn row(&self, user_id: Uuid, usage_date: NaiveDate) -> Option<DailyUsageRow> {
        self.rows.get(&(user_id, usage_date)).map(|r| r.value().clone())
    }

    /// Make commit and increment fail
    pub fn fail_commits(&self, fail: bool) {
        self.fail_commits.store(fail, Ordering::SeqCst);
    }

    /// Make release fail
    pub fn fail_releases(&self, fail: bool) {
        self.fail_releases.store(fail, Ordering::SeqCst);
    }

    /// Make get fail
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Pretend the row was last written `age` ago
    pub fn backdate(&self, user_id: Uuid, usage_date: NaiveDate, age: Duration) {
        if let Some(mut row) = self.rows.get_mut(&(user_id, usage_date)) {
            row.updated_at = Utc::now() - age;
        }
    }
}

fn empty_row(user_id: Uuid, usage_date: NaiveDate) -> DailyUsageRow {
    DailyUsageRow {
        user_id,
        usage_date,
        generation_count: 0,
        in_flight: 0,
        updated_at: Utc::now(),
    }
}

#[async_trait]
impl UsageRepository for MockUsageRepository {
    async fn get(&self, user_id: Uuid, usage_date: NaiveDate) -> DbResult<Option<DailyUsageRow>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        Ok(self.row(user_id, usage_date))
    }

    async fn try_reserve(
        &self,
        user_id: Uuid,
        usage_date: NaiveDate,
        limit: i32,
        stale_after_secs: i64,
    ) -> DbResult<Option<DailyUsageRow>> {
        if limit <= 0 {
            return Ok(None);
        }
        let mut row = self
            .rows
            .entry((user_id, usage_date))
            .or_insert_with(|| empty_row(user_id, usage_date));
        let stale = row.updated_at < Utc::now() - Duration::seconds(stale_after_secs);
        let in_flight = if stale { 0 } else { row.in_flight };
        if row.generation_count + in_flight < limit {
            row.in_flight = in_flight + 1;
            row.updated_at = Utc::now();
            Ok(Some(row.clone()))
        } else {
            Ok(None)
        }
    }

    async fn commit_reservation(
        &self,
        user_id: Uuid,
        usage_date: NaiveDate,
    ) -> DbResult<DailyUsageRow> {
        if self.fail_commits.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        let mut row = self
            .rows
            .get_mut(&(user_id, usage_date))
            .ok_or(DbError::NotFound)?;
        row.generation_count += 1;
        row.in_flight = (row.in_flight - 1).max(0);
        row.updated_at = Utc::now();
        Ok(row.clone())
    }

    async fn release_reservation(&self, user_id: Uuid, usage_date: NaiveDate) -> DbResult<()> {
        if self.fail_releases.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        if let Some(mut row) = self.rows.get_mut(&(user_id, usage_date)) {
            row.in_flight = (row.in_flight - 1).max(0);
            row.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn increment(&self, user_id: Uuid, usage_date: NaiveDate) -> DbResult<DailyUsageRow> {
        if self.fail_commits.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        let mut row = self
            .rows
            .entry((user_id, usage_date))
            .or_insert_with(|| empty_row(user_id, usage_date));
        row.generation_count += 1;
        row.updated_at = Utc::now();
        Ok(row.clone())
    }
}

/// In-memory subscription repository for testing
#[derive(Default, Clone)]
pub struct MockSubscriptionRepository {
    subs: Arc<DashMap<Uuid, SubscriptionRow>>,
    fail_creates: Arc<AtomicBool>,
    fail_reads: Arc<AtomicBool>,
}

impl MockSubscriptionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an active subscription directly
    pub fn insert_active(
        &self,
        user_id: Uuid,
        tier: &str,
        started_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Uuid {
        let id = Uuid::new_v4();
        self.subs.insert(
            id,
            SubscriptionRow {
                id,
                user_id,
                tier: tier.to_string(),
                status: "active".to_string(),
                started_at,
                expires_at: Some(expires_at),
                payment_reference: None,
                provider_order_id: None,
                created_at: started_at,
            },
        );
        id
    }

    /// All subscriptions of a user
    pub fn for_user(&self, user_id: Uuid) -> Vec<SubscriptionRow> {
        self.subs
            .iter()
            .filter(|r| r.user_id == user_id)
            .map(|r| r.value().clone())
            .collect()
    }

    /// Make create fail
    pub fn fail_creates(&self, fail: bool) {
        self.fail_creates.store(fail, Ordering::SeqCst);
    }

    /// Make find_effective fail
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl SubscriptionRepository for MockSubscriptionRepository {
    async fn find_effective(
        &self,
        user_id: Uuid,
        at: DateTime<Utc>,
    ) -> DbResult<Option<SubscriptionRow>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        Ok(self
            .subs
            .iter()
            .filter(|r| {
                r.user_id == user_id
                    && r.status == "active"
                    && r.expires_at.is_some_and(|exp| exp > at)
            })
            .max_by_key(|r| (r.started_at, r.created_at))
            .map(|r| r.value().clone()))
    }

    async fn create(&self, sub: CreateSubscription) -> DbResult<SubscriptionRow> {
        if self.fail_creates.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        let row = SubscriptionRow {
            id: sub.id,
            user_id: sub.user_id,
            tier: sub.tier,
            status: "active".to_string(),
            started_at: sub.started_at,
            expires_at: sub.expires_at,
            payment_reference: sub.payment_reference,
            provider_order_id: sub.provider_order_id,
            created_at: Utc::now(),
        };
        self.subs.insert(row.id, row.clone());
        Ok(row)
    }
}

/// In-memory payment history repository for testing
#[derive(Default, Clone)]
pub struct MockPaymentRepository {
    orders: Arc<DashMap<String, PaymentOrderRow>>,
    fail_creates: Arc<AtomicBool>,
}

impl MockPaymentRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Order by provider order ID
    pub fn order(&self, provider_order_id: &str) -> Option<PaymentOrderRow> {
        self.orders.get(provider_order_id).map(|r| r.value().clone())
    }

    /// Number of recorded orders
    pub fn len(&self) -> usize {
        self.orders.len()
    }

    /// Make create fail
    pub fn fail_creates(&self, fail: bool) {
        self.fail_creates.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl PaymentRepository for MockPaymentRepository {
    async fn create(&self, order: CreatePaymentOrder) -> DbResult<PaymentOrderRow> {
        if self.fail_creates.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        let row = PaymentOrderRow {
            id: order.id,
            user_id: order.user_id,
            amount: order.amount,
            currency: order.currency,
            tier: order.tier,
            duration_months: order.duration_months,
            receipt: order.receipt,
            provider_order_id: order.provider_order_id,
            status: "pending".to_string(),
            provider_payment_id: None,
            provider_signature: None,
            created_at: Utc::now(),
        };
        self.orders.insert(row.provider_order_id.clone(), row.clone());
        Ok(row)
    }

    async fn find_by_provider_order_id(
        &self,
        user_id: Uuid,
        provider_order_id: &str,
    ) -> DbResult<Option<PaymentOrderRow>> {
        Ok(self
            .order(provider_order_id)
            .filter(|o| o.user_id == user_id))
    }

    async fn complete(&self, completion: CompletePaymentOrder) -> DbResult<bool> {
        match self.orders.get_mut(&completion.provider_order_id) {
            Some(mut order)
                if order.user_id == completion.user_id && order.status == "pending" =>
            {
                order.status = completion.status;
                order.provider_payment_id = Some(completion.provider_payment_id);
                order.provider_signature = Some(completion.provider_signature);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn list_by_user_id(&self, user_id: Uuid, limit: i64) -> DbResult<Vec<PaymentOrderRow>> {
        let mut orders: Vec<_> = self
            .orders
            .iter()
            .filter(|r| r.user_id == user_id)
            .map(|r| r.value().clone())
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        orders.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(orders)
    }
}

/// Mock repositories plus the `Stores` view over them
#[derive(Default, Clone)]
pub struct MockStores {
    pub usage: MockUsageRepository,
    pub subscriptions: MockSubscriptionRepository,
    pub payments: MockPaymentRepository,
}

impl MockStores {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stores(&self) -> Stores {
        Stores::new(
            Arc::new(self.usage.clone()),
            Arc::new(self.subscriptions.clone()),
            Arc::new(self.payments.clone()),
        )
    }
}
