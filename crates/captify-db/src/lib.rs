//! Captify DB - Database abstractions
//!
//! SQLx-based persistence for daily usage counters, subscriptions and
//! payment history.
//!
//! # Example
//!
//! ```rust,ignore
//! use captify_db::{create_pool, run_migrations, Repositories, Stores};
//!
//! let pool = create_pool("postgres://localhost/captify").await?;
//! run_migrations(&pool).await?;
//! let stores = Stores::from(Repositories::new(pool));
//!
//! // Atomically reserve one of three daily generations
//! let row = stores.usage.try_reserve(user_id, today, 3, 120).await?;
//! ```

pub mod error;
pub mod models;
pub mod pg;
pub mod pool;
pub mod repo;
pub mod stores;

pub use error::{DbError, DbResult};
pub use models::*;
pub use pg::Repositories;
pub use pool::{create_pool, create_pool_with_options, run_migrations, DbPool, PoolOptions};
pub use repo::*;
pub use stores::Stores;
