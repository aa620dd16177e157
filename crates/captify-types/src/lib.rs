//! Captify Types - Shared domain types
//!
//! This crate contains domain types used across Captify crates:
//! - User identity
//! - Subscription tiers and the price schedule
//! - Subscriptions and payment orders
//! - Daily usage and quota snapshots

pub mod error;
pub mod payment;
pub mod subscription;
pub mod tier;
pub mod usage;
pub mod user;

pub use error::*;
pub use payment::*;
pub use subscription::*;
pub use tier::*;
pub use usage::*;
pub use user::*;
