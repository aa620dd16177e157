//! REST API handlers

pub mod account;
pub mod generate;
pub mod hashtags;
pub mod health;
pub mod orders;
pub mod payments;
pub mod shared;

pub use account::*;
pub use generate::*;
pub use hashtags::*;
pub use health::*;
pub use orders::*;
pub use payments::*;
