//! Common test utilities for captify-billing-core integration tests

pub mod mock_repos;
pub mod mocks;

#[allow(unused_imports)]
pub use mock_repos::{
    MockPaymentRepository, MockStores, MockSubscriptionRepository, MockUsageRepository,
};
#[allow(unused_imports)]
pub use mocks::{MockOracle, MockProvider, OracleMode};

#[allow(dead_code)]
pub const TEST_KEY_ID: &str = "rzp_test_key";
#[allow(dead_code)]
pub const TEST_KEY_SECRET: &str = "rzp_test_secret_value";
