//! Async seams between the reconciliation driver and the outside world.
//!
//! Production implementations live in `stackmon-aws` and
//! `stackmon-vendor`; tests substitute in-memory fakes.

use async_trait::async_trait;

use crate::credentials::Credentials;
use crate::error::{MonitorError, SourceError};
use crate::types::{NewTest, RemoteTest};

/// Where raw infrastructure state comes from.
#[async_trait]
pub trait StateSource: Send + Sync {
    /// Fetch the object at `bucket`/`key` as text.
    async fn fetch_state(&self, bucket: &str, key: &str) -> Result<String, SourceError>;
}

/// Where vendor credentials come from.
///
/// Failures are logged by the implementation and reported as `None`;
/// a run without credentials skips every vendor call.
#[async_trait]
pub trait CredentialSource: Send + Sync {
    async fn credentials(&self) -> Option<Credentials>;
}

/// The monitoring vendor's test inventory.
#[async_trait]
pub trait MonitorApi: Send + Sync {
    /// Every test the account holds.
    async fn list_tests(&self) -> Result<Vec<RemoteTest>, MonitorError>;

    async fn create_test(&self, test: &NewTest) -> Result<(), MonitorError>;

    async fn delete_test(&self, test: &RemoteTest) -> Result<(), MonitorError>;
}
