//! Storage traits consumed by the engine (§6.1).
//!
//! Split in two, unlike the teacher's single `StorageBackend` trait: the
//! scheduler only ever reads specs, the probe runner only ever writes
//! results, and keeping the traits separate keeps that asymmetry visible
//! at the type level instead of by convention.

use async_trait::async_trait;

use crate::domain::{HealthcheckResult, ServiceId, ServiceLatest, ServiceSpec};

pub mod error;
pub mod memory;
#[cfg(feature = "storage-sqlite")]
pub mod sqlite;

pub use error::{StoreError, StoreResult};

/// Read-only view of the service catalogue, polled once per scheduler tick.
#[async_trait]
pub trait ServiceSpecStore: Send + Sync {
    async fn list_all(&self) -> StoreResult<Vec<ServiceSpec>>;
}

/// Write-only sink for probe results and the latest-status projection.
#[async_trait]
pub trait ResultSink: Send + Sync {
    async fn record(&self, result: HealthcheckResult) -> StoreResult<()>;

    async fn update_latest(&self, service_id: ServiceId, latest: ServiceLatest) -> StoreResult<()>;

    /// Flip `status` to `Checking` without touching `last_checked_at`, so a
    /// probe in flight doesn't clobber the last real check time (Invariant 2).
    async fn set_checking(&self, service_id: ServiceId) -> StoreResult<()>;

    async fn get_latest(&self, service_id: ServiceId) -> StoreResult<Option<ServiceLatest>>;
}
