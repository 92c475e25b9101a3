//! In-memory `ServiceSpecStore`/`ResultSink`, for tests and zero-dependency
//! runs — mirrors the teacher's in-memory `StorageActor` fallback mode.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::{HealthcheckResult, ServiceId, ServiceLatest, ServiceSpec};

use super::{ResultSink, ServiceSpecStore, StoreResult};

#[derive(Clone, Default)]
pub struct MemoryStore {
    specs: Arc<RwLock<HashMap<ServiceId, ServiceSpec>>>,
    latest: Arc<RwLock<HashMap<ServiceId, ServiceLatest>>>,
    results: Arc<RwLock<Vec<HealthcheckResult>>>,
}

impl MemoryStore {
    pub fn new(specs: Vec<ServiceSpec>) -> Self {
        let specs = specs.into_iter().map(|s| (s.id, s)).collect();
        Self {
            specs: Arc::new(RwLock::new(specs)),
            latest: Arc::new(RwLock::new(HashMap::new())),
            results: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub async fn upsert_spec(&self, spec: ServiceSpec) {
        self.specs.write().await.insert(spec.id, spec);
    }

    pub async fn all_results(&self) -> Vec<HealthcheckResult> {
        self.results.read().await.clone()
    }
}

#[async_trait]
impl ServiceSpecStore for MemoryStore {
    async fn list_all(&self) -> StoreResult<Vec<ServiceSpec>> {
        Ok(self.specs.read().await.values().cloned().collect())
    }
}

#[async_trait]
impl ResultSink for MemoryStore {
    async fn record(&self, result: HealthcheckResult) -> StoreResult<()> {
        self.results.write().await.push(result);
        Ok(())
    }

    async fn update_latest(&self, service_id: ServiceId, latest: ServiceLatest) -> StoreResult<()> {
        self.latest.write().await.insert(service_id, latest);
        Ok(())
    }

    async fn set_checking(&self, service_id: ServiceId) -> StoreResult<()> {
        let mut latest = self.latest.write().await;
        latest.entry(service_id).or_default().status = crate::domain::ServiceStatus::Checking;
        Ok(())
    }

    async fn get_latest(&self, service_id: ServiceId) -> StoreResult<Option<ServiceLatest>> {
        Ok(self.latest.read().await.get(&service_id).copied())
    }
}
