//! Scheduler & Engine — drives timely probe dispatch (§4.1, §5).
//!
//! Ticks centrally on a fixed period, unlike the teacher's self-ticking
//! per-service actors; each stale service becomes one bounded-concurrency
//! Probe Runner dispatch, guarded by a busy set so a slow probe can't
//! overlap with itself on the next tick (invariant 4).

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{RwLock, Semaphore};
use tokio::time::interval;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, instrument, warn};

use crate::domain::{ServiceId, ServiceSpec};
use crate::hub::Hub;
use crate::runner;
use crate::store::{ResultSink, ServiceSpecStore};

const DEFAULT_TICK_SECS: u64 = 5;
const DEFAULT_MAX_CONCURRENT_PROBES: usize = 64;

pub struct Scheduler {
    spec_store: Arc<dyn ServiceSpecStore>,
    sink: Arc<dyn ResultSink>,
    hub: Arc<Hub>,
    tick_period: Duration,
    semaphore: Arc<Semaphore>,
    semaphore_capacity: u32,
    busy: Arc<RwLock<HashSet<ServiceId>>>,
    cancel: CancellationToken,
}

impl Scheduler {
    pub fn new(
        spec_store: Arc<dyn ServiceSpecStore>,
        sink: Arc<dyn ResultSink>,
        hub: Arc<Hub>,
        tick_secs: Option<u64>,
        max_concurrent_probes: Option<usize>,
    ) -> Self {
        let capacity = max_concurrent_probes.unwrap_or(DEFAULT_MAX_CONCURRENT_PROBES);
        Self {
            spec_store,
            sink,
            hub,
            tick_period: Duration::from_secs(tick_secs.unwrap_or(DEFAULT_TICK_SECS)),
            semaphore: Arc::new(Semaphore::new(capacity)),
            semaphore_capacity: capacity as u32,
            busy: Arc::new(RwLock::new(HashSet::new())),
            cancel: CancellationToken::new(),
        }
    }

    /// Start the tick loop in the background. Returns a handle that
    /// `stop()` awaits for a clean shutdown.
    pub fn start(self: Arc<Self>) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move { self.run().await })
    }

    /// Cancel the tick loop and let in-flight probes finish. Synchronous
    /// from the caller's perspective: only returns once the scheduler is
    /// quiesced.
    pub async fn stop(&self, handle: tokio::task::JoinHandle<()>) {
        self.cancel.cancel();
        if let Err(e) = handle.await {
            warn!("scheduler task join failed: {e}");
        }
    }

    async fn run(self: Arc<Self>) {
        let mut ticker = interval(self.tick_period);
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.tick().await;
                }
                _ = self.cancel.cancelled() => {
                    debug!("scheduler: cancellation observed, draining in-flight probes");
                    // Acquiring the full original capacity blocks until every
                    // in-flight probe has released its permit, regardless of
                    // how many were free at the moment of cancellation.
                    let _ = self.semaphore.acquire_many(self.semaphore_capacity).await;
                    break;
                }
            }
        }
    }

    #[instrument(skip(self))]
    async fn tick(self: &Arc<Self>) {
        let specs = match self.spec_store.list_all().await {
            Ok(specs) => specs,
            Err(e) => {
                error!("scheduler: store read failed, skipping tick: {e}");
                return;
            }
        };

        for spec in specs {
            if !self.should_check(&spec).await {
                continue;
            }

            {
                let mut busy = self.busy.write().await;
                if busy.contains(&spec.id) {
                    debug!(service_id = spec.id, "scheduler: service busy, skipping this tick");
                    continue;
                }
                busy.insert(spec.id);
            }

            let this = Arc::clone(self);
            let spec = spec.clone();
            let permit = match Arc::clone(&self.semaphore).acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => {
                    this.busy.write().await.remove(&spec.id);
                    continue;
                }
            };

            tokio::spawn(async move {
                let service_id = spec.id;
                let result = tokio::spawn({
                    let sink = this.sink.clone();
                    let hub = this.hub.clone();
                    async move { runner::run_once(&spec, &sink, &hub).await }
                })
                .await;

                if let Err(e) = result {
                    error!(service_id, "probe task panicked: {e}");
                }

                this.busy.write().await.remove(&service_id);
                drop(permit);
            });
        }
    }

    /// §4.1 `shouldCheck`: host present, path present where required,
    /// interval elapsed or never checked.
    async fn should_check(&self, spec: &ServiceSpec) -> bool {
        if spec.host.is_empty() {
            return false;
        }

        if spec.config.requires_path() && !path_non_empty(spec) {
            return false;
        }

        let latest = match self.sink.get_latest(spec.id).await {
            Ok(latest) => latest,
            Err(e) => {
                warn!(service_id = spec.id, "failed to read ServiceLatest: {e}");
                return false;
            }
        };

        match latest.and_then(|l| l.last_checked_at) {
            None => true,
            Some(last_checked_at) => {
                let elapsed = Utc::now().signed_duration_since(last_checked_at);
                elapsed.num_seconds() >= spec.polling_interval_secs as i64
            }
        }
    }
}

fn path_non_empty(spec: &ServiceSpec) -> bool {
    use crate::domain::ProbeConfig::*;
    match &spec.config {
        Http(cfg) | Https(cfg) => !cfg.healthcheck_path.is_empty(),
        WebSocket(cfg) | WebSocketSecure(cfg) => !cfg.healthcheck_path.is_empty(),
        Grpc(cfg) => !cfg.healthcheck_path.is_empty(),
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{HttpProbeConfig, ProbeConfig, TcpProbeConfig};
    use crate::store::memory::MemoryStore;
    use std::collections::HashMap;

    fn tcp_spec(id: ServiceId) -> ServiceSpec {
        ServiceSpec {
            id,
            host: "127.0.0.1".to_string(),
            port: Some(1),
            polling_interval_secs: 30,
            timeout_secs: 1,
            config: ProbeConfig::Tcp(TcpProbeConfig::default()),
        }
    }

    fn http_spec_missing_path(id: ServiceId) -> ServiceSpec {
        ServiceSpec {
            id,
            host: "127.0.0.1".to_string(),
            port: Some(80),
            polling_interval_secs: 30,
            timeout_secs: 1,
            config: ProbeConfig::Http(HttpProbeConfig {
                healthcheck_path: String::new(),
                http_method: Default::default(),
                headers: HashMap::new(),
                body: None,
                ssl_verify: false,
                follow_redirects: false,
                expected_status: 200,
                status_mapping: HashMap::new(),
            }),
        }
    }

    fn scheduler(store: Arc<MemoryStore>) -> Scheduler {
        let hub = Hub::new(10);
        Scheduler::new(store.clone(), store, hub, Some(5), Some(4))
    }

    #[tokio::test]
    async fn should_check_true_when_never_checked() {
        let store = Arc::new(MemoryStore::new(vec![]));
        let sched = scheduler(store);
        assert!(sched.should_check(&tcp_spec(1)).await);
    }

    #[tokio::test]
    async fn should_check_false_when_path_required_and_missing() {
        let store = Arc::new(MemoryStore::new(vec![]));
        let sched = scheduler(store);
        assert!(!sched.should_check(&http_spec_missing_path(1)).await);
    }

    #[tokio::test]
    async fn should_check_false_before_interval_elapses() {
        let store = Arc::new(MemoryStore::new(vec![]));
        store
            .update_latest(
                1,
                crate::domain::ServiceLatest {
                    status: crate::domain::ServiceStatus::Alive,
                    last_checked_at: Some(Utc::now()),
                },
            )
            .await
            .unwrap();
        let sched = scheduler(store);
        assert!(!sched.should_check(&tcp_spec(1)).await);
    }
}
