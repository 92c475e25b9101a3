//! Probe Runner — executes one probe dispatch and persists its outcome
//! (§4.2). A free function rather than a long-lived actor: unlike the
//! teacher's self-ticking `ServiceMonitorActor`, the Scheduler ticks
//! centrally and dispatches one-shot runner invocations per stale service.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tracing::{instrument, warn};

use crate::classify::classify;
use crate::domain::{HealthcheckResult, ServiceLatest, ServiceSpec, ServiceStatus, StatusUpdate};
use crate::hub::Hub;
use crate::probes;
use crate::store::ResultSink;

/// Run the 8-step probe-runner algorithm for one service.
#[instrument(skip(spec, sink, hub), fields(service_id = spec.id, method = spec.config.tag()))]
pub async fn run_once(spec: &ServiceSpec, sink: &Arc<dyn ResultSink>, hub: &Arc<Hub>) {
    // 1. Flip to a transient Checking status without disturbing the
    // previously recorded lastCheckedAt (Invariant 2: monotonic non-decreasing).
    if let Err(e) = sink.set_checking(spec.id).await {
        warn!("failed to record Checking status: {e}");
    }
    hub.publish(StatusUpdate {
        service_id: spec.id,
        status: ServiceStatus::Checking,
        timestamp: Utc::now(),
    })
    .await;

    // 2-3. Time and invoke the probe.
    let start = Instant::now();
    let outcome = probes::run(spec).await;
    let latency_ms = start.elapsed().as_millis() as u64;

    // 5. Derive the terminal status.
    let status = classify(spec, &outcome);

    // 6. Persist the result, best-effort.
    let checked_at = Utc::now();
    let result = HealthcheckResult {
        service_id: spec.id,
        status,
        status_code: outcome.status_code,
        latency_ms,
        error: outcome.error.clone(),
        checked_at,
    };
    if let Err(e) = sink.record(result).await {
        warn!("failed to persist healthcheck result: {e}");
    }

    // 7. Update ServiceLatest; must succeed, retry once, then abandon.
    let latest = ServiceLatest {
        status,
        last_checked_at: Some(checked_at),
    };
    if let Err(e) = sink.update_latest(spec.id, latest).await {
        warn!("failed to update ServiceLatest, retrying once: {e}");
        if let Err(e) = sink.update_latest(spec.id, latest).await {
            warn!("retry failed too, abandoning this tick: {e}");
        }
    }

    // 8. Publish the terminal StatusUpdate, non-blocking.
    hub.publish(StatusUpdate {
        service_id: spec.id,
        status,
        timestamp: checked_at,
    })
    .await;
}
