//! Invariant 4 (§8): successive probes of the same service never overlap —
//! a slow probe still in flight must not be dispatched again on the next
//! tick.

mod helpers;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use guardia_topology::hub::Hub;
use guardia_topology::scheduler::Scheduler;
use guardia_topology::store::memory::MemoryStore;
use tokio::net::TcpListener;

#[tokio::test]
async fn busy_service_is_skipped_until_probe_completes() {
    // A listener that accepts but never responds, so the TCP probe blocks
    // for the full timeout and stays "busy" across several scheduler ticks.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let accepted = Arc::new(AtomicUsize::new(0));
    let accepted_clone = accepted.clone();
    tokio::spawn(async move {
        let mut held = Vec::new();
        loop {
            let (socket, _) = listener.accept().await.unwrap();
            accepted_clone.fetch_add(1, Ordering::SeqCst);
            held.push(socket); // keep the connection open without replying
        }
    });

    let mut spec = helpers::tcp_spec(1, "127.0.0.1".to_string(), port, "PING", "PONG");
    spec.timeout_secs = 2;
    spec.polling_interval_secs = 0; // always eligible, so overlap would show immediately

    let store = Arc::new(MemoryStore::new(vec![spec]));
    let hub = Hub::new(10);
    let scheduler = Arc::new(Scheduler::new(store.clone(), store.clone(), hub, Some(1), Some(4)));

    let handle = scheduler.clone().start();

    // Several ticks happen while the one probe is still in flight (2s timeout).
    tokio::time::sleep(Duration::from_millis(1200)).await;
    scheduler.stop(handle).await;

    // Only one dial should have happened despite multiple elapsed ticks,
    // because the busy-set keeps the service excluded while its probe runs.
    assert_eq!(accepted.load(Ordering::SeqCst), 1);
}
