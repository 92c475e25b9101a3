//! End-to-end scenarios from the testable-properties section: run a full
//! Probe Runner pass (probe → classify → persist → publish) against a
//! real in-memory store and Hub, rather than unit-testing each stage in
//! isolation.
//!
//! Scenarios 4 (DNS) and 5 (Kafka) exercise the same probe → classify
//! pipeline but go through each protocol's injected backend trait instead
//! of a real resolver/broker, per the no-real-network testing strategy.

mod helpers;

use std::collections::HashMap;
use std::sync::Arc;

use guardia_topology::classify::classify;
use guardia_topology::domain::{
    DnsProbeConfig, DnsQueryType, KafkaProbeConfig, ProbeConfig, ServiceSpec, ServiceStatus, StatusTag,
};
use guardia_topology::hub::Hub;
use guardia_topology::probes::dns::{self, DnsBackend, RecordValue};
use guardia_topology::probes::kafka::{self, KafkaBackend};
use guardia_topology::runner::run_once;
use guardia_topology::store::ResultSink;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn scenario_1_http_happy_path() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/healthz"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let url = url::Url::parse(&server.uri()).unwrap();
    let spec = helpers::http_spec(1, url.host_str().unwrap().to_string(), url.port().unwrap(), 200, HashMap::new());

    let store = helpers::memory_store();
    let sink: Arc<dyn ResultSink> = store.clone();
    let hub = Hub::new(10);
    let (_id, mut rx) = hub.subscribe().await;

    run_once(&spec, &sink, &hub).await;

    let results = store.all_results().await;
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].status, ServiceStatus::Alive);
    assert_eq!(results[0].status_code, Some(200));
    assert!(results[0].error.is_none());

    let latest = store.get_latest(1).await.unwrap().unwrap();
    assert_eq!(latest.status, ServiceStatus::Alive);

    assert_eq!(rx.recv().await.unwrap().status, ServiceStatus::Checking);
    assert_eq!(rx.recv().await.unwrap().status, ServiceStatus::Alive);
}

#[tokio::test]
async fn scenario_2_http_mapped_degraded() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/healthz"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let url = url::Url::parse(&server.uri()).unwrap();
    let mut mapping = HashMap::new();
    mapping.insert("429".to_string(), StatusTag::Degraded);
    let spec = helpers::http_spec(2, url.host_str().unwrap().to_string(), url.port().unwrap(), 200, mapping);

    let store = helpers::memory_store();
    let sink: Arc<dyn ResultSink> = store.clone();
    let hub = Hub::new(10);

    run_once(&spec, &sink, &hub).await;

    let latest = store.get_latest(2).await.unwrap().unwrap();
    assert_eq!(latest.status, ServiceStatus::Degraded);
}

#[tokio::test]
async fn scenario_3_tcp_echo_mismatch() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = vec![0u8; 64];
        let _ = socket.read(&mut buf).await.unwrap();
        socket.write_all(b"HELLO").await.unwrap();
    });

    let spec = helpers::tcp_spec(3, "127.0.0.1".to_string(), port, "PING\r\n", "PONG");

    let store = helpers::memory_store();
    let sink: Arc<dyn ResultSink> = store.clone();
    let hub = Hub::new(10);

    run_once(&spec, &sink, &hub).await;

    let results = store.all_results().await;
    assert_eq!(results[0].status, ServiceStatus::Dead);
    assert!(results[0].error.as_ref().unwrap().contains("expected response"));
}

#[tokio::test]
async fn scenario_6_concurrent_subscribers_slow_one_not_evicted() {
    let hub = Hub::new(4);
    let (_fast_id, mut fast_rx) = hub.subscribe().await;
    let (_slow_id, _slow_rx) = hub.subscribe().await; // never drained

    let reader = tokio::spawn(async move {
        let mut received = Vec::with_capacity(1000);
        while let Some(update) = fast_rx.recv().await {
            received.push(update.service_id);
            if received.len() == 1000 {
                break;
            }
        }
        received
    });

    for i in 0..1000i64 {
        hub.publish(guardia_topology::domain::StatusUpdate {
            service_id: i,
            status: ServiceStatus::Alive,
            timestamp: chrono::Utc::now(),
        })
        .await;
        tokio::task::yield_now().await;
    }

    let received = reader.await.unwrap();
    assert_eq!(received.len(), 1000);
    assert!(received.windows(2).all(|w| w[0] < w[1]), "updates must arrive in publish order");

    // Slow subscriber overflowed silently but was never evicted.
    assert_eq!(hub.subscriber_count().await, 2);
}

struct FakeDnsBackend(Result<Vec<RecordValue>, String>);

#[async_trait::async_trait]
impl DnsBackend for FakeDnsBackend {
    async fn lookup(&self, _host: &str, _query_type: DnsQueryType) -> Result<Vec<RecordValue>, String> {
        self.0.clone()
    }
}

#[tokio::test]
async fn scenario_4_dns_a_record_expected_value_match() {
    let spec = ServiceSpec {
        id: 4,
        host: "example.test".to_string(),
        port: None,
        polling_interval_secs: 30,
        timeout_secs: 2,
        config: ProbeConfig::Dns(DnsProbeConfig {
            dns_query_type: DnsQueryType::A,
            dns_expected_result: Some("203.0.113.10".to_string()),
        }),
    };
    let cfg = match &spec.config {
        ProbeConfig::Dns(c) => c.clone(),
        _ => unreachable!(),
    };
    let backend = FakeDnsBackend(Ok(vec![RecordValue::A("203.0.113.10".to_string())]));

    let outcome = dns::probe_with(&spec, &cfg, &backend).await;
    assert_eq!(classify(&spec, &outcome), ServiceStatus::Alive);
}

struct FakeKafkaBackend {
    reachable: Result<(), String>,
    partition_count: Result<Option<usize>, String>,
}

#[async_trait::async_trait]
impl KafkaBackend for FakeKafkaBackend {
    async fn broker_reachable(&self) -> Result<(), String> {
        self.reachable.clone()
    }

    async fn topic_partition_count(&self, _topic: &str) -> Result<Option<usize>, String> {
        self.partition_count.clone()
    }
}

#[tokio::test]
async fn scenario_5_kafka_topic_missing_is_degraded() {
    let spec = ServiceSpec {
        id: 5,
        host: "broker.test".to_string(),
        port: Some(9092),
        polling_interval_secs: 30,
        timeout_secs: 2,
        config: ProbeConfig::Kafka(KafkaProbeConfig {
            kafka_topic: Some("orders".to_string()),
            kafka_client_id: "probe".to_string(),
        }),
    };
    let cfg = match &spec.config {
        ProbeConfig::Kafka(c) => c.clone(),
        _ => unreachable!(),
    };
    let backend = FakeKafkaBackend {
        reachable: Ok(()),
        partition_count: Ok(None),
    };

    let outcome = kafka::probe_with(&cfg, &backend).await;
    assert_eq!(classify(&spec, &outcome), ServiceStatus::Degraded);
}
