//! Kafka probe: fetch broker metadata, optionally requiring a topic to
//! exist with at least one partition (§4.3 Kafka).
//!
//! Metadata fetching is split from the pass/fail decision behind
//! [`KafkaBackend`] so the decision logic can be exercised against a fake
//! broker response instead of a real cluster.

use async_trait::async_trait;

use crate::domain::{KafkaProbeConfig, ServiceSpec};

use super::{ProbeOutcome, addr, require_port};

/// Whatever can answer "is this broker reachable" and "does this topic
/// exist, and with how many partitions".
#[async_trait]
pub trait KafkaBackend: Send + Sync {
    async fn broker_reachable(&self) -> Result<(), String>;
    async fn topic_partition_count(&self, topic: &str) -> Result<Option<usize>, String>;
}

#[cfg(feature = "probe-kafka")]
pub struct RdKafkaBackend {
    bootstrap_servers: String,
    client_id: String,
    timeout: std::time::Duration,
}

#[cfg(feature = "probe-kafka")]
impl RdKafkaBackend {
    fn consumer(&self) -> Result<rdkafka::consumer::BaseConsumer, String> {
        use rdkafka::ClientConfig;
        ClientConfig::new()
            .set("bootstrap.servers", &self.bootstrap_servers)
            .set("client.id", &self.client_id)
            .create()
            .map_err(|e| format!("Kafka client creation failed: {e}"))
    }

    /// `fetch_metadata` is rdkafka's blocking API; run it on the blocking
    /// pool so it doesn't tie up a tokio worker thread for up to `timeout`.
    async fn fetch_metadata(&self, topic: Option<&str>) -> Result<rdkafka::metadata::Metadata, String> {
        use rdkafka::consumer::Consumer;

        let consumer = self.consumer()?;
        let topic = topic.map(str::to_string);
        let timeout = self.timeout;
        tokio::task::spawn_blocking(move || {
            consumer
                .fetch_metadata(topic.as_deref(), timeout)
                .map_err(|e| format!("Kafka metadata fetch failed: {e}"))
        })
        .await
        .map_err(|e| format!("Kafka metadata fetch task panicked: {e}"))?
    }
}

#[cfg(feature = "probe-kafka")]
#[async_trait]
impl KafkaBackend for RdKafkaBackend {
    async fn broker_reachable(&self) -> Result<(), String> {
        self.fetch_metadata(None).await.map(|_| ())
    }

    async fn topic_partition_count(&self, topic: &str) -> Result<Option<usize>, String> {
        let metadata = self.fetch_metadata(Some(topic)).await?;
        Ok(metadata
            .topics()
            .iter()
            .find(|t| t.name() == topic)
            .map(|t| t.partitions().len()))
    }
}

pub async fn probe_with(cfg: &KafkaProbeConfig, backend: &dyn KafkaBackend) -> ProbeOutcome {
    let Some(topic_name) = cfg.kafka_topic.as_ref().filter(|t| !t.is_empty()) else {
        return match backend.broker_reachable().await {
            Ok(()) => ProbeOutcome::alive(),
            Err(e) => ProbeOutcome::dead(e),
        };
    };

    match backend.topic_partition_count(topic_name).await {
        Ok(Some(0)) => ProbeOutcome::degraded(format!("topic '{topic_name}' has no partitions")),
        Ok(Some(_)) => ProbeOutcome::alive(),
        Ok(None) => ProbeOutcome::degraded(format!("topic '{topic_name}' does not exist")),
        Err(e) => ProbeOutcome::dead(e),
    }
}

#[cfg(feature = "probe-kafka")]
pub async fn probe(spec: &ServiceSpec, cfg: &KafkaProbeConfig) -> ProbeOutcome {
    let port = match require_port(spec) {
        Ok(port) => port,
        Err(outcome) => return outcome,
    };

    let backend = RdKafkaBackend {
        bootstrap_servers: addr(&spec.host, port),
        client_id: cfg.kafka_client_id.clone(),
        timeout: std::time::Duration::from_secs(spec.timeout_secs.max(1)),
    };

    probe_with(cfg, &backend).await
}

#[cfg(not(feature = "probe-kafka"))]
pub async fn probe(_spec: &ServiceSpec, _cfg: &KafkaProbeConfig) -> ProbeOutcome {
    ProbeOutcome::dead("Kafka probe requires the probe-kafka feature")
}
