//! Core data model: service recipes, probe outcomes, and the status model.
//!
//! This is the tagged-variant re-architecture described in the design notes:
//! the common envelope (`id`, `host`, `port`, interval, timeout) lives on
//! `ServiceSpec`, and every protocol's own required fields live in its own
//! `ProbeConfig` variant instead of one flat record with optional fields
//! for every protocol at once.

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type ServiceId = i64;

/// The probe recipe for one monitored service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceSpec {
    pub id: ServiceId,
    pub host: String,
    pub port: Option<u16>,
    #[serde(default = "default_polling_interval")]
    pub polling_interval_secs: u64,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    #[serde(flatten)]
    pub config: ProbeConfig,
}

fn default_polling_interval() -> u64 {
    60
}

fn default_timeout() -> u64 {
    10
}

/// Method-specific probe configuration, tagged by `method` on the wire.
///
/// Implementations on languages without sum types can keep a flat record,
/// but must enforce per-method required fields at validation time; here we
/// get that enforcement from the type system plus [`ServiceSpec::validate`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "UPPERCASE")]
pub enum ProbeConfig {
    Http(HttpProbeConfig),
    Https(HttpProbeConfig),
    Tcp(TcpProbeConfig),
    Udp(UdpProbeConfig),
    Icmp(IcmpProbeConfig),
    Dns(DnsProbeConfig),
    #[serde(rename = "WEBSOCKET")]
    WebSocket(WsProbeConfig),
    #[serde(rename = "WSS")]
    WebSocketSecure(WsProbeConfig),
    Grpc(GrpcProbeConfig),
    Smtp,
    Ftp,
    Ssh,
    Redis,
    #[serde(rename = "MYSQL")]
    MySql,
    Postgres(PostgresProbeConfig),
    #[serde(rename = "MONGODB")]
    MongoDb,
    Kafka(KafkaProbeConfig),
}

impl ProbeConfig {
    /// Short tag used in logs, matching the wire `method` value.
    pub fn tag(&self) -> &'static str {
        match self {
            ProbeConfig::Http(_) => "http",
            ProbeConfig::Https(_) => "https",
            ProbeConfig::Tcp(_) => "tcp",
            ProbeConfig::Udp(_) => "udp",
            ProbeConfig::Icmp(_) => "icmp",
            ProbeConfig::Dns(_) => "dns",
            ProbeConfig::WebSocket(_) => "websocket",
            ProbeConfig::WebSocketSecure(_) => "wss",
            ProbeConfig::Grpc(_) => "grpc",
            ProbeConfig::Smtp => "smtp",
            ProbeConfig::Ftp => "ftp",
            ProbeConfig::Ssh => "ssh",
            ProbeConfig::Redis => "redis",
            ProbeConfig::MySql => "mysql",
            ProbeConfig::Postgres(_) => "postgres",
            ProbeConfig::MongoDb => "mongodb",
            ProbeConfig::Kafka(_) => "kafka",
        }
    }

    /// Whether this method requires a non-empty `healthcheckPath` (§4.1 `should_check`).
    pub fn requires_path(&self) -> bool {
        matches!(
            self,
            ProbeConfig::Http(_)
                | ProbeConfig::Https(_)
                | ProbeConfig::WebSocket(_)
                | ProbeConfig::WebSocketSecure(_)
                | ProbeConfig::Grpc(_)
        )
    }

    /// Whether this method requires a port (pure-DNS name lookups do not).
    pub fn requires_port(&self) -> bool {
        !matches!(self, ProbeConfig::Dns(_))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    #[default]
    Get,
    Post,
    Put,
    Delete,
    Head,
    Options,
}

impl HttpMethod {
    /// Only POST/PUT carry a request body (§4.3 HTTP/HTTPS).
    pub fn allows_body(&self) -> bool {
        matches!(self, HttpMethod::Post | HttpMethod::Put)
    }
}

/// The outcome a `statusMapping` entry maps an HTTP status code to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StatusTag {
    Alive,
    Degraded,
    Dead,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpProbeConfig {
    pub healthcheck_path: String,
    #[serde(default)]
    pub http_method: HttpMethod,
    #[serde(default)]
    pub headers: HashMap<String, String>,
    pub body: Option<String>,
    #[serde(default)]
    pub ssl_verify: bool,
    #[serde(default)]
    pub follow_redirects: bool,
    pub expected_status: u16,
    #[serde(default)]
    pub status_mapping: HashMap<String, StatusTag>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TcpProbeConfig {
    pub tcp_send_data: Option<String>,
    pub tcp_expect_data: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UdpProbeConfig {
    pub udp_send_data: String,
    pub udp_expect_data: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IcmpProbeConfig {
    #[serde(default = "default_icmp_count")]
    pub icmp_packet_count: u8,
}

fn default_icmp_count() -> u8 {
    3
}

impl IcmpProbeConfig {
    /// Clamp to the valid 1..=10 range, defaulting to 3 — the boundary
    /// behavior required by the quantified-properties section.
    pub fn clamped_count(&self) -> u8 {
        self.icmp_packet_count.clamp(1, 10)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum DnsQueryType {
    A,
    Aaaa,
    Cname,
    Mx,
    Txt,
    Ns,
    Soa,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DnsProbeConfig {
    pub dns_query_type: DnsQueryType,
    pub dns_expected_result: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WsProbeConfig {
    pub healthcheck_path: String,
    #[serde(default)]
    pub ssl_verify: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrpcProbeConfig {
    /// Reuses `healthcheckPath` as the gRPC health-check `service` name.
    pub healthcheck_path: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostgresProbeConfig {
    pub frontend_host_override: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KafkaProbeConfig {
    pub kafka_topic: Option<String>,
    #[serde(default = "default_kafka_client_id")]
    pub kafka_client_id: String,
}

fn default_kafka_client_id() -> String {
    "service-weaver-healthcheck".to_string()
}

/// Closed sum of health states (§3 `ServiceStatus`).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ServiceStatus {
    Unknown,
    Alive,
    Dead,
    Degraded,
    Checking,
}

impl ServiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceStatus::Unknown => "unknown",
            ServiceStatus::Alive => "alive",
            ServiceStatus::Dead => "dead",
            ServiceStatus::Degraded => "degraded",
            ServiceStatus::Checking => "checking",
        }
    }
}

impl fmt::Display for ServiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<StatusTag> for ServiceStatus {
    fn from(tag: StatusTag) -> Self {
        match tag {
            StatusTag::Alive => ServiceStatus::Alive,
            StatusTag::Degraded => ServiceStatus::Degraded,
            StatusTag::Dead => ServiceStatus::Dead,
        }
    }
}

/// One append-only persisted probe outcome (§3 `HealthcheckResult`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthcheckResult {
    pub service_id: ServiceId,
    pub status: ServiceStatus,
    pub status_code: Option<u16>,
    pub latency_ms: u64,
    pub error: Option<String>,
    pub checked_at: DateTime<Utc>,
}

/// The in-memory projection of a service's most recent status (§3 `ServiceLatest`).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ServiceLatest {
    pub status: ServiceStatus,
    pub last_checked_at: Option<DateTime<Utc>>,
}

impl Default for ServiceLatest {
    fn default() -> Self {
        Self {
            status: ServiceStatus::Unknown,
            last_checked_at: None,
        }
    }
}

/// Broadcast message emitted after a probe completes or begins (§3 `StatusUpdate`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusUpdate {
    pub service_id: ServiceId,
    pub status: ServiceStatus,
    pub timestamp: DateTime<Utc>,
}

/// Inert pass-through for the diagram's service-to-service edges.
///
/// The `Connection` graph is part of the external data model but plays no
/// role in the probing engine (§9 Design Notes); it is kept only so the
/// crate's public surface can describe it without the scheduler depending
/// on it in any way.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ConnectionRef {
    pub from: ServiceId,
    pub to: ServiceId,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn icmp_count_clamps_to_valid_range() {
        assert_eq!(IcmpProbeConfig { icmp_packet_count: 0 }.clamped_count(), 1);
        assert_eq!(IcmpProbeConfig { icmp_packet_count: 99 }.clamped_count(), 10);
        assert_eq!(IcmpProbeConfig { icmp_packet_count: 5 }.clamped_count(), 5);
    }

    #[test]
    fn http_method_body_rules() {
        assert!(HttpMethod::Post.allows_body());
        assert!(HttpMethod::Put.allows_body());
        assert!(!HttpMethod::Get.allows_body());
        assert!(!HttpMethod::Head.allows_body());
    }

    #[test]
    fn dns_does_not_require_port() {
        let cfg = ProbeConfig::Dns(DnsProbeConfig {
            dns_query_type: DnsQueryType::A,
            dns_expected_result: None,
        });
        assert!(!cfg.requires_port());
        assert!(ProbeConfig::Tcp(TcpProbeConfig::default()).requires_port());
    }

    #[test]
    fn status_wire_format_is_lowercase() {
        assert_eq!(serde_json::to_string(&ServiceStatus::Alive).unwrap(), "\"alive\"");
        assert_eq!(serde_json::to_string(&ServiceStatus::Checking).unwrap(), "\"checking\"");
    }
}
