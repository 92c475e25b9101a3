//! Probe Library — one function per protocol.
//!
//! Each probe takes a [`ServiceSpec`] and a deadline and opens its own
//! transport; there is no shared state between calls. Every probe returns
//! a [`ProbeOutcome`] rather than a `Result` — failures are terminal
//! outcomes (`Dead`, with the error text attached), never propagated, per
//! the error handling design in §7.

use std::time::Duration;

use tracing::instrument;

use crate::domain::{ProbeConfig, ServiceSpec, ServiceStatus};

pub mod dns;
pub mod ftp;
pub mod grpc;
pub mod http;
pub mod icmp;
pub mod kafka;
pub mod mongodb;
pub mod mysql;
pub mod postgres;
pub mod redis;
pub mod smtp;
pub mod ssh;
pub mod tcp;
pub mod udp;
pub mod ws;

/// Result of one probe invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeOutcome {
    pub status: ServiceStatus,
    pub status_code: Option<u16>,
    pub error: Option<String>,
}

impl ProbeOutcome {
    pub fn alive() -> Self {
        Self {
            status: ServiceStatus::Alive,
            status_code: None,
            error: None,
        }
    }

    pub fn degraded(error: impl Into<String>) -> Self {
        Self {
            status: ServiceStatus::Degraded,
            status_code: None,
            error: Some(error.into()),
        }
    }

    pub fn dead(error: impl Into<String>) -> Self {
        Self {
            status: ServiceStatus::Dead,
            status_code: None,
            error: Some(error.into()),
        }
    }

    pub fn with_status_code(mut self, code: u16) -> Self {
        self.status_code = Some(code);
        self
    }
}

/// Invoke the probe matching `spec.config`, enforcing the timeout deadline.
///
/// An unrecognized method never reaches this function today (the `ProbeConfig`
/// enum is closed), but a probe that blocks past `deadline` is still cancelled
/// here and reported as a timeout `Dead` outcome, per §4.2 edge cases.
#[instrument(skip(spec), fields(service_id = spec.id, method = spec.config.tag()))]
pub async fn run(spec: &ServiceSpec) -> ProbeOutcome {
    let deadline = Duration::from_secs(spec.timeout_secs.max(1));

    let fut = dispatch(spec);
    match tokio::time::timeout(deadline, fut).await {
        Ok(outcome) => outcome,
        Err(_) => ProbeOutcome::dead(format!("probe exceeded {}s timeout", spec.timeout_secs)),
    }
}

async fn dispatch(spec: &ServiceSpec) -> ProbeOutcome {
    match &spec.config {
        ProbeConfig::Http(cfg) => http::probe(spec, cfg, "http").await,
        ProbeConfig::Https(cfg) => http::probe(spec, cfg, "https").await,
        ProbeConfig::Tcp(cfg) => tcp::probe(spec, cfg).await,
        ProbeConfig::Udp(cfg) => udp::probe(spec, cfg).await,
        ProbeConfig::Icmp(cfg) => icmp::probe(spec, cfg).await,
        ProbeConfig::Dns(cfg) => dns::probe(spec, cfg).await,
        ProbeConfig::WebSocket(cfg) => ws::probe(spec, cfg, "ws").await,
        ProbeConfig::WebSocketSecure(cfg) => ws::probe(spec, cfg, "wss").await,
        ProbeConfig::Grpc(cfg) => grpc::probe(spec, cfg).await,
        ProbeConfig::Smtp => smtp::probe(spec).await,
        ProbeConfig::Ftp => ftp::probe(spec).await,
        ProbeConfig::Ssh => ssh::probe(spec).await,
        ProbeConfig::Redis => redis::probe(spec).await,
        ProbeConfig::MySql => mysql::probe(spec).await,
        ProbeConfig::Postgres(cfg) => postgres::probe(spec, cfg).await,
        ProbeConfig::MongoDb => mongodb::probe(spec).await,
        ProbeConfig::Kafka(cfg) => kafka::probe(spec, cfg).await,
    }
}

/// Shared helper: format `host:port`, failing fast (`ConfigInvalid`) for
/// methods that require a port but weren't given one.
pub(crate) fn require_port(spec: &ServiceSpec) -> Result<u16, ProbeOutcome> {
    spec.port
        .ok_or_else(|| ProbeOutcome::dead("port is required for this method"))
}

pub(crate) fn addr(host: &str, port: u16) -> String {
    format!("{host}:{port}")
}
