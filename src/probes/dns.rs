//! DNS probe: resolve `spec.host` at the configured record type, optionally
//! matching an expected value (§4.3 DNS).
//!
//! Resolution is split from matching behind [`DnsBackend`] so the matching
//! logic (record-type mapping, expected-value comparison) can be exercised
//! with a canned set of records instead of a real resolver.

use async_trait::async_trait;

use crate::domain::{DnsProbeConfig, DnsQueryType, ServiceSpec};

use super::ProbeOutcome;

/// A resolved record value, narrowed to what the matching logic below cares
/// about — not a full mirror of the wire record format.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordValue {
    A(String),
    Aaaa(String),
    Cname(String),
    Mx(String),
    Ns(String),
    Txt(String),
    Soa,
}

/// Anything that can answer a DNS question. Implemented against a real
/// resolver in production and against a canned record set in tests.
#[async_trait]
pub trait DnsBackend: Send + Sync {
    async fn lookup(&self, host: &str, query_type: DnsQueryType) -> Result<Vec<RecordValue>, String>;
}

#[cfg(feature = "probe-dns")]
pub struct HickoryBackend;

#[cfg(feature = "probe-dns")]
#[async_trait]
impl DnsBackend for HickoryBackend {
    async fn lookup(&self, host: &str, query_type: DnsQueryType) -> Result<Vec<RecordValue>, String> {
        use hickory_resolver::TokioAsyncResolver;
        use hickory_resolver::proto::rr::{RData, RecordType};

        let resolver = TokioAsyncResolver::tokio_from_system_conf()
            .map_err(|e| format!("failed to build DNS resolver: {e}"))?;

        let record_type = match query_type {
            DnsQueryType::A => RecordType::A,
            DnsQueryType::Aaaa => RecordType::AAAA,
            DnsQueryType::Cname => RecordType::CNAME,
            DnsQueryType::Mx => RecordType::MX,
            DnsQueryType::Txt => RecordType::TXT,
            DnsQueryType::Ns => RecordType::NS,
            DnsQueryType::Soa => RecordType::SOA,
        };

        let lookup = resolver
            .lookup(host, record_type)
            .await
            .map_err(|e| format!("DNS lookup failed: {e}"))?;

        Ok(lookup
            .record_iter()
            .filter_map(|record| {
                let data = record.data()?;
                match data {
                    RData::A(ip) => Some(RecordValue::A(ip.0.to_string())),
                    RData::AAAA(ip) => Some(RecordValue::Aaaa(ip.0.to_string())),
                    RData::CNAME(name) => Some(RecordValue::Cname(name.to_string().trim_end_matches('.').to_string())),
                    RData::MX(mx) => Some(RecordValue::Mx(mx.exchange().to_string().trim_end_matches('.').to_string())),
                    RData::NS(ns) => Some(RecordValue::Ns(ns.to_string().trim_end_matches('.').to_string())),
                    RData::TXT(txt) => Some(RecordValue::Txt(
                        txt.iter().map(|chunk| String::from_utf8_lossy(chunk).into_owned()).collect(),
                    )),
                    RData::SOA(_) => Some(RecordValue::Soa),
                    _ => None,
                }
            })
            .collect())
    }
}

/// Match `records` against `expected`, per the record-type rules in §4.3.
fn matches_expected(records: &[RecordValue], expected: &str) -> bool {
    records.iter().any(|record| match record {
        RecordValue::A(v) | RecordValue::Aaaa(v) | RecordValue::Cname(v) | RecordValue::Mx(v) | RecordValue::Ns(v) => {
            v == expected
        }
        RecordValue::Txt(v) => v.contains(expected),
        RecordValue::Soa => true,
    })
}

pub async fn probe_with(spec: &ServiceSpec, cfg: &DnsProbeConfig, backend: &dyn DnsBackend) -> ProbeOutcome {
    let records = match backend.lookup(&spec.host, cfg.dns_query_type).await {
        Ok(records) => records,
        Err(e) => return ProbeOutcome::dead(e),
    };

    let Some(expected) = cfg.dns_expected_result.as_ref().filter(|s| !s.is_empty()) else {
        return ProbeOutcome::alive();
    };

    if matches_expected(&records, expected) {
        ProbeOutcome::alive()
    } else {
        ProbeOutcome::dead(format!("no record matched expected value '{expected}'"))
    }
}

#[cfg(feature = "probe-dns")]
pub async fn probe(spec: &ServiceSpec, cfg: &DnsProbeConfig) -> ProbeOutcome {
    probe_with(spec, cfg, &HickoryBackend).await
}

#[cfg(not(feature = "probe-dns"))]
pub async fn probe(_spec: &ServiceSpec, _cfg: &DnsProbeConfig) -> ProbeOutcome {
    ProbeOutcome::dead("DNS probe requires the probe-dns feature")
}
