use std::collections::HashMap;
use std::sync::Arc;

use guardia_topology::domain::{HttpMethod, HttpProbeConfig, ProbeConfig, ServiceSpec, TcpProbeConfig};
use guardia_topology::store::memory::MemoryStore;

pub fn http_spec(id: i64, host: String, port: u16, expected_status: u16, mapping: HashMap<String, guardia_topology::domain::StatusTag>) -> ServiceSpec {
    ServiceSpec {
        id,
        host,
        port: Some(port),
        polling_interval_secs: 30,
        timeout_secs: 2,
        config: ProbeConfig::Http(HttpProbeConfig {
            healthcheck_path: "/healthz".to_string(),
            http_method: HttpMethod::Get,
            headers: HashMap::new(),
            body: None,
            ssl_verify: false,
            follow_redirects: false,
            expected_status,
            status_mapping: mapping,
        }),
    }
}

pub fn tcp_spec(id: i64, host: String, port: u16, send: &str, expect: &str) -> ServiceSpec {
    ServiceSpec {
        id,
        host,
        port: Some(port),
        polling_interval_secs: 30,
        timeout_secs: 1,
        config: ProbeConfig::Tcp(TcpProbeConfig {
            tcp_send_data: Some(send.to_string()),
            tcp_expect_data: Some(expect.to_string()),
        }),
    }
}

pub fn memory_store() -> Arc<MemoryStore> {
    Arc::new(MemoryStore::new(vec![]))
}
