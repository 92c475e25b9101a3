//! Status Classifier — pure mapping from a protocol outcome + service
//! configuration to a terminal [`ServiceStatus`] (§4.4).
//!
//! Non-HTTP protocols already resolve their own terminal status inside the
//! probe; this function passes them through unchanged. HTTP/HTTPS outcomes
//! carry only a transport-level "did we get a response" signal plus the
//! status code — the code is what actually gets classified, in priority
//! order: explicit `statusMapping` entry, then `expectedStatus` match, then
//! the 429/503-is-degraded policy default, else `Dead`.

use crate::domain::{ProbeConfig, ServiceSpec, ServiceStatus};
use crate::probes::ProbeOutcome;

pub fn classify(spec: &ServiceSpec, outcome: &ProbeOutcome) -> ServiceStatus {
    let http_cfg = match &spec.config {
        ProbeConfig::Http(cfg) | ProbeConfig::Https(cfg) => cfg,
        _ => return outcome.status,
    };

    // A transport-level failure (no status code at all) is always Dead,
    // regardless of statusMapping/expectedStatus.
    let Some(code) = outcome.status_code else {
        return ServiceStatus::Dead;
    };

    if let Some(tag) = http_cfg.status_mapping.get(&code.to_string()) {
        return (*tag).into();
    }

    if code == http_cfg.expected_status {
        return ServiceStatus::Alive;
    }

    if code == 429 || code == 503 {
        return ServiceStatus::Degraded;
    }

    ServiceStatus::Dead
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{HttpMethod, HttpProbeConfig, StatusTag};
    use std::collections::HashMap;

    fn http_spec(expected_status: u16, mapping: HashMap<String, StatusTag>) -> ServiceSpec {
        ServiceSpec {
            id: 1,
            host: "h".to_string(),
            port: Some(80),
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

    #[test]
    fn expected_status_match_is_alive() {
        let spec = http_spec(200, HashMap::new());
        let outcome = ProbeOutcome::alive().with_status_code(200);
        assert_eq!(classify(&spec, &outcome), ServiceStatus::Alive);
    }

    #[test]
    fn mapped_status_wins_over_expected() {
        let mut mapping = HashMap::new();
        mapping.insert("200".to_string(), StatusTag::Degraded);
        let spec = http_spec(200, mapping);
        let outcome = ProbeOutcome::alive().with_status_code(200);
        assert_eq!(classify(&spec, &outcome), ServiceStatus::Degraded);
    }

    #[test]
    fn unmapped_429_is_degraded() {
        let spec = http_spec(200, HashMap::new());
        let outcome = ProbeOutcome::alive().with_status_code(429);
        assert_eq!(classify(&spec, &outcome), ServiceStatus::Degraded);
    }

    #[test]
    fn unmapped_503_is_degraded() {
        let spec = http_spec(200, HashMap::new());
        let outcome = ProbeOutcome::alive().with_status_code(503);
        assert_eq!(classify(&spec, &outcome), ServiceStatus::Degraded);
    }

    #[test]
    fn unexpected_other_code_is_dead() {
        let spec = http_spec(200, HashMap::new());
        let outcome = ProbeOutcome::alive().with_status_code(404);
        assert_eq!(classify(&spec, &outcome), ServiceStatus::Dead);
    }

    #[test]
    fn non_http_outcomes_pass_through() {
        let spec = ServiceSpec {
            id: 2,
            host: "h".to_string(),
            port: Some(6379),
            polling_interval_secs: 30,
            timeout_secs: 2,
            config: ProbeConfig::Redis,
        };
        let outcome = ProbeOutcome::degraded("slow");
        assert_eq!(classify(&spec, &outcome), ServiceStatus::Degraded);
    }

    #[test]
    fn transport_failure_with_no_code_is_dead() {
        let spec = http_spec(200, HashMap::new());
        let outcome = ProbeOutcome::dead("connection refused");
        assert_eq!(classify(&spec, &outcome), ServiceStatus::Dead);
    }
}
