//! Property tests for the Status Classifier's mapping-wins rule and the
//! ICMP packet-count clamp (§8 boundary behaviors).

use std::collections::HashMap;

use guardia_topology::classify::classify;
use guardia_topology::domain::{
    HttpMethod, HttpProbeConfig, IcmpProbeConfig, ProbeConfig, ServiceSpec, ServiceStatus, StatusTag,
};
use guardia_topology::probes::ProbeOutcome;
use proptest::prelude::*;

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

fn status_tag(tag: u8) -> StatusTag {
    match tag % 3 {
        0 => StatusTag::Alive,
        1 => StatusTag::Degraded,
        _ => StatusTag::Dead,
    }
}

proptest! {
    /// A `statusMapping` entry for the returned code always wins over
    /// `expectedStatus`, even when the code also equals `expectedStatus`.
    #[test]
    fn mapping_always_wins_over_expected_status(code in 100u16..600, tag_seed in 0u8..255) {
        let tag = status_tag(tag_seed);
        let mut mapping = HashMap::new();
        mapping.insert(code.to_string(), tag);

        let spec = http_spec(code, mapping);
        let outcome = ProbeOutcome::alive().with_status_code(code);

        prop_assert_eq!(classify(&spec, &outcome), ServiceStatus::from(tag));
    }

    /// An unmapped code that doesn't match `expectedStatus` and isn't
    /// 429/503 is always terminal `Dead`.
    #[test]
    fn unmapped_unexpected_non_degrade_code_is_dead(code in 100u16..600, expected in 100u16..600) {
        prop_assume!(code != expected && code != 429 && code != 503);
        let spec = http_spec(expected, HashMap::new());
        let outcome = ProbeOutcome::alive().with_status_code(code);
        prop_assert_eq!(classify(&spec, &outcome), ServiceStatus::Dead);
    }

    /// The ICMP packet count always clamps into 1..=10.
    #[test]
    fn icmp_count_clamps_into_valid_range(count in any::<u8>()) {
        let cfg = IcmpProbeConfig { icmp_packet_count: count };
        let clamped = cfg.clamped_count();
        prop_assert!((1..=10).contains(&clamped));
        if (1..=10).contains(&count) {
            prop_assert_eq!(clamped, count);
        }
    }
}
