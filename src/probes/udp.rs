//! UDP probe: send is required, expect is optional (§4.3 UDP).

use std::time::Duration;

use tokio::net::UdpSocket;

use crate::domain::{ServiceSpec, UdpProbeConfig};

use super::{ProbeOutcome, addr, require_port};

pub async fn probe(spec: &ServiceSpec, cfg: &UdpProbeConfig) -> ProbeOutcome {
    let port = match require_port(spec) {
        Ok(port) => port,
        Err(outcome) => return outcome,
    };

    if cfg.udp_send_data.is_empty() {
        return ProbeOutcome::dead("send data required");
    }

    let socket = match UdpSocket::bind("0.0.0.0:0").await {
        Ok(socket) => socket,
        Err(e) => return ProbeOutcome::dead(format!("failed to bind UDP socket: {e}")),
    };

    if let Err(e) = socket.connect(addr(&spec.host, port)).await {
        return ProbeOutcome::dead(format!("UDP connect failed: {e}"));
    }

    if let Err(e) = socket.send(cfg.udp_send_data.as_bytes()).await {
        return ProbeOutcome::dead(format!("UDP send failed: {e}"));
    }

    let Some(expect) = cfg.udp_expect_data.as_ref().filter(|s| !s.is_empty()) else {
        return ProbeOutcome::alive();
    };

    let mut buf = vec![0u8; 1024];
    let recv = tokio::time::timeout(Duration::from_secs(spec.timeout_secs.max(1)), socket.recv(&mut buf)).await;
    let n = match recv {
        Ok(Ok(n)) => n,
        Ok(Err(e)) => return ProbeOutcome::dead(format!("UDP read failed: {e}")),
        Err(_) => return ProbeOutcome::dead("UDP read timed out"),
    };

    let received = String::from_utf8_lossy(&buf[..n]);
    if received.contains(expect.as_str()) {
        ProbeOutcome::alive()
    } else {
        ProbeOutcome::dead(format!("expected response containing '{expect}', got '{received}'"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ProbeConfig;

    fn spec(port: u16, cfg: UdpProbeConfig) -> ServiceSpec {
        ServiceSpec {
            id: 1,
            host: "127.0.0.1".to_string(),
            port: Some(port),
            polling_interval_secs: 30,
            timeout_secs: 1,
            config: ProbeConfig::Udp(cfg),
        }
    }

    #[tokio::test]
    async fn missing_send_data_is_dead() {
        let cfg = UdpProbeConfig {
            udp_send_data: String::new(),
            udp_expect_data: None,
        };
        let outcome = probe(&spec(9999, cfg.clone()), &cfg).await;
        assert_eq!(outcome.status, crate::domain::ServiceStatus::Dead);
        assert_eq!(outcome.error.unwrap(), "send data required");
    }

    #[tokio::test]
    async fn echo_server_round_trip() {
        let server = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let port = server.local_addr().unwrap().port();

        tokio::spawn(async move {
            let mut buf = vec![0u8; 64];
            if let Ok((n, peer)) = server.recv_from(&mut buf).await {
                let _ = server.send_to(&buf[..n], peer).await;
            }
        });

        let cfg = UdpProbeConfig {
            udp_send_data: "PING".to_string(),
            udp_expect_data: Some("PING".to_string()),
        };
        let outcome = probe(&spec(port, cfg.clone()), &cfg).await;
        assert_eq!(outcome.status, crate::domain::ServiceStatus::Alive);
    }
}
