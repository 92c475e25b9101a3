//! TCP probe: dial, optionally send/expect data (§4.3 TCP).

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use crate::domain::{ServiceSpec, TcpProbeConfig};

use super::{ProbeOutcome, addr, require_port};

pub async fn probe(spec: &ServiceSpec, cfg: &TcpProbeConfig) -> ProbeOutcome {
    let port = match require_port(spec) {
        Ok(port) => port,
        Err(outcome) => return outcome,
    };

    let mut stream = match TcpStream::connect(addr(&spec.host, port)).await {
        Ok(stream) => stream,
        Err(e) => return ProbeOutcome::dead(format!("TCP dial failed: {e}")),
    };

    let Some(send) = cfg.tcp_send_data.as_ref().filter(|s| !s.is_empty()) else {
        return ProbeOutcome::alive();
    };

    if let Err(e) = stream.write_all(send.as_bytes()).await {
        return ProbeOutcome::dead(format!("TCP write failed: {e}"));
    }

    let Some(expect) = cfg.tcp_expect_data.as_ref().filter(|s| !s.is_empty()) else {
        return ProbeOutcome::alive();
    };

    let mut buf = vec![0u8; 1024];
    let n = match stream.read(&mut buf).await {
        Ok(n) => n,
        Err(e) => return ProbeOutcome::dead(format!("TCP read failed: {e}")),
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
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn spec(port: u16, cfg: TcpProbeConfig) -> ServiceSpec {
        ServiceSpec {
            id: 1,
            host: "127.0.0.1".to_string(),
            port: Some(port),
            polling_interval_secs: 30,
            timeout_secs: 2,
            config: ProbeConfig::Tcp(cfg),
        }
    }

    #[tokio::test]
    async fn echo_match_is_alive() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 64];
            let n = socket.read(&mut buf).await.unwrap();
            assert_eq!(&buf[..n], b"PING\r\n");
            socket.write_all(b"PONG\r\n").await.unwrap();
        });

        let cfg = TcpProbeConfig {
            tcp_send_data: Some("PING\r\n".to_string()),
            tcp_expect_data: Some("PONG".to_string()),
        };
        let outcome = probe(&spec(port, cfg.clone()), &cfg).await;
        assert_eq!(outcome.status, crate::domain::ServiceStatus::Alive);
    }

    #[tokio::test]
    async fn echo_mismatch_is_dead_with_expected_message() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 64];
            let _ = socket.read(&mut buf).await.unwrap();
            socket.write_all(b"HELLO").await.unwrap();
        });

        let cfg = TcpProbeConfig {
            tcp_send_data: Some("PING\r\n".to_string()),
            tcp_expect_data: Some("PONG".to_string()),
        };
        let outcome = probe(&spec(port, cfg.clone()), &cfg).await;
        assert_eq!(outcome.status, crate::domain::ServiceStatus::Dead);
        assert!(outcome.error.unwrap().contains("expected response"));
    }

    #[tokio::test]
    async fn connection_refused_is_dead() {
        let cfg = TcpProbeConfig::default();
        let outcome = probe(&spec(1, cfg.clone()), &cfg).await;
        assert_eq!(outcome.status, crate::domain::ServiceStatus::Dead);
    }
}
