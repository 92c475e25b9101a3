//! SMTP probe: dial, send NOOP, accept any SMTP-level success (§4.3 SMTP).

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufStream};
use tokio::net::TcpStream;

use crate::domain::ServiceSpec;

use super::{ProbeOutcome, addr, require_port};

pub async fn probe(spec: &ServiceSpec) -> ProbeOutcome {
    let port = match require_port(spec) {
        Ok(port) => port,
        Err(outcome) => return outcome,
    };

    let stream = match TcpStream::connect(addr(&spec.host, port)).await {
        Ok(stream) => stream,
        Err(e) => return ProbeOutcome::dead(format!("SMTP dial failed: {e}")),
    };
    let mut stream = BufStream::new(stream);

    // Consume the server's greeting banner before issuing NOOP.
    let mut line = String::new();
    if let Err(e) = stream.read_line(&mut line).await {
        return ProbeOutcome::dead(format!("failed to read SMTP banner: {e}"));
    }

    if let Err(e) = stream.write_all(b"NOOP\r\n").await {
        return ProbeOutcome::dead(format!("failed to send NOOP: {e}"));
    }
    if let Err(e) = stream.flush().await {
        return ProbeOutcome::dead(format!("failed to flush NOOP: {e}"));
    }

    let mut reply = String::new();
    if let Err(e) = stream.read_line(&mut reply).await {
        return ProbeOutcome::dead(format!("failed to read NOOP reply: {e}"));
    }

    match reply.get(0..1) {
        Some("2") => ProbeOutcome::alive(),
        _ => ProbeOutcome::dead(format!("SMTP NOOP did not succeed: {}", reply.trim())),
    }
}
