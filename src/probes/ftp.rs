//! FTP probe: dial, read banner, send QUIT, read reply (§4.3 FTP).

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
        Err(e) => return ProbeOutcome::dead(format!("FTP dial failed: {e}")),
    };
    let mut stream = BufStream::new(stream);

    let mut banner = String::new();
    if let Err(e) = stream.read_line(&mut banner).await {
        return ProbeOutcome::dead(format!("failed to read FTP banner: {e}"));
    }
    if !is_success_reply(&banner) {
        return ProbeOutcome::dead(format!("FTP banner was not a success reply: {}", banner.trim()));
    }

    if let Err(e) = stream.write_all(b"QUIT\r\n").await {
        return ProbeOutcome::dead(format!("failed to send QUIT: {e}"));
    }
    if let Err(e) = stream.flush().await {
        return ProbeOutcome::dead(format!("failed to flush QUIT: {e}"));
    }

    let mut reply = String::new();
    if let Err(e) = stream.read_line(&mut reply).await {
        return ProbeOutcome::dead(format!("failed to read QUIT reply: {e}"));
    }

    if is_success_reply(&reply) {
        ProbeOutcome::alive()
    } else {
        ProbeOutcome::dead(format!("FTP QUIT did not succeed: {}", reply.trim()))
    }
}

fn is_success_reply(line: &str) -> bool {
    matches!(line.as_bytes().first(), Some(b'1') | Some(b'2') | Some(b'3'))
}
