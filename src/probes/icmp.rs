//! ICMP probe: shell out to the host `ping` utility (§4.3 ICMP).
//!
//! The design notes permit replacing this with a raw-socket or
//! privileged-helper implementation as long as the count/timeout semantics
//! and the "0 received means Dead" rule are preserved; shelling out is the
//! simplest portable option and needs no elevated capabilities beyond what
//! the system `ping` binary already has (usually via setuid or a capability
//! bit), unlike a raw `AF_INET/SOCK_RAW` socket.

use std::process::Stdio;

use tokio::process::Command;

use crate::domain::{IcmpProbeConfig, ServiceSpec};

use super::ProbeOutcome;

/// Runs `ping` for `cfg`'s packet count, waiting up to `spec.timeout_secs`
/// (floored at 1) per packet. The per-probe deadline applied by
/// [`tokio::time::timeout`] in `probes::run` already bounds the whole
/// invocation; `per_packet_wait` below only sets `ping`'s own per-packet
/// wait flag (`-W`/`-w`).
pub async fn probe(spec: &ServiceSpec, cfg: &IcmpProbeConfig) -> ProbeOutcome {
    let count = cfg.clamped_count();
    let per_packet_wait = spec.timeout_secs.max(1);

    let mut command = ping_command(&spec.host, count, per_packet_wait);
    command.stdout(Stdio::piped()).stderr(Stdio::piped());

    let output = match command.output().await {
        Ok(output) => output,
        Err(e) => return ProbeOutcome::dead(format!("failed to invoke ping: {e}")),
    };

    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);

    if stdout.contains("0 received") || stdout.contains("0 packets received") {
        return ProbeOutcome::dead(format!("ping reported 0 packets received: {stdout}{stderr}"));
    }

    if !output.status.success() {
        return ProbeOutcome::dead(format!("ping exited with {}: {stderr}", output.status));
    }

    ProbeOutcome::alive()
}

#[cfg(target_os = "windows")]
fn ping_command(host: &str, count: u8, timeout_secs: u64) -> Command {
    let mut command = Command::new("ping");
    command
        .arg("-n")
        .arg(count.to_string())
        .arg("-w")
        .arg((timeout_secs * 1000).to_string())
        .arg(host);
    command
}

#[cfg(not(target_os = "windows"))]
fn ping_command(host: &str, count: u8, timeout_secs: u64) -> Command {
    let mut command = Command::new("ping");
    command
        .arg("-c")
        .arg(count.to_string())
        .arg("-W")
        .arg(timeout_secs.to_string())
        .arg(host);
    command
}
