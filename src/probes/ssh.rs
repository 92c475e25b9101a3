//! SSH probe: open a client transport with a bogus credential, run a
//! trivial command, compare output (§4.3 SSH).
//!
//! Per the open question in the design notes, this preserves
//! failure-as-probe-signal: a real server will reject the "healthcheck"
//! user, and that rejection itself is the `Dead` signal, exactly like the
//! source. See DESIGN.md for the full rationale.

use std::sync::Arc;
use std::time::Duration;

use crate::domain::ServiceSpec;

use super::{ProbeOutcome, addr, require_port};

#[cfg(feature = "probe-ssh")]
struct AcceptAnyHostKey;

#[cfg(feature = "probe-ssh")]
#[async_trait::async_trait]
impl russh::client::Handler for AcceptAnyHostKey {
    type Error = russh::Error;

    async fn check_server_key(
        &mut self,
        _server_public_key: &russh_keys::key::PublicKey,
    ) -> Result<bool, Self::Error> {
        Ok(true)
    }
}

#[cfg(feature = "probe-ssh")]
pub async fn probe(spec: &ServiceSpec) -> ProbeOutcome {
    let port = match require_port(spec) {
        Ok(port) => port,
        Err(outcome) => return outcome,
    };

    let config = Arc::new(russh::client::Config {
        connection_timeout: Some(Duration::from_secs(spec.timeout_secs.max(1))),
        ..Default::default()
    });

    let mut session =
        match russh::client::connect(config, addr(&spec.host, port), AcceptAnyHostKey).await {
            Ok(session) => session,
            Err(e) => return ProbeOutcome::dead(format!("SSH transport failed: {e}")),
        };

    let authenticated = match session.authenticate_password("healthcheck", "healthcheck").await {
        Ok(authenticated) => authenticated,
        Err(e) => return ProbeOutcome::dead(format!("SSH authentication failed: {e}")),
    };

    if !authenticated {
        return ProbeOutcome::dead("SSH authentication rejected");
    }

    let mut channel = match session.channel_open_session().await {
        Ok(channel) => channel,
        Err(e) => return ProbeOutcome::dead(format!("SSH channel open failed: {e}")),
    };

    if let Err(e) = channel.exec(true, "echo 'healthcheck'").await {
        return ProbeOutcome::dead(format!("SSH exec failed: {e}"));
    }

    let mut output = Vec::new();
    while let Some(message) = channel.wait().await {
        match message {
            russh::ChannelMsg::Data { data } => output.extend_from_slice(&data),
            russh::ChannelMsg::ExitStatus { .. } => break,
            _ => {}
        }
    }

    let output = String::from_utf8_lossy(&output);
    if output.trim() == "healthcheck" {
        ProbeOutcome::alive()
    } else {
        ProbeOutcome::dead(format!("unexpected SSH command output: '{}'", output.trim()))
    }
}

#[cfg(not(feature = "probe-ssh"))]
pub async fn probe(_spec: &ServiceSpec) -> ProbeOutcome {
    ProbeOutcome::dead("SSH probe requires the probe-ssh feature")
}
