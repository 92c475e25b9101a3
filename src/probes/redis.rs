//! Redis probe: connect and issue PING (§4.3 Redis).

use crate::domain::ServiceSpec;

use super::{ProbeOutcome, addr, require_port};

#[cfg(feature = "probe-redis")]
pub async fn probe(spec: &ServiceSpec) -> ProbeOutcome {
    let port = match require_port(spec) {
        Ok(port) => port,
        Err(outcome) => return outcome,
    };

    let url = format!("redis://{}", addr(&spec.host, port));
    let client = match redis::Client::open(url) {
        Ok(client) => client,
        Err(e) => return ProbeOutcome::dead(format!("invalid Redis URL: {e}")),
    };

    let mut conn = match client.get_multiplexed_async_connection().await {
        Ok(conn) => conn,
        Err(e) => return ProbeOutcome::dead(format!("Redis connect failed: {e}")),
    };

    match redis::cmd("PING").query_async::<String>(&mut conn).await {
        Ok(_) => ProbeOutcome::alive(),
        Err(e) => ProbeOutcome::dead(format!("Redis PING failed: {e}")),
    }
}

#[cfg(not(feature = "probe-redis"))]
pub async fn probe(_spec: &ServiceSpec) -> ProbeOutcome {
    ProbeOutcome::dead("Redis probe requires the probe-redis feature")
}
