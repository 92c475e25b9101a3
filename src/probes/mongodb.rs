//! MongoDB probe: connect and issue PING (§4.3 MongoDB).

use crate::domain::ServiceSpec;

use super::{ProbeOutcome, addr, require_port};

#[cfg(feature = "probe-mongo")]
pub async fn probe(spec: &ServiceSpec) -> ProbeOutcome {
    use mongodb::Client;
    use mongodb::bson::doc;

    let port = match require_port(spec) {
        Ok(port) => port,
        Err(outcome) => return outcome,
    };

    let uri = format!("mongodb://{}", addr(&spec.host, port));
    let client = match Client::with_uri_str(&uri).await {
        Ok(client) => client,
        Err(e) => return ProbeOutcome::dead(format!("invalid MongoDB URI: {e}")),
    };

    match client
        .database("admin")
        .run_command(doc! { "ping": 1 })
        .await
    {
        Ok(_) => ProbeOutcome::alive(),
        Err(e) => ProbeOutcome::dead(format!("MongoDB ping failed: {e}")),
    }
}

#[cfg(not(feature = "probe-mongo"))]
pub async fn probe(_spec: &ServiceSpec) -> ProbeOutcome {
    ProbeOutcome::dead("MongoDB probe requires the probe-mongo feature")
}
