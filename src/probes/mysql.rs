//! MySQL probe: connect and issue the driver's ping (§4.3 MySQL).

use crate::domain::ServiceSpec;

use super::{ProbeOutcome, require_port};

#[cfg(feature = "probe-mysql")]
pub async fn probe(spec: &ServiceSpec) -> ProbeOutcome {
    let port = match require_port(spec) {
        Ok(port) => port,
        Err(outcome) => return outcome,
    };

    let opts = mysql_async::OptsBuilder::default()
        .ip_or_hostname(spec.host.clone())
        .tcp_port(port);

    let pool = mysql_async::Pool::new(opts);
    let mut conn = match pool.get_conn().await {
        Ok(conn) => conn,
        Err(e) => {
            let _ = pool.disconnect().await;
            return ProbeOutcome::dead(format!("MySQL connect failed: {e}"));
        }
    };

    let result = conn.ping().await;
    drop(conn);
    let _ = pool.disconnect().await;

    match result {
        Ok(_) => ProbeOutcome::alive(),
        Err(e) => ProbeOutcome::dead(format!("MySQL ping failed: {e}")),
    }
}

#[cfg(not(feature = "probe-mysql"))]
pub async fn probe(_spec: &ServiceSpec) -> ProbeOutcome {
    ProbeOutcome::dead("MySQL probe requires the probe-mysql feature")
}
