//! PostgreSQL probe: connect, ping, then run a trivial query (§4.3 PostgreSQL).
//!
//! Credentials come from the environment rather than the service spec,
//! matching how the source treats database probes as deployment-wide
//! secrets rather than per-service config.

use crate::domain::{PostgresProbeConfig, ServiceSpec};

use super::{ProbeOutcome, require_port};

#[cfg(feature = "probe-postgres")]
pub async fn probe(spec: &ServiceSpec, cfg: &PostgresProbeConfig) -> ProbeOutcome {
    use sqlx::Connection;
    use sqlx::postgres::PgConnectOptions;

    let port = match require_port(spec) {
        Ok(port) => port,
        Err(outcome) => return outcome,
    };

    let host = match cfg
        .frontend_host_override
        .as_ref()
        .filter(|h| !h.is_empty())
    {
        Some(override_host) => strip_to_hostname(override_host),
        None => spec.host.clone(),
    };

    let user = std::env::var("DB_USER").unwrap_or_else(|_| "postgres".to_string());
    let password = std::env::var("DB_PASSWORD").unwrap_or_else(|_| "password".to_string());
    let database = std::env::var("DB_NAME").unwrap_or_else(|_| "service_weaver".to_string());
    let sslmode = std::env::var("DB_SSLMODE").unwrap_or_else(|_| "disable".to_string());

    let ssl_mode = match sslmode.as_str() {
        "disable" => sqlx::postgres::PgSslMode::Disable,
        "require" => sqlx::postgres::PgSslMode::Require,
        "verify-ca" => sqlx::postgres::PgSslMode::VerifyCa,
        "verify-full" => sqlx::postgres::PgSslMode::VerifyFull,
        _ => sqlx::postgres::PgSslMode::Prefer,
    };

    let options = PgConnectOptions::new()
        .host(&host)
        .port(port)
        .username(&user)
        .password(&password)
        .database(&database)
        .ssl_mode(ssl_mode);

    let mut conn = match sqlx::postgres::PgConnection::connect_with(&options).await {
        Ok(conn) => conn,
        Err(e) => return ProbeOutcome::dead(format!("Postgres connect failed: {e}")),
    };

    if let Err(e) = conn.ping().await {
        return ProbeOutcome::dead(format!("Postgres ping failed: {e}"));
    }

    match sqlx::query_scalar::<_, String>("SELECT version()")
        .fetch_one(&mut conn)
        .await
    {
        Ok(_) => ProbeOutcome::alive(),
        Err(e) => ProbeOutcome::degraded(format!("Postgres version query failed: {e}")),
    }
}

#[cfg(not(feature = "probe-postgres"))]
pub async fn probe(_spec: &ServiceSpec, _cfg: &PostgresProbeConfig) -> ProbeOutcome {
    ProbeOutcome::dead("Postgres probe requires the probe-postgres feature")
}

/// Strip scheme, port, and path from a `frontendHostOverride` value,
/// keeping only the hostname.
#[cfg_attr(not(feature = "probe-postgres"), allow(dead_code))]
fn strip_to_hostname(raw: &str) -> String {
    let without_scheme = raw.split("://").next_back().unwrap_or(raw);
    let host_and_port = without_scheme.split('/').next().unwrap_or(without_scheme);
    host_and_port
        .split(':')
        .next()
        .unwrap_or(host_and_port)
        .to_string()
}
