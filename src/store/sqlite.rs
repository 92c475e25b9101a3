//! SQLite-backed `ServiceSpecStore`/`ResultSink`, grounded on the teacher's
//! `storage/sqlite.rs`: WAL mode, a pooled connection, `sqlx::migrate!` for
//! schema versioning. Also carries the optional retention cleanup loop
//! described in the design notes as ambient persistence hygiene.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Pool, Row, Sqlite};
use tracing::{debug, info, instrument, warn};

use crate::domain::{HealthcheckResult, ProbeConfig, ServiceId, ServiceLatest, ServiceSpec, ServiceStatus};

use super::{ResultSink, ServiceSpecStore, StoreError, StoreResult};

pub struct SqliteStore {
    pool: Pool<Sqlite>,
}

impl SqliteStore {
    #[instrument(skip_all)]
    pub async fn new(db_path: impl AsRef<Path>) -> StoreResult<Self> {
        let db_path_str = db_path.as_ref().to_string_lossy().to_string();
        info!("initializing SQLite store at: {}", db_path_str);

        let options = SqliteConnectOptions::new()
            .filename(&db_path_str)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(30));

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .map_err(|e| StoreError::ConnectionFailed(e.to_string()))?;

        debug!("running database migrations");
        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }

    /// Delete results older than `retention_days`. Returns the row count
    /// deleted; 0 on a no-op call.
    #[instrument(skip(self))]
    pub async fn cleanup_old_results(&self, retention_days: u32) -> StoreResult<u64> {
        if retention_days == 0 {
            return Ok(0);
        }
        let cutoff = (Utc::now() - chrono::Duration::days(retention_days as i64)).timestamp_millis();
        let result = sqlx::query("DELETE FROM healthcheck_results WHERE checked_at < ?")
            .bind(cutoff)
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::QueryFailed(e.to_string()))?;
        let deleted = result.rows_affected();
        if deleted > 0 {
            info!("retention cleanup deleted {} old results", deleted);
        }
        Ok(deleted)
    }

    /// Spawn the periodic retention sweep described in the design notes.
    /// No-op (never spawns) when retention is disabled.
    pub fn spawn_retention_task(
        store: std::sync::Arc<Self>,
        retention_days: u32,
        cleanup_interval_hours: u32,
    ) {
        if retention_days == 0 {
            return;
        }
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(Duration::from_secs(
                cleanup_interval_hours.max(1) as u64 * 3600,
            ));
            loop {
                ticker.tick().await;
                if let Err(e) = store.cleanup_old_results(retention_days).await {
                    warn!("retention cleanup failed: {}", e);
                }
            }
        });
    }
}

#[async_trait]
impl ServiceSpecStore for SqliteStore {
    #[instrument(skip(self))]
    async fn list_all(&self) -> StoreResult<Vec<ServiceSpec>> {
        let rows = sqlx::query(
            "SELECT id, host, port, polling_interval_secs, timeout_secs, config_json FROM service_specs",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::QueryFailed(e.to_string()))?;

        rows.into_iter()
            .map(|row| {
                let config_json: String = row.get("config_json");
                let config: ProbeConfig = serde_json::from_str(&config_json)
                    .map_err(|e| StoreError::SerializationError(e.to_string()))?;
                Ok(ServiceSpec {
                    id: row.get("id"),
                    host: row.get("host"),
                    port: row.get::<Option<i64>, _>("port").map(|p| p as u16),
                    polling_interval_secs: row.get::<i64, _>("polling_interval_secs") as u64,
                    timeout_secs: row.get::<i64, _>("timeout_secs") as u64,
                    config,
                })
            })
            .collect()
    }
}

#[async_trait]
impl ResultSink for SqliteStore {
    #[instrument(skip(self, result), fields(service_id = result.service_id))]
    async fn record(&self, result: HealthcheckResult) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO healthcheck_results
                (service_id, status, status_code, latency_ms, error, checked_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(result.service_id)
        .bind(result.status.as_str())
        .bind(result.status_code.map(|c| c as i64))
        .bind(result.latency_ms as i64)
        .bind(&result.error)
        .bind(result.checked_at.timestamp_millis())
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::QueryFailed(e.to_string()))?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn update_latest(&self, service_id: ServiceId, latest: ServiceLatest) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO service_latest (service_id, status, last_checked_at)
            VALUES (?, ?, ?)
            ON CONFLICT (service_id) DO UPDATE SET
                status = excluded.status,
                last_checked_at = excluded.last_checked_at
            "#,
        )
        .bind(service_id)
        .bind(latest.status.as_str())
        .bind(latest.last_checked_at.map(|t| t.timestamp_millis()))
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::QueryFailed(e.to_string()))?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn set_checking(&self, service_id: ServiceId) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO service_latest (service_id, status, last_checked_at)
            VALUES (?, ?, NULL)
            ON CONFLICT (service_id) DO UPDATE SET
                status = excluded.status
            "#,
        )
        .bind(service_id)
        .bind(ServiceStatus::Checking.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::QueryFailed(e.to_string()))?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_latest(&self, service_id: ServiceId) -> StoreResult<Option<ServiceLatest>> {
        let row = sqlx::query("SELECT status, last_checked_at FROM service_latest WHERE service_id = ?")
            .bind(service_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StoreError::QueryFailed(e.to_string()))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let status_str: String = row.get("status");
        let status = parse_status(&status_str);
        let last_checked_at: Option<i64> = row.get("last_checked_at");

        Ok(Some(ServiceLatest {
            status,
            last_checked_at: last_checked_at.and_then(DateTime::from_timestamp_millis),
        }))
    }
}

fn parse_status(raw: &str) -> ServiceStatus {
    match raw {
        "alive" => ServiceStatus::Alive,
        "dead" => ServiceStatus::Dead,
        "degraded" => ServiceStatus::Degraded,
        "checking" => ServiceStatus::Checking,
        _ => ServiceStatus::Unknown,
    }
}
