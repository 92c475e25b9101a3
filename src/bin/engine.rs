//! `guardian-engine` — the long-running health-probing daemon: loads the
//! service catalogue and environment configuration, builds the
//! `ServiceSpecStore`/`ResultSink`, starts the `Scheduler` and `Hub`, and
//! (feature `api`) the HTTP/WebSocket transport adapter.

use std::sync::Arc;

use clap::Parser;
use guardia_topology::config::{EngineConfig, read_catalogue_file};
use guardia_topology::hub::Hub;
use guardia_topology::scheduler::Scheduler;
use guardia_topology::store::memory::MemoryStore;
#[cfg(feature = "storage-sqlite")]
use guardia_topology::store::sqlite::SqliteStore;
use guardia_topology::store::{ResultSink, ServiceSpecStore};
use tracing::{error, info, level_filters::LevelFilter};
use tracing_subscriber::{filter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Clone, Parser)]
#[command(name = "guardian-engine")]
struct Args {
    /// JSON service catalogue file, used when no SQLite store is configured.
    #[arg(short, long)]
    config: Option<String>,

    /// SQLite database path. When set, takes precedence over `--config`.
    #[arg(long)]
    db: Option<String>,

    /// HTTP/WebSocket bind address.
    #[arg(long, default_value = "127.0.0.1:8080")]
    bind: String,
}

fn init_tracing() {
    let filter = filter::EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr).compact())
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    init_tracing();

    let args = Args::parse();
    let engine_cfg = EngineConfig::from_env();
    info!(?engine_cfg, "resolved engine configuration");

    let spec_store: Arc<dyn ServiceSpecStore>;
    let sink: Arc<dyn ResultSink>;

    #[cfg(feature = "storage-sqlite")]
    {
        if let Some(db_path) = args.db.as_deref() {
            let store = Arc::new(SqliteStore::new(db_path).await?);
            SqliteStore::spawn_retention_task(
                store.clone(),
                engine_cfg.result_retention_days,
                engine_cfg.result_cleanup_interval_hours,
            );
            spec_store = store.clone();
            sink = store;
        } else {
            let specs = match args.config.as_deref() {
                Some(path) => read_catalogue_file(path)?,
                None => Vec::new(),
            };
            let store = Arc::new(MemoryStore::new(specs));
            spec_store = store.clone();
            sink = store;
        }
    }

    #[cfg(not(feature = "storage-sqlite"))]
    {
        let specs = match args.config.as_deref() {
            Some(path) => read_catalogue_file(path)?,
            None => Vec::new(),
        };
        let store = Arc::new(MemoryStore::new(specs));
        spec_store = store.clone();
        sink = store;
    }

    let hub = Hub::new(engine_cfg.hub_inbox_cap);

    #[cfg(feature = "api")]
    {
        use guardia_topology::api::{ApiConfig, ApiState, spawn_api_server};

        let api_state = ApiState::new(spec_store.clone(), sink.clone(), hub.clone());
        let api_config = ApiConfig {
            bind_addr: args.bind.parse()?,
            ..Default::default()
        };
        match spawn_api_server(api_config, api_state).await {
            Ok(addr) => info!("API server listening on http://{addr}"),
            Err(e) => error!("failed to start API server: {e}"),
        }
    }

    let scheduler = Arc::new(Scheduler::new(
        spec_store,
        sink,
        hub,
        Some(engine_cfg.sched_tick_sec),
        Some(engine_cfg.max_concurrent_probes),
    ));
    let handle = scheduler.clone().start();

    info!("engine running, press Ctrl+C to shut down");
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("unable to listen for shutdown signal: {e}");
    }

    info!("shutting down scheduler");
    scheduler.stop(handle).await;
    info!("engine stopped");

    Ok(())
}
