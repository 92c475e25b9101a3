//! Engine configuration: JSON service catalogue plus the environment
//! variable surface (§6.4), loaded the way the teacher's `config.rs`
//! loads its own `Config` via `read_config_file` + `serde_json`.

use tracing::trace;

use crate::domain::ServiceSpec;

/// On-disk shape of the service catalogue consumed when no external
/// `ServiceSpecStore` is wired in.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct CatalogueFile {
    pub services: Vec<ServiceSpec>,
}

pub fn read_catalogue_file(path: &str) -> anyhow::Result<Vec<ServiceSpec>> {
    let content = std::fs::read_to_string(path)?;
    let catalogue: CatalogueFile = serde_json::from_str(&content)
        .map_err(|e| anyhow::anyhow!("invalid service catalogue file: {e}"))?;
    trace!("loaded {} services from {}", catalogue.services.len(), path);
    Ok(catalogue.services)
}

/// Resolved environment-variable surface for one engine run (§6.4, plus
/// the ambient/supplement additions from the design notes).
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub sched_tick_sec: u64,
    pub hub_inbox_cap: usize,
    pub max_concurrent_probes: usize,
    pub result_retention_days: u32,
    pub result_cleanup_interval_hours: u32,
}

impl EngineConfig {
    pub fn from_env() -> Self {
        Self {
            sched_tick_sec: env_u64("SCHED_TICK_SEC", 5),
            hub_inbox_cap: env_usize("HUB_INBOX_CAP", 100),
            max_concurrent_probes: env_usize("MAX_CONCURRENT_PROBES", 64),
            result_retention_days: env_u32("RESULT_RETENTION_DAYS", 0),
            result_cleanup_interval_hours: env_u32("RESULT_CLEANUP_INTERVAL_HOURS", 24),
        }
    }
}

fn env_u64(name: &str, default: u64) -> u64 {
    std::env::var(name).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn env_u32(name: &str, default: u32) -> u32 {
    std::env::var(name).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn env_usize(name: &str, default: usize) -> usize {
    std::env::var(name).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}
