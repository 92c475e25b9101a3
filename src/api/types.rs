//! Wire-facing response types shared between the HTTP routes and the
//! viewer binary (§6.3 wire format).

use serde::{Deserialize, Serialize};

use crate::domain::{ServiceId, ServiceStatus};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceSummary {
    pub service_id: ServiceId,
    pub host: String,
    pub status: ServiceStatus,
    pub last_checked_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServicesResponse {
    pub services: Vec<ServiceSummary>,
    pub count: usize,
}

/// The exact frame written to each WebSocket subscriber — one per
/// `StatusUpdate`, additive-only evolution per §6.3.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WsFrame {
    pub service_id: ServiceId,
    pub status: ServiceStatus,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl From<crate::domain::StatusUpdate> for WsFrame {
    fn from(update: crate::domain::StatusUpdate) -> Self {
        Self {
            service_id: update.service_id,
            status: update.status,
            timestamp: update.timestamp,
        }
    }
}
