//! TUI application state: the current service table plus connection and
//! selection bookkeeping, mirroring the teacher's `AppState`.

use std::collections::HashMap;

use crate::api::types::{ServiceSummary, WsFrame};
use crate::domain::{ServiceId, ServiceStatus};

pub struct AppState {
    pub services: HashMap<ServiceId, ServiceSummary>,
    pub selected: usize,
    pub connected: bool,
    pub error_message: Option<String>,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            services: HashMap::new(),
            selected: 0,
            connected: false,
            error_message: None,
        }
    }

    pub fn replace_services(&mut self, services: Vec<ServiceSummary>) {
        self.services = services.into_iter().map(|s| (s.service_id, s)).collect();
    }

    pub fn apply_frame(&mut self, frame: WsFrame) {
        self.connected = true;
        let entry = self.services.entry(frame.service_id).or_insert_with(|| ServiceSummary {
            service_id: frame.service_id,
            host: String::new(),
            status: ServiceStatus::Unknown,
            last_checked_at: None,
        });
        entry.status = frame.status;
        entry.last_checked_at = Some(frame.timestamp.to_rfc3339());
    }

    pub fn sorted_services(&self) -> Vec<&ServiceSummary> {
        let mut rows: Vec<&ServiceSummary> = self.services.values().collect();
        rows.sort_by_key(|s| s.service_id);
        rows
    }

    pub fn select_next(&mut self) {
        let len = self.services.len();
        if len > 0 {
            self.selected = (self.selected + 1) % len;
        }
    }

    pub fn select_previous(&mut self) {
        let len = self.services.len();
        if len > 0 {
            self.selected = if self.selected == 0 { len - 1 } else { self.selected - 1 };
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
