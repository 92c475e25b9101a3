//! Service listing — a thin read-only projection over the
//! `ServiceSpecStore`/`ResultSink`, exposed for the dashboard and for
//! operators polling outside the WebSocket stream.

use axum::Json;
use axum::extract::State;

use crate::api::error::{ApiError, ApiResult};
use crate::api::state::ApiState;
use crate::api::types::{ServiceSummary, ServicesResponse};

/// GET /api/v1/services
pub async fn list_services(State(state): State<ApiState>) -> ApiResult<Json<ServicesResponse>> {
    let specs = state
        .spec_store
        .list_all()
        .await
        .map_err(|e| ApiError::StoreError(e.to_string()))?;

    let mut services = Vec::with_capacity(specs.len());
    for spec in specs {
        let latest = state
            .sink
            .get_latest(spec.id)
            .await
            .map_err(|e| ApiError::StoreError(e.to_string()))?
            .unwrap_or_default();

        services.push(ServiceSummary {
            service_id: spec.id,
            host: spec.host,
            status: latest.status,
            last_checked_at: latest.last_checked_at.map(|t| t.to_rfc3339()),
        });
    }

    let count = services.len();
    Ok(Json(ServicesResponse { services, count }))
}
