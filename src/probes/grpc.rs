//! gRPC probe: call the standard `grpc.health.v1.Health/Check` RPC
//! (§4.3 gRPC). No TLS, per spec.

use crate::domain::{GrpcProbeConfig, ServiceSpec};

use super::{ProbeOutcome, require_port};

#[cfg(feature = "probe-grpc")]
pub async fn probe(spec: &ServiceSpec, cfg: &GrpcProbeConfig) -> ProbeOutcome {
    use tonic_health::pb::HealthCheckRequest;
    use tonic_health::pb::health_check_response::ServingStatus;
    use tonic_health::pb::health_client::HealthClient;

    let port = match require_port(spec) {
        Ok(port) => port,
        Err(outcome) => return outcome,
    };

    let endpoint = format!("http://{}:{port}", spec.host);
    let channel = match tonic::transport::Channel::from_shared(endpoint) {
        Ok(endpoint) => match endpoint.connect().await {
            Ok(channel) => channel,
            Err(e) => return ProbeOutcome::dead(format!("gRPC channel connect failed: {e}")),
        },
        Err(e) => return ProbeOutcome::dead(format!("invalid gRPC endpoint: {e}")),
    };

    let mut client = HealthClient::new(channel);
    let request = tonic::Request::new(HealthCheckRequest {
        service: cfg.healthcheck_path.clone(),
    });

    let response = match client.check(request).await {
        Ok(response) => response.into_inner(),
        Err(e) => return ProbeOutcome::dead(format!("gRPC health check failed: {e}")),
    };

    match ServingStatus::try_from(response.status) {
        Ok(ServingStatus::Serving) => ProbeOutcome::alive(),
        Ok(other) => ProbeOutcome::degraded(format!("gRPC health status: {other:?}")),
        Err(_) => ProbeOutcome::degraded("gRPC health status: unknown"),
    }
}

#[cfg(not(feature = "probe-grpc"))]
pub async fn probe(_spec: &ServiceSpec, _cfg: &GrpcProbeConfig) -> ProbeOutcome {
    ProbeOutcome::dead("gRPC probe requires the probe-grpc feature")
}
