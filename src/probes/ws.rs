//! WebSocket / WSS probe: connect, send a ping frame, wait for any response
//! frame before the deadline (§4.3 WebSocket/WSS).

use std::sync::Arc;

use futures::{SinkExt, StreamExt};
use tokio_tungstenite::Connector;
use tokio_tungstenite::connect_async_tls_with_config;
use tokio_tungstenite::tungstenite::Message;

use crate::domain::{ServiceSpec, WsProbeConfig};

use super::{ProbeOutcome, require_port};

/// A `ServerCertVerifier` that accepts any certificate, used only when the
/// spec explicitly disables SSL verification for a WSS probe.
#[derive(Debug)]
struct AcceptAnyCert;

impl rustls::client::danger::ServerCertVerifier for AcceptAnyCert {
    fn verify_server_cert(
        &self,
        _end_entity: &rustls::pki_types::CertificateDer<'_>,
        _intermediates: &[rustls::pki_types::CertificateDer<'_>],
        _server_name: &rustls::pki_types::ServerName<'_>,
        _ocsp_response: &[u8],
        _now: rustls::pki_types::UnixTime,
    ) -> Result<rustls::client::danger::ServerCertVerified, rustls::Error> {
        Ok(rustls::client::danger::ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        _message: &[u8],
        _cert: &rustls::pki_types::CertificateDer<'_>,
        _dss: &rustls::DigitallySignedStruct,
    ) -> Result<rustls::client::danger::HandshakeSignatureValid, rustls::Error> {
        Ok(rustls::client::danger::HandshakeSignatureValid::assertion())
    }

    fn verify_tls13_signature(
        &self,
        _message: &[u8],
        _cert: &rustls::pki_types::CertificateDer<'_>,
        _dss: &rustls::DigitallySignedStruct,
    ) -> Result<rustls::client::danger::HandshakeSignatureValid, rustls::Error> {
        Ok(rustls::client::danger::HandshakeSignatureValid::assertion())
    }

    fn supported_verify_schemes(&self) -> Vec<rustls::SignatureScheme> {
        rustls::crypto::ring::default_provider()
            .signature_verification_algorithms
            .supported_schemes()
    }
}

fn insecure_tls_connector() -> Result<Connector, rustls::Error> {
    let config = rustls::ClientConfig::builder()
        .dangerous()
        .with_custom_certificate_verifier(Arc::new(AcceptAnyCert))
        .with_no_client_auth();
    Ok(Connector::Rustls(Arc::new(config)))
}

pub async fn probe(spec: &ServiceSpec, cfg: &WsProbeConfig, scheme: &str) -> ProbeOutcome {
    let port = match require_port(spec) {
        Ok(port) => port,
        Err(outcome) => return outcome,
    };

    let url = format!("{scheme}://{}:{port}{}", spec.host, cfg.healthcheck_path);

    let connector = if scheme == "wss" && !cfg.ssl_verify {
        match insecure_tls_connector() {
            Ok(connector) => Some(connector),
            Err(e) => return ProbeOutcome::dead(format!("failed to build TLS connector: {e}")),
        }
    } else {
        None
    };

    let (mut stream, _response) =
        match connect_async_tls_with_config(&url, None, false, connector).await {
            Ok(pair) => pair,
            Err(e) => return ProbeOutcome::dead(format!("WebSocket connect failed: {e}")),
        };

    if let Err(e) = stream.send(Message::Ping(Vec::new())).await {
        return ProbeOutcome::dead(format!("failed to send ping frame: {e}"));
    }

    match stream.next().await {
        Some(Ok(_)) => ProbeOutcome::alive(),
        Some(Err(e)) => ProbeOutcome::dead(format!("WebSocket read failed: {e}")),
        None => ProbeOutcome::dead("WebSocket connection closed before any response frame"),
    }
}
