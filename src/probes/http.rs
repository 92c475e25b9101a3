//! HTTP / HTTPS probe.
//!
//! Grounded on the teacher's `ServiceMonitorActor::execute_request` — reuse
//! a `reqwest::Client` per call (a fresh client lets us honor per-spec
//! `sslVerify`/`followRedirects`, which differ per service and can't share
//! one pooled client the way the teacher's single-tenant actor could).

use reqwest::redirect::Policy;
use tracing::trace;

use crate::domain::{HttpProbeConfig, ServiceSpec};

use super::{ProbeOutcome, require_port};

pub async fn probe(spec: &ServiceSpec, cfg: &HttpProbeConfig, scheme: &str) -> ProbeOutcome {
    let port = match require_port(spec) {
        Ok(port) => port,
        Err(outcome) => return outcome,
    };

    let url = format!(
        "{scheme}://{}:{port}{}",
        spec.host,
        cfg.healthcheck_path
    );

    let mut builder = reqwest::Client::builder();
    if scheme == "https" && !cfg.ssl_verify {
        builder = builder.danger_accept_invalid_certs(true);
    }
    builder = builder.redirect(if cfg.follow_redirects {
        Policy::limited(10)
    } else {
        Policy::none()
    });

    let client = match builder.build() {
        Ok(client) => client,
        Err(e) => return ProbeOutcome::dead(format!("failed to build HTTP client: {e}")),
    };

    let method: reqwest::Method = cfg.http_method.clone().into();

    let mut request = client.request(method, &url);
    for (key, value) in &cfg.headers {
        request = request.header(key, value);
    }
    if cfg.http_method.allows_body()
        && let Some(body) = &cfg.body
    {
        request = request.body(body.clone());
    }

    trace!("{url}: sending {} request", cfg.http_method_str());

    let response = match request.send().await {
        Ok(response) => response,
        Err(e) => return ProbeOutcome::dead(format!("HTTP request failed: {e}")),
    };

    ProbeOutcome {
        status: crate::domain::ServiceStatus::Alive,
        status_code: Some(response.status().as_u16()),
        error: None,
    }
}

impl From<crate::domain::HttpMethod> for reqwest::Method {
    fn from(method: crate::domain::HttpMethod) -> Self {
        use crate::domain::HttpMethod::*;
        match method {
            Get => reqwest::Method::GET,
            Post => reqwest::Method::POST,
            Put => reqwest::Method::PUT,
            Delete => reqwest::Method::DELETE,
            Head => reqwest::Method::HEAD,
            Options => reqwest::Method::OPTIONS,
        }
    }
}

impl HttpProbeConfig {
    fn http_method_str(&self) -> &'static str {
        use crate::domain::HttpMethod::*;
        match self.http_method {
            Get => "GET",
            Post => "POST",
            Put => "PUT",
            Delete => "DELETE",
            Head => "HEAD",
            Options => "OPTIONS",
        }
    }
}
