use std::time::Instant;

use axum::{http::Request, middleware::Next, response::Response};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

/// `RUST_LOG` takes precedence over the configured level.
pub fn init_tracing(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    if config.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Installs the global Prometheus recorder. Can only succeed once per process.
pub fn install_metrics_recorder() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new().install_recorder()
}

pub fn record_store_size(len: usize) {
    metrics::gauge!("purchases_stored", len as f64);
}

pub async fn track_requests<B>(req: Request<B>, next: Next<B>) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_owned();
    let started = Instant::now();

    let response = next.run(req).await;

    let elapsed = started.elapsed();
    let status = response.status().as_u16();
    tracing::info!(
        %method,
        %path,
        status,
        elapsed_ms = elapsed.as_millis() as u64,
        "Request handled"
    );
    metrics::increment_counter!(
        "purchases_http_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string()
    );
    metrics::histogram!(
        "purchases_http_request_duration_seconds",
        elapsed.as_secs_f64(),
        "method" => method.to_string()
    );

    response
}
