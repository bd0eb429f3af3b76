// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `tether serve`: run the publisher and the console until shutdown.

use std::sync::Arc;

use axum::Router;
use metrics_exporter_prometheus::PrometheusBuilder;
use tracing::{debug, info, warn};

use tether_config::TetherConfig;
use tether_console::{ConsoleSettings, HealthState};
use tether_core::TetherError;

use crate::builtin::Runtime;

/// Runs the `tether serve` command.
pub async fn run_serve(config: TetherConfig) -> Result<(), TetherError> {
    init_tracing(&config.logging.log_level);
    info!("starting tether serve");

    let health = HealthState {
        start_time: std::time::Instant::now(),
        prometheus_render: install_metrics(),
    };

    let runtime = Runtime::boot(&config)?;
    info!(
        path = runtime.publisher.path(),
        registered = runtime.bus.len(),
        tracked = runtime.publisher.snapshot().len(),
        "publisher ready"
    );

    let app = build_app(&config, &runtime, health);
    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| TetherError::Internal(format!("failed to bind console to {addr}: {e}")))?;
    info!("console listening on {addr}");

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| TetherError::Internal(format!("console server error: {e}")));

    runtime.shutdown();
    info!("tether stopped");
    served
}

fn build_app(config: &TetherConfig, runtime: &Runtime, health: HealthState) -> Router {
    if !config.console.enabled {
        debug!("console disabled by configuration");
        let settings = ConsoleSettings::default();
        // health and metrics stay reachable; the console pages are dropped
        return tether_console::router(Arc::clone(&runtime.publisher), &settings, health)
            .route_layer(axum::middleware::from_fn(only_health));
    }
    let settings = ConsoleSettings {
        label: config.console.label.clone(),
        title: config.console.title.clone(),
    };
    tether_console::router(Arc::clone(&runtime.publisher), &settings, health)
}

async fn only_health(
    request: axum::extract::Request,
    next: axum::middleware::Next,
) -> axum::response::Response {
    use axum::response::IntoResponse;

    match request.uri().path() {
        "/health" | "/metrics" => next.run(request).await,
        _ => axum::http::StatusCode::NOT_FOUND.into_response(),
    }
}

/// Install the Prometheus recorder and return a render function for `/metrics`.
fn install_metrics() -> Option<Arc<dyn Fn() -> String + Send + Sync>> {
    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            tether_publisher::recording::register_metrics();
            info!("prometheus metrics recorder installed");
            Some(Arc::new(move || handle.render()))
        }
        Err(e) => {
            warn!(error = %e, "prometheus initialization failed, continuing without metrics");
            None
        }
    }
}

/// Resolves on Ctrl+C, or SIGTERM on unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => info!("received SIGINT (Ctrl+C), initiating shutdown"),
                    _ = sigterm.recv() => info!("received SIGTERM, initiating shutdown"),
                }
            }
            Err(e) => {
                warn!(error = %e, "failed to install SIGTERM handler");
                ctrl_c.await;
                info!("received SIGINT (Ctrl+C), initiating shutdown");
            }
        }
    }

    #[cfg(not(unix))]
    {
        ctrl_c.await;
        info!("received Ctrl+C, initiating shutdown");
    }
}

/// Initialize the tracing subscriber with an env filter.
pub fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("tether={log_level},warn")));

    // a subscriber may already be set (tests, repeated commands)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .try_init();
}
