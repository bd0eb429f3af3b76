// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP routes for the console.
//!
//! - `GET /{label}`: HTML console page
//! - `GET /{label}/endpoints`, `/{label}/providers`, `/{label}/features`: JSON views
//! - `GET /health`: liveness and tracker state
//! - `GET /metrics`: Prometheus text, when a renderer is wired

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::get,
};
use serde::Serialize;
use tower_http::trace::TraceLayer;

use tether_core::EndpointViews;
use tether_publisher::Publisher;

use crate::html;

/// Console mount settings.
#[derive(Debug, Clone)]
pub struct ConsoleSettings {
    /// Path segment the console is served under.
    pub label: String,
    /// Page title.
    pub title: String,
}

impl Default for ConsoleSettings {
    fn default() -> Self {
        Self {
            label: "tether".to_string(),
            title: "Tether".to_string(),
        }
    }
}

/// State for the unauthenticated health and metrics endpoints.
#[derive(Clone)]
pub struct HealthState {
    pub start_time: std::time::Instant,
    pub prometheus_render: Option<Arc<dyn Fn() -> String + Send + Sync>>,
}

impl Default for HealthState {
    fn default() -> Self {
        Self {
            start_time: std::time::Instant::now(),
            prometheus_render: None,
        }
    }
}

#[derive(Clone)]
pub struct ConsoleState {
    pub publisher: Arc<Publisher>,
    pub title: String,
    pub health: HealthState,
}

/// Response body for `GET /health`.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
    pub tracker: String,
    pub services: usize,
}

/// One provider row in `GET /{label}/providers`.
#[derive(Debug, Serialize)]
pub struct ProviderView {
    #[serde(rename = "type")]
    pub type_name: String,
    pub interfaces: Vec<String>,
}

/// Build the console router.
pub fn router(
    publisher: Arc<Publisher>,
    settings: &ConsoleSettings,
    health: HealthState,
) -> Router {
    let base = format!("/{}", settings.label);
    let state = ConsoleState {
        publisher,
        title: settings.title.clone(),
        health,
    };

    Router::new()
        .route(&base, get(get_console))
        .route(&format!("{base}/endpoints"), get(get_endpoints))
        .route(&format!("{base}/providers"), get(get_providers))
        .route(&format!("{base}/features"), get(get_features))
        .route("/health", get(get_health))
        .route("/metrics", get(get_metrics))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn get_console(State(state): State<ConsoleState>) -> Html<String> {
    tracing::debug!("rendering console page");
    Html(html::render_page(&state.publisher, &state.title))
}

pub async fn get_endpoints(State(state): State<ConsoleState>) -> Json<EndpointViews> {
    Json(state.publisher.endpoint_views())
}

pub async fn get_providers(State(state): State<ConsoleState>) -> Json<Vec<ProviderView>> {
    Json(
        state
            .publisher
            .provider_instances()
            .iter()
            .map(|p| ProviderView {
                type_name: p.declaration().name().to_string(),
                interfaces: p.declaration().interfaces().to_vec(),
            })
            .collect(),
    )
}

pub async fn get_features(State(state): State<ConsoleState>) -> Json<Vec<String>> {
    Json(
        state
            .publisher
            .feature_instances()
            .iter()
            .map(|f| f.declaration().name().to_string())
            .collect(),
    )
}

pub async fn get_health(State(state): State<ConsoleState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.health.start_time.elapsed().as_secs(),
        tracker: state.publisher.tracker_state().to_string(),
        services: state.publisher.snapshot().len(),
    })
}

pub async fn get_metrics(State(state): State<ConsoleState>) -> Response {
    match &state.health.prometheus_render {
        Some(render) => (
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            render(),
        )
            .into_response(),
        None => (StatusCode::NOT_FOUND, "metrics are not enabled").into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_settings() {
        let settings = ConsoleSettings::default();
        assert_eq!(settings.label, "tether");
        assert_eq!(settings.title, "Tether");
    }

    #[test]
    fn provider_view_serializes_type_key() {
        let view = ProviderView {
            type_name: "app.Json".to_string(),
            interfaces: vec!["app.Writer".to_string()],
        };
        let json = serde_json::to_string(&view).unwrap();
        assert_eq!(json, r#"{"type":"app.Json","interfaces":["app.Writer"]}"#);
    }
}
