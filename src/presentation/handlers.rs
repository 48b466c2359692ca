// HTTP request handlers
use crate::domain::device::Device;
use crate::domain::window::RangeSelector;
use crate::infrastructure::http_response::{accepts_brotli, json_response};
use crate::presentation::app_state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Default, Deserialize)]
pub struct MetricsQuery {
    pub range: Option<String>,
    pub q: Option<String>,
}

#[derive(Serialize)]
struct DeviceEntry<'a> {
    #[serde(flatten)]
    device: &'a Device,
    label: &'a str,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

async fn respond<T: Serialize>(status: StatusCode, data: &T, compress: bool) -> Response {
    match json_response(status, data, compress).await {
        Ok(response) => response,
        Err(status) => status.into_response(),
    }
}

async fn respond_error(status: StatusCode, error: impl ToString, compress: bool) -> Response {
    let body = ErrorBody {
        error: error.to_string(),
    };
    respond(status, &body, compress).await
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// List all monitored devices with their selector labels
pub async fn list_devices(headers: HeaderMap, State(state): State<Arc<AppState>>) -> Response {
    let compress = accepts_brotli(&headers);

    match state.device_service.list_devices().await {
        Ok(devices) => {
            let entries: Vec<DeviceEntry> = devices
                .iter()
                .map(|device| DeviceEntry {
                    device,
                    label: device.label(),
                })
                .collect();
            respond(StatusCode::OK, &entries, compress).await
        }
        Err(e) => {
            tracing::warn!("Error fetching devices: {}", e);
            respond_error(StatusCode::BAD_GATEWAY, e, compress).await
        }
    }
}

/// Filtered, normalized metric cards for one device over a range
pub async fn get_host_metrics(
    Path(device_id): Path<String>,
    Query(query): Query<MetricsQuery>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Response {
    let compress = accepts_brotli(&headers);

    let range = match query.range.as_deref().map(str::parse::<RangeSelector>).transpose() {
        Ok(range) => range.unwrap_or(state.default_range),
        Err(e) => return respond_error(StatusCode::BAD_REQUEST, e, compress).await,
    };
    let filter = query.q.as_deref().unwrap_or_default();

    match state.metrics_service.get_metrics_view(&device_id, range, filter).await {
        Ok(view) => respond(StatusCode::OK, &view, compress).await,
        Err(e) => {
            tracing::warn!("Error fetching metrics for {}: {}", device_id, e);
            respond_error(StatusCode::BAD_GATEWAY, e, compress).await
        }
    }
}
