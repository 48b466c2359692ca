// HTTP repository for the device directory and metric history facade
use crate::application::monitoring_repository::{MonitoringError, MonitoringRepository};
use crate::domain::device::Device;
use crate::domain::metric::HostMetrics;
use crate::domain::window::TimeWindow;
use crate::infrastructure::config::MonitoringSettings;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;

/// Placeholder in `metrics_path` for the device's host id.
const HOST_ID_PLACEHOLDER: &str = "${hostid}";

#[derive(Debug, Clone)]
pub struct HttpMonitoringRepository {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
    devices_path: String,
    metrics_path: String,
}

/// The directory answers with a bare array; some deployments wrap it.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum DeviceListBody {
    List(Vec<Device>),
    Wrapped { devices: Vec<Device> },
}

impl From<DeviceListBody> for Vec<Device> {
    fn from(body: DeviceListBody) -> Self {
        match body {
            DeviceListBody::List(devices) | DeviceListBody::Wrapped { devices } => devices,
        }
    }
}

impl HttpMonitoringRepository {
    pub fn new(settings: &MonitoringSettings) -> Result<Self, MonitoringError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            token: settings.token.clone().filter(|t| !t.is_empty()),
            devices_path: settings.devices_path.clone(),
            metrics_path: settings.metrics_path.clone(),
        })
    }

    fn devices_url(&self) -> String {
        format!("{}{}", self.base_url, self.devices_path)
    }

    fn metrics_url(&self, device_id: &str, window: TimeWindow) -> String {
        let path = self
            .metrics_path
            .replace(HOST_ID_PLACEHOLDER, &urlencoding::encode(device_id));

        format!(
            "{}{}?time_from={}&time_to={}",
            self.base_url,
            path,
            window.from,
            window.to
        )
    }

    async fn execute_get<T: DeserializeOwned>(&self, url: &str) -> Result<T, MonitoringError> {
        let mut request = self.client.get(url).header("Accept", "application/json");
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(MonitoringError::Status { status, body });
        }

        let body = response.text().await?;
        parse_body(&body)
    }
}

fn parse_body<T: DeserializeOwned>(body: &str) -> Result<T, MonitoringError> {
    serde_json::from_str(body).map_err(|e| MonitoringError::Parse(e.to_string()))
}

#[async_trait]
impl MonitoringRepository for HttpMonitoringRepository {
    async fn list_devices(&self) -> Result<Vec<Device>, MonitoringError> {
        let url = self.devices_url();
        tracing::debug!("Listing devices from {}", url);

        let body: DeviceListBody = self.execute_get(&url).await?;
        Ok(body.into())
    }

    async fn get_host_metrics(
        &self,
        device_id: &str,
        window: TimeWindow,
    ) -> Result<HostMetrics, MonitoringError> {
        let url = self.metrics_url(device_id, window);
        tracing::debug!("Querying host metrics: {}", url);

        let body: HostMetrics = self.execute_get(&url).await?;
        tracing::debug!("Got {} metrics for host {}", body.metrics.len(), device_id);
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::{Path, Query, State};
    use axum::http::{header, HeaderMap, StatusCode};
    use axum::response::Html;
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::{json, Value};
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    /// `Authorization` headers received by the fake upstream, in request order.
    type SeenAuth = Arc<Mutex<Vec<Option<String>>>>;

    fn record(seen: &SeenAuth, headers: &HeaderMap) {
        let auth = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        seen.lock().unwrap().push(auth);
    }

    async fn upstream_devices(State(seen): State<SeenAuth>, headers: HeaderMap) -> Json<Value> {
        record(&seen, &headers);
        Json(json!([{"hostid": "10084", "display_name": "Core Router"}]))
    }

    async fn upstream_metrics(
        State(seen): State<SeenAuth>,
        Path(host_id): Path<String>,
        Query(params): Query<HashMap<String, String>>,
        headers: HeaderMap,
    ) -> Json<Value> {
        record(&seen, &headers);
        let param = |name: &str| params.get(name).and_then(|v| v.parse::<i64>().ok());
        Json(json!({
            "hostid": host_id,
            "time_from": param("time_from"),
            "time_to": param("time_to"),
            "metrics": [{
                "itemid": "28001",
                "name": "CPU utilization",
                "key": "system.cpu.util",
                "history": [{"timestamp": 1000, "value": "1.5"}]
            }]
        }))
    }

    async fn spawn_upstream(seen: SeenAuth) -> String {
        let router = Router::new()
            .route("/api/v1/devices", get(upstream_devices))
            .route("/api/v1/zabbix/metrics/:hostid", get(upstream_metrics))
            .route("/down", get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "down") }))
            .route("/html", get(|| async { Html("<html>502 Bad Gateway</html>") }))
            .with_state(seen);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn upstream_settings(base_url: &str, token: Option<&str>, devices_path: &str) -> MonitoringSettings {
        MonitoringSettings {
            base_url: base_url.to_string(),
            token: token.map(str::to_string),
            timeout_secs: 5,
            devices_path: devices_path.to_string(),
            metrics_path: "/api/v1/zabbix/metrics/${hostid}".to_string(),
        }
    }

    fn settings() -> MonitoringSettings {
        MonitoringSettings {
            base_url: "http://ward.local:8000/".to_string(),
            token: Some(String::new()),
            timeout_secs: 5,
            devices_path: "/api/v1/devices".to_string(),
            metrics_path: "/api/v1/zabbix/metrics/${hostid}".to_string(),
        }
    }

    #[test]
    fn test_urls() {
        let repo = HttpMonitoringRepository::new(&settings()).unwrap();

        assert_eq!(repo.devices_url(), "http://ward.local:8000/api/v1/devices");
        assert_eq!(
            repo.metrics_url("10084", TimeWindow { from: 395_600, to: 1_000_000 }),
            "http://ward.local:8000/api/v1/zabbix/metrics/10084?time_from=395600&time_to=1000000"
        );
        assert_eq!(repo.token, None);
    }

    #[test]
    fn test_host_id_is_encoded() {
        let repo = HttpMonitoringRepository::new(&settings()).unwrap();
        let url = repo.metrics_url("edge/01 a", TimeWindow { from: 0, to: 3_600 });

        assert!(url.contains("/metrics/edge%2F01%20a?"), "{url}");
    }

    #[test]
    fn test_parse_device_list_shapes() {
        let bare: DeviceListBody = parse_body(r#"[{"hostid": "1", "hostname": "a"}]"#).unwrap();
        let wrapped: DeviceListBody = parse_body(r#"{"devices": [{"hostid": "2", "ip": "10.0.0.2"}]}"#).unwrap();

        let bare: Vec<Device> = bare.into();
        let wrapped: Vec<Device> = wrapped.into();
        assert_eq!(bare[0].label(), "a");
        assert_eq!(wrapped[0].label(), "10.0.0.2");
    }

    #[test]
    fn test_parse_failure_maps_to_parse_error() {
        let result: Result<HostMetrics, _> = parse_body("<html>502 Bad Gateway</html>");
        assert!(matches!(result, Err(MonitoringError::Parse(_))));
    }

    #[tokio::test]
    async fn test_list_devices_sends_bearer_token() {
        let seen = SeenAuth::default();
        let base_url = spawn_upstream(seen.clone()).await;
        let repo = HttpMonitoringRepository::new(&upstream_settings(&base_url, Some("secret"), "/api/v1/devices")).unwrap();

        let devices = repo.list_devices().await.unwrap();

        assert_eq!(devices.len(), 1);
        assert_eq!(devices[0].label(), "Core Router");
        assert_eq!(*seen.lock().unwrap(), vec![Some("Bearer secret".to_string())]);
    }

    #[tokio::test]
    async fn test_host_metrics_window_and_no_auth_for_empty_token() {
        let seen = SeenAuth::default();
        let base_url = spawn_upstream(seen.clone()).await;
        let repo = HttpMonitoringRepository::new(&upstream_settings(&base_url, Some(""), "/api/v1/devices")).unwrap();

        let body = repo
            .get_host_metrics("10084", TimeWindow { from: 395_600, to: 1_000_000 })
            .await
            .unwrap();

        assert_eq!(body.host_id.as_deref(), Some("10084"));
        assert_eq!(body.time_from, Some(395_600));
        assert_eq!(body.time_to, Some(1_000_000));
        assert_eq!(body.metrics[0].item_id, "28001");
        assert_eq!(*seen.lock().unwrap(), vec![None]);
    }

    #[tokio::test]
    async fn test_non_success_status_keeps_body() {
        let base_url = spawn_upstream(SeenAuth::default()).await;
        let repo = HttpMonitoringRepository::new(&upstream_settings(&base_url, None, "/down")).unwrap();

        let result = repo.list_devices().await;

        assert_eq!(
            result,
            Err(MonitoringError::Status {
                status: 503,
                body: "down".to_string()
            })
        );
    }

    #[tokio::test]
    async fn test_malformed_body_is_parse_error() {
        let base_url = spawn_upstream(SeenAuth::default()).await;
        let repo = HttpMonitoringRepository::new(&upstream_settings(&base_url, None, "/html")).unwrap();

        let result = repo.list_devices().await;

        assert!(matches!(result, Err(MonitoringError::Parse(_))), "{result:?}");
    }
}
