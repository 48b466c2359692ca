// Repository trait for the device directory and metric history services
use crate::domain::device::Device;
use crate::domain::metric::HostMetrics;
use crate::domain::window::TimeWindow;
use async_trait::async_trait;

/// Failures talking to the device directory or the metric history service.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MonitoringError {
    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("monitoring service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("failed to parse monitoring response: {0}")]
    Parse(String),

    #[error("connection failed: {0}")]
    Connection(String),

    #[error("request timed out")]
    Timeout,
}

impl From<reqwest::Error> for MonitoringError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            MonitoringError::Timeout
        } else if err.is_connect() {
            MonitoringError::Connection(err.to_string())
        } else if err.is_decode() {
            MonitoringError::Parse(err.to_string())
        } else {
            MonitoringError::Http(err.to_string())
        }
    }
}

#[async_trait]
pub trait MonitoringRepository: Send + Sync {
    /// List every device known to the directory
    async fn list_devices(&self) -> Result<Vec<Device>, MonitoringError>;

    /// Fetch all metrics of a host with their history inside `window`
    async fn get_host_metrics(
        &self,
        device_id: &str,
        window: TimeWindow,
    ) -> Result<HostMetrics, MonitoringError>;
}
