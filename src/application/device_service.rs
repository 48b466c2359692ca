// Device service - Use case for listing monitored devices
use crate::application::monitoring_repository::{MonitoringError, MonitoringRepository};
use crate::domain::device::Device;
use std::sync::Arc;

#[derive(Clone)]
pub struct DeviceService {
    repository: Arc<dyn MonitoringRepository>,
}

impl DeviceService {
    pub fn new(repository: Arc<dyn MonitoringRepository>) -> Self {
        Self { repository }
    }

    pub async fn list_devices(&self) -> Result<Vec<Device>, MonitoringError> {
        let devices = self.repository.list_devices().await?;
        tracing::debug!("Device directory returned {} devices", devices.len());
        Ok(devices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::monitoring_repository::testing::FakeRepository;

    #[tokio::test]
    async fn test_list_devices() {
        let repo = FakeRepository::new().with_devices(vec![
            Device::new("10084").with_hostname("edge-01"),
            Device::new("10085").with_ip("10.0.0.2"),
        ]);
        let service = DeviceService::new(Arc::new(repo));

        let devices = service.list_devices().await.unwrap();
        let labels: Vec<&str> = devices.iter().map(Device::label).collect();
        assert_eq!(labels, vec!["edge-01", "10.0.0.2"]);
    }

    #[tokio::test]
    async fn test_list_devices_failure_propagates() {
        let repo = FakeRepository::new().with_device_error(MonitoringError::Timeout);
        let service = DeviceService::new(Arc::new(repo));

        assert_eq!(service.list_devices().await, Err(MonitoringError::Timeout));
    }
}
