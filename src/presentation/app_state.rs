// Application state for HTTP handlers
use crate::application::device_service::DeviceService;
use crate::application::metrics_service::MetricsService;
use crate::domain::window::RangeSelector;

#[derive(Clone)]
pub struct AppState {
    pub device_service: DeviceService,
    pub metrics_service: MetricsService,
    pub default_range: RangeSelector,
}
