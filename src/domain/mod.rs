// Domain layer - Devices, raw metrics, windows and chart-ready views
pub mod dashboard;
pub mod device;
pub mod metric;
pub mod telemetry;
pub mod window;
