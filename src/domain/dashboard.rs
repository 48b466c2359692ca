// Metric card and page view models
use super::metric::ValueType;
use super::telemetry::{ChartPoint, MetricStats};
use super::window::{RangeSelector, TimeWindow};
use serde::Serialize;

pub const NOT_AVAILABLE: &str = "N/A";
pub const NEVER_UPDATED: &str = "Never";

/// Everything one metric card displays.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricCard {
    pub item_id: String,
    pub name: String,
    pub key: String,
    pub kind: Option<ValueType>,
    pub current_value: String,
    pub units: String,
    pub last_updated: String,
    pub points: Vec<ChartPoint>,
    pub stats: Option<MetricStats>,
}

impl MetricCard {
    /// A stat rendered as it appears under the chart, e.g. `12.50 %`.
    pub fn format_stat(&self, value: f64) -> String {
        if self.units.is_empty() {
            format!("{:.2}", value)
        } else {
            format!("{:.2} {}", value, self.units)
        }
    }

    pub fn has_history(&self) -> bool {
        !self.points.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewStatus {
    Populated,
    Empty,
}

/// A completed, filtered metrics page for one device and window.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsView {
    pub device_id: String,
    pub range: RangeSelector,
    pub window: TimeWindow,
    pub status: ViewStatus,
    pub metrics: Vec<MetricCard>,
}

impl MetricsView {
    pub fn new(device_id: String, range: RangeSelector, window: TimeWindow, metrics: Vec<MetricCard>) -> Self {
        let status = if metrics.is_empty() {
            ViewStatus::Empty
        } else {
            ViewStatus::Populated
        };
        Self {
            device_id,
            range,
            window,
            status,
            metrics,
        }
    }
}
