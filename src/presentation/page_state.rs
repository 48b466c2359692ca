// Page state - Selection, last fetch result and notifications for the metrics page
use std::collections::VecDeque;
use std::time::{Duration, Instant};

use crate::application::metric_filter::filter_metrics;
use crate::application::monitoring_repository::MonitoringError;
use crate::application::normalizer::{build_card, TimeFormatter};
use crate::application::query_orchestrator::{FetchOutcome, MetricQueryOrchestrator};
use crate::domain::dashboard::MetricCard;
use crate::domain::metric::RawMetric;
use crate::domain::window::{RangeSelector, TimeWindow};

/// Notifications older than this are no longer shown.
pub const NOTIFICATION_TTL: Duration = Duration::from_secs(4);
const MAX_NOTIFICATIONS: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageStatus {
    /// Entry state, and the state after the selection is cleared.
    NoDeviceSelected,
    Loading,
    Populated,
    /// The fetch succeeded but nothing survives the filter.
    Empty,
    Failed,
}

#[derive(Debug, thiserror::Error)]
pub enum PageError {
    #[error("Please select a device")]
    NoDeviceSelected,

    #[error(transparent)]
    Fetch(#[from] MonitoringError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Error,
}

#[derive(Debug, Clone)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
    pub raised_at: Instant,
}

#[derive(Debug)]
enum Phase {
    Idle,
    Loading,
    Loaded {
        window: TimeWindow,
        metrics: Vec<RawMetric>,
    },
    Failed(MonitoringError),
}

/// Owns the selection (device, range, filter text), the last settled fetch
/// result and pending notifications. Written only from user input and from
/// fetch completions handed back by the event loop.
pub struct PageState {
    device_id: Option<String>,
    range: RangeSelector,
    filter: String,
    phase: Phase,
    orchestrator: MetricQueryOrchestrator,
    notifications: VecDeque<Notification>,
}

impl PageState {
    pub fn new(orchestrator: MetricQueryOrchestrator, range: RangeSelector) -> Self {
        Self {
            device_id: None,
            range,
            filter: String::new(),
            phase: Phase::Idle,
            orchestrator,
            notifications: VecDeque::new(),
        }
    }

    pub fn device_id(&self) -> Option<&str> {
        self.device_id.as_deref()
    }

    pub fn range(&self) -> RangeSelector {
        self.range
    }

    pub fn filter(&self) -> &str {
        &self.filter
    }

    /// Change the selected device. `None` (or an empty id) clears the page.
    pub fn select_device(&mut self, device_id: Option<String>) {
        let device_id = device_id.filter(|id| !id.is_empty());
        if self.device_id == device_id {
            return;
        }
        self.device_id = device_id;
        self.reload();
    }

    pub fn select_range(&mut self, range: RangeSelector) {
        if self.range == range {
            return;
        }
        self.range = range;
        self.reload();
    }

    /// Narrow the loaded metrics. Never issues a request.
    pub fn set_filter(&mut self, filter: impl Into<String>) {
        self.filter = filter.into();
    }

    /// Re-request the current selection against a fresh window.
    pub fn refresh(&mut self) -> Result<(), PageError> {
        if self.device_id.is_none() {
            let err = PageError::NoDeviceSelected;
            self.notify(NotificationLevel::Error, err.to_string());
            return Err(err);
        }

        self.orchestrator.refetch(self.device_id.as_deref(), self.range);
        self.phase = Phase::Loading;
        Ok(())
    }

    fn reload(&mut self) {
        self.phase = match self.orchestrator.fetch(self.device_id.as_deref(), self.range) {
            Some(_) => Phase::Loading,
            None => Phase::Idle,
        };
    }

    /// Apply a fetch completion. Superseded completions are dropped silently;
    /// failures raise a notification and are returned to the caller.
    pub fn apply(&mut self, outcome: FetchOutcome) -> Result<(), PageError> {
        let Some(outcome) = self.orchestrator.settle(outcome) else {
            return Ok(());
        };

        match outcome.result {
            Ok(metrics) => {
                tracing::debug!(
                    "Loaded {} metrics for {} ({})",
                    metrics.len(),
                    outcome.key.device_id,
                    outcome.key.range
                );
                self.phase = Phase::Loaded {
                    window: outcome.window,
                    metrics,
                };
                Ok(())
            }
            Err(e) => {
                self.notify(NotificationLevel::Error, format!("Failed to load metrics: {}", e));
                self.phase = Phase::Failed(e.clone());
                Err(PageError::Fetch(e))
            }
        }
    }

    pub fn status(&self) -> PageStatus {
        match &self.phase {
            Phase::Idle => PageStatus::NoDeviceSelected,
            Phase::Loading => PageStatus::Loading,
            Phase::Failed(_) => PageStatus::Failed,
            Phase::Loaded { .. } if self.visible_metrics().is_empty() => PageStatus::Empty,
            Phase::Loaded { .. } => PageStatus::Populated,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.orchestrator.is_pending()
    }

    /// Loaded metrics that pass the filter, in source order.
    pub fn visible_metrics(&self) -> Vec<&RawMetric> {
        match &self.phase {
            Phase::Loaded { metrics, .. } => filter_metrics(metrics, &self.filter),
            _ => Vec::new(),
        }
    }

    /// Total metrics in the last successful result, before filtering.
    pub fn loaded_count(&self) -> usize {
        match &self.phase {
            Phase::Loaded { metrics, .. } => metrics.len(),
            _ => 0,
        }
    }

    pub fn cards(&self, formatter: &TimeFormatter) -> Vec<MetricCard> {
        self.visible_metrics()
            .into_iter()
            .map(|metric| build_card(metric, formatter))
            .collect()
    }

    pub fn window(&self) -> Option<TimeWindow> {
        match &self.phase {
            Phase::Loaded { window, .. } => Some(*window),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&MonitoringError> {
        match &self.phase {
            Phase::Failed(e) => Some(e),
            _ => None,
        }
    }

    pub fn notify(&mut self, level: NotificationLevel, message: impl Into<String>) {
        self.notifications.push_back(Notification {
            level,
            message: message.into(),
            raised_at: Instant::now(),
        });
        while self.notifications.len() > MAX_NOTIFICATIONS {
            self.notifications.pop_front();
        }
    }

    /// The newest notification, if it has not expired.
    pub fn current_notification(&self) -> Option<&Notification> {
        self.notifications
            .back()
            .filter(|n| n.raised_at.elapsed() < NOTIFICATION_TTL)
    }
}
