// TUI app state - Selector cursors, focus and scrolling around the page state
use crate::application::monitoring_repository::MonitoringError;
use crate::application::normalizer::TimeFormatter;
use crate::application::query_orchestrator::FetchOutcome;
use crate::domain::device::Device;
use crate::presentation::page_state::{NotificationLevel, PageState, NOTIFICATION_TTL};
use std::time::Duration;

pub const NO_DEVICE_LABEL: &str = "Select Device...";

/// Which selection control receives arrow keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Device,
    Range,
    Filter,
    Metrics,
}

impl Focus {
    pub fn next(self) -> Self {
        match self {
            Focus::Device => Focus::Range,
            Focus::Range => Focus::Filter,
            Focus::Filter => Focus::Metrics,
            Focus::Metrics => Focus::Device,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            Focus::Device => Focus::Metrics,
            Focus::Range => Focus::Device,
            Focus::Filter => Focus::Range,
            Focus::Metrics => Focus::Filter,
        }
    }
}

pub struct TuiApp {
    pub running: bool,
    pub page: PageState,
    pub formatter: TimeFormatter,

    // Device selector
    pub devices: Vec<Device>,
    pub devices_loading: bool,
    /// Position in the selector: 0 is "Select Device...", `i` is `devices[i - 1]`.
    pub device_index: usize,

    // Navigation
    pub focus: Focus,
    pub filter_editing: bool,
    pub scroll: usize,
    pub show_help: bool,
}

impl TuiApp {
    pub fn new(page: PageState, formatter: TimeFormatter) -> Self {
        Self {
            running: true,
            page,
            formatter,
            devices: Vec::new(),
            devices_loading: true,
            device_index: 0,
            focus: Focus::Device,
            filter_editing: false,
            scroll: 0,
            show_help: false,
        }
    }

    pub fn quit(&mut self) {
        self.running = false;
    }

    /// Select a device by id before the directory has answered (e.g. from the command line).
    pub fn preselect(&mut self, device_id: String) {
        self.page.select_device(Some(device_id));
    }

    pub fn devices_loaded(&mut self, result: Result<Vec<Device>, MonitoringError>) {
        self.devices_loading = false;
        match result {
            Ok(devices) => {
                tracing::info!("Loaded {} devices", devices.len());
                if devices.is_empty() {
                    self.page
                        .notify(NotificationLevel::Info, "No devices reported by the monitoring service");
                }
                self.devices = devices;
                self.device_index = self
                    .page
                    .device_id()
                    .and_then(|id| self.devices.iter().position(|d| d.host_id == id))
                    .map(|i| i + 1)
                    .unwrap_or(0);
            }
            Err(e) => {
                tracing::warn!("Error fetching devices: {}", e);
                self.page
                    .notify(NotificationLevel::Error, format!("Failed to load devices: {}", e));
            }
        }
    }

    pub fn selected_device(&self) -> Option<&Device> {
        self.device_index.checked_sub(1).and_then(|i| self.devices.get(i))
    }

    pub fn selected_device_label(&self) -> String {
        match (self.selected_device(), self.page.device_id()) {
            (Some(device), _) => device.label().to_string(),
            (None, Some(id)) => id.to_string(),
            (None, None) => NO_DEVICE_LABEL.to_string(),
        }
    }

    fn select_device_at(&mut self, index: usize) {
        self.device_index = index;
        self.scroll = 0;
        let device_id = self.selected_device().map(|d| d.host_id.clone());
        self.page.select_device(device_id);
    }

    pub fn next_device(&mut self) {
        let options = self.devices.len() + 1;
        self.select_device_at((self.device_index + 1) % options);
    }

    pub fn prev_device(&mut self) {
        let options = self.devices.len() + 1;
        self.select_device_at((self.device_index + options - 1) % options);
    }

    pub fn clear_device(&mut self) {
        self.select_device_at(0);
    }

    pub fn next_range(&mut self) {
        self.scroll = 0;
        self.page.select_range(self.page.range().next());
    }

    pub fn prev_range(&mut self) {
        self.scroll = 0;
        self.page.select_range(self.page.range().prev());
    }

    pub fn start_filter(&mut self) {
        self.focus = Focus::Filter;
        self.filter_editing = true;
    }

    pub fn finish_filter(&mut self) {
        self.filter_editing = false;
    }

    pub fn push_filter_char(&mut self, c: char) {
        let mut filter = self.page.filter().to_string();
        filter.push(c);
        self.set_filter(filter);
    }

    pub fn pop_filter_char(&mut self) {
        let mut filter = self.page.filter().to_string();
        filter.pop();
        self.set_filter(filter);
    }

    pub fn clear_filter(&mut self) {
        self.set_filter(String::new());
    }

    fn set_filter(&mut self, filter: String) {
        self.scroll = 0;
        self.page.set_filter(filter);
    }

    pub fn refresh(&mut self) {
        if let Err(e) = self.page.refresh() {
            tracing::warn!("Refresh rejected: {}", e);
        }
    }

    pub fn apply_fetch(&mut self, outcome: FetchOutcome) {
        if let Err(e) = self.page.apply(outcome) {
            tracing::warn!("Metrics request failed: {}", e);
        }
    }

    pub fn scroll_down(&mut self) {
        let last_row = self.page.visible_metrics().len().saturating_sub(1) / super::ui::CARDS_PER_ROW;
        self.scroll = (self.scroll + 1).min(last_row);
    }

    pub fn scroll_up(&mut self) {
        self.scroll = self.scroll.saturating_sub(1);
    }

    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    /// Time until the visible notification expires, if one is showing.
    pub fn notification_remaining(&self) -> Option<Duration> {
        self.page
            .current_notification()
            .map(|n| NOTIFICATION_TTL.saturating_sub(n.raised_at.elapsed()))
    }
}
