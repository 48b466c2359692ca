// Metrics service - Use case for building a device's metric page
use crate::application::metric_filter::filter_metrics;
use crate::application::monitoring_repository::{MonitoringError, MonitoringRepository};
use crate::application::normalizer::{build_card, TimeFormatter};
use crate::domain::dashboard::MetricsView;
use crate::domain::window::{RangeSelector, TimeWindow};
use std::sync::Arc;

#[derive(Clone)]
pub struct MetricsService {
    repository: Arc<dyn MonitoringRepository>,
    formatter: TimeFormatter,
}

impl MetricsService {
    pub fn new(repository: Arc<dyn MonitoringRepository>, formatter: TimeFormatter) -> Self {
        Self {
            repository,
            formatter,
        }
    }

    /// Resolve the window, fetch the host's metrics, filter them and build cards.
    pub async fn get_metrics_view(
        &self,
        device_id: &str,
        range: RangeSelector,
        query: &str,
    ) -> Result<MetricsView, MonitoringError> {
        let window = TimeWindow::resolve(range);
        tracing::debug!(
            "Fetching metrics for {} over {} ({}..{})",
            device_id,
            range,
            window.from,
            window.to
        );

        let host_metrics = self.repository.get_host_metrics(device_id, window).await?;

        let cards = filter_metrics(&host_metrics.metrics, query)
            .into_iter()
            .map(|metric| build_card(metric, &self.formatter))
            .collect();

        Ok(MetricsView::new(device_id.to_string(), range, window, cards))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::monitoring_repository::testing::FakeRepository;
    use crate::domain::dashboard::ViewStatus;
    use crate::domain::metric::{RawMetric, RawSample};

    fn service(repo: FakeRepository) -> (MetricsService, Arc<FakeRepository>) {
        let repo = Arc::new(repo);
        let service = MetricsService::new(repo.clone(), TimeFormatter::from_offset_minutes(Some(0)));
        (service, repo)
    }

    fn host_metrics() -> Vec<RawMetric> {
        vec![
            RawMetric::new("1", "CPU utilization", "system.cpu.util")
                .with_units("%")
                .with_last_value(12.0)
                .with_history(vec![RawSample::new(1000, "10"), RawSample::new(1060, "14")]),
            RawMetric::new("2", "Free memory", "vm.memory.size[available]"),
        ]
    }

    #[tokio::test]
    async fn test_view_is_filtered_and_normalized() {
        let (service, repo) = service(FakeRepository::new().with_metrics("10084", host_metrics()));

        let view = service
            .get_metrics_view("10084", RangeSelector::LastWeek, "cpu")
            .await
            .unwrap();

        assert_eq!(view.status, ViewStatus::Populated);
        assert_eq!(view.metrics.len(), 1);
        assert_eq!(view.metrics[0].current_value, "12.00");
        assert_eq!(view.metrics[0].stats.unwrap().avg, 12.0);
        assert_eq!(view.window.duration_secs(), 604_800);

        let requested = repo.requested_windows();
        assert_eq!(requested, vec![("10084".to_string(), view.window)]);
    }

    #[tokio::test]
    async fn test_view_empty_after_filter() {
        let (service, _) = service(FakeRepository::new().with_metrics("10084", host_metrics()));

        let view = service
            .get_metrics_view("10084", RangeSelector::LastHour, "disk")
            .await
            .unwrap();

        assert_eq!(view.status, ViewStatus::Empty);
        assert!(view.metrics.is_empty());
    }

    #[tokio::test]
    async fn test_view_surfaces_fetch_failure() {
        let error = MonitoringError::Status {
            status: 500,
            body: "zabbix unreachable".to_string(),
        };
        let (service, _) = service(FakeRepository::new().with_metrics_error("10084", error.clone()));

        let result = service.get_metrics_view("10084", RangeSelector::LastDay, "").await;
        assert_eq!(result.unwrap_err(), error);
    }
}
