// Series normalizer - Raw metric history to chart points, stats and card values
use crate::domain::dashboard::{MetricCard, NEVER_UPDATED, NOT_AVAILABLE};
use crate::domain::metric::{coerce, RawMetric, SampleValue};
use crate::domain::telemetry::{ChartPoint, NormalizedSeries};
use chrono::{DateTime, FixedOffset, Local, Offset};

const INVALID_DATE: &str = "Invalid Date";

/// Renders epoch seconds in the operator's display offset.
#[derive(Debug, Clone, Copy)]
pub struct TimeFormatter {
    offset: FixedOffset,
}

impl TimeFormatter {
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    /// Current offset of the local timezone.
    pub fn local() -> Self {
        Self::new(Local::now().offset().fix())
    }

    /// Offset in minutes east of UTC, falling back to local time when out of range.
    pub fn from_offset_minutes(minutes: Option<i32>) -> Self {
        minutes
            .and_then(|m| m.checked_mul(60))
            .and_then(FixedOffset::east_opt)
            .map(Self::new)
            .unwrap_or_else(Self::local)
    }

    fn at(&self, timestamp: i64) -> Option<DateTime<FixedOffset>> {
        DateTime::from_timestamp(timestamp, 0).map(|t| t.with_timezone(&self.offset))
    }

    pub fn time_of_day(&self, timestamp: i64) -> String {
        self.at(timestamp)
            .map(|t| t.format("%H:%M:%S").to_string())
            .unwrap_or_else(|| INVALID_DATE.to_string())
    }

    pub fn date_time(&self, timestamp: i64) -> String {
        self.at(timestamp)
            .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| INVALID_DATE.to_string())
    }
}

/// Convert one metric's history into ordered chart points plus min/avg/max.
///
/// One point per sample, in source order. Unparseable values become `0.0`.
pub fn normalize(metric: &RawMetric, formatter: &TimeFormatter) -> NormalizedSeries {
    let points = metric
        .history
        .iter()
        .map(|sample| {
            ChartPoint::new(
                formatter.time_of_day(sample.timestamp),
                sample.timestamp,
                coerce(sample.value.as_ref()),
            )
        })
        .collect();

    NormalizedSeries::new(points)
}

/// Timestamp of the last sample in source order, or `Never`.
pub fn last_updated(metric: &RawMetric, formatter: &TimeFormatter) -> String {
    metric
        .history
        .last()
        .map(|sample| formatter.date_time(sample.timestamp))
        .unwrap_or_else(|| NEVER_UPDATED.to_string())
}

/// Current value as displayed: numbers to two decimals, text verbatim, `N/A` when absent.
pub fn current_value(metric: &RawMetric) -> String {
    match &metric.last_value {
        Some(SampleValue::Number(n)) => format!("{:.2}", n),
        Some(SampleValue::Text(text)) if !text.is_empty() => text.clone(),
        _ => NOT_AVAILABLE.to_string(),
    }
}

pub fn build_card(metric: &RawMetric, formatter: &TimeFormatter) -> MetricCard {
    let series = normalize(metric, formatter);

    MetricCard {
        item_id: metric.item_id.clone(),
        name: metric.name.clone(),
        key: metric.key.clone(),
        kind: metric.kind(),
        current_value: current_value(metric),
        units: metric.units.clone().unwrap_or_default(),
        last_updated: last_updated(metric, formatter),
        points: series.points,
        stats: series.stats,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::metric::RawSample;
    use crate::domain::telemetry::MetricStats;

    fn formatter() -> TimeFormatter {
        TimeFormatter::from_offset_minutes(Some(0))
    }

    #[test]
    fn test_normalize_with_coercion_fallback() {
        let metric = RawMetric::new("1", "CPU", "system.cpu").with_history(vec![
            RawSample::new(1000, "12.5"),
            RawSample::new(2000, "bad"),
        ]);

        let series = normalize(&metric, &formatter());

        assert_eq!(
            series.points,
            vec![
                ChartPoint::new("00:16:40".to_string(), 1000, 12.5),
                ChartPoint::new("00:33:20".to_string(), 2000, 0.0),
            ]
        );
        assert_eq!(series.stats, Some(MetricStats { min: 0.0, avg: 6.25, max: 12.5 }));
    }

    #[test]
    fn test_normalize_empty_history() {
        let metric = RawMetric::new("1", "CPU", "system.cpu");
        let series = normalize(&metric, &formatter());

        assert!(series.points.is_empty());
        assert_eq!(series.stats, None);
    }

    #[test]
    fn test_normalize_preserves_source_order() {
        let metric = RawMetric::new("1", "Load", "system.load").with_history(vec![
            RawSample::new(300, 3.0),
            RawSample::new(100, 1.0),
            RawSample::new(200, 2.0),
        ]);

        let timestamps: Vec<i64> = normalize(&metric, &formatter())
            .points
            .iter()
            .map(|p| p.timestamp)
            .collect();
        assert_eq!(timestamps, vec![300, 100, 200]);
    }

    #[test]
    fn test_missing_sample_value_is_zero() {
        let metric = RawMetric::new("1", "Ping", "icmpping").with_history(vec![RawSample {
            timestamp: 60,
            value: None,
        }]);
        assert_eq!(normalize(&metric, &formatter()).points[0].value, 0.0);
    }

    #[test]
    fn test_absent_values_use_sentinels() {
        let metric = RawMetric::new("1", "Agent", "agent.ping");
        let card = build_card(&metric, &formatter());

        assert_eq!(card.current_value, "N/A");
        assert_eq!(card.last_updated, "Never");
        assert_eq!(card.units, "");
        assert!(!card.has_history());
    }

    #[test]
    fn test_last_updated_uses_final_sample_in_source_order() {
        let metric = RawMetric::new("1", "Load", "system.load").with_history(vec![
            RawSample::new(86_400, 1.0),
            RawSample::new(0, 2.0),
        ]);
        assert_eq!(last_updated(&metric, &formatter()), "1970-01-01 00:00:00");
    }

    #[test]
    fn test_current_value_formatting() {
        let numeric = RawMetric::new("1", "Temp", "sensor.temp").with_last_value(21.456);
        assert_eq!(current_value(&numeric), "21.46");

        let zero = RawMetric::new("1", "Errors", "net.errors").with_last_value(0.0);
        assert_eq!(current_value(&zero), "0.00");

        let text = RawMetric::new("1", "Uptime", "system.uptime").with_last_value("12.5");
        assert_eq!(current_value(&text), "12.5");

        let version = RawMetric::new("1", "Version", "agent.version").with_last_value("7.0.1");
        assert_eq!(current_value(&version), "7.0.1");

        let empty = RawMetric::new("1", "Version", "agent.version").with_last_value("");
        assert_eq!(current_value(&empty), "N/A");
    }

    #[test]
    fn test_display_offset() {
        let plus_two = TimeFormatter::from_offset_minutes(Some(120));
        assert_eq!(plus_two.time_of_day(0), "02:00:00");
        assert_eq!(plus_two.date_time(0), "1970-01-01 02:00:00");

        assert_eq!(formatter().time_of_day(i64::MAX), "Invalid Date");
    }

    #[test]
    fn test_card_stats_format_with_units() {
        let metric = RawMetric::new("1", "CPU", "system.cpu.util")
            .with_units("%")
            .with_last_value(37.0)
            .with_history(vec![RawSample::new(1000, 10.0), RawSample::new(1060, 20.0)]);

        let card = build_card(&metric, &formatter());
        let stats = card.stats.unwrap();

        assert_eq!(card.format_stat(stats.min), "10.00 %");
        assert_eq!(card.format_stat(stats.avg), "15.00 %");
        assert_eq!(card.format_stat(stats.max), "20.00 %");
        assert_eq!(card.last_updated, "1970-01-01 00:17:40");
    }
}
