// Chart-ready telemetry models derived from raw metric history
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    pub display_time: String,
    pub timestamp: i64,
    pub value: f64,
}

impl ChartPoint {
    pub fn new(display_time: String, timestamp: i64, value: f64) -> Self {
        Self {
            display_time,
            timestamp,
            value,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MetricStats {
    pub min: f64,
    pub avg: f64,
    pub max: f64,
}

impl MetricStats {
    /// Pointwise min/max and arithmetic mean. `None` for an empty sequence.
    pub fn from_points(points: &[ChartPoint]) -> Option<Self> {
        if points.is_empty() {
            return None;
        }

        let (min, max) = points
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), p| {
                (min.min(p.value), max.max(p.value))
            });

        // Opposing infinities have no mean; settle on zero.
        let avg = match (min == f64::NEG_INFINITY, max == f64::INFINITY) {
            (true, true) => 0.0,
            (false, true) => f64::INFINITY,
            (true, false) => f64::NEG_INFINITY,
            (false, false) => running_mean(points).clamp(min, max),
        };

        Some(Self { min, avg, max })
    }
}

/// Mean of finite values without overflowing an intermediate sum.
fn running_mean(points: &[ChartPoint]) -> f64 {
    points.iter().zip(1u32..).fold(0.0, |mean, (p, n)| {
        let n = f64::from(n);
        mean + (p.value / n - mean / n)
    })
}

/// Output of normalizing one metric: ordered points plus their statistics.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct NormalizedSeries {
    pub points: Vec<ChartPoint>,
    pub stats: Option<MetricStats>,
}

impl NormalizedSeries {
    pub fn new(points: Vec<ChartPoint>) -> Self {
        let stats = MetricStats::from_points(&points);
        Self { points, stats }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn points(values: &[f64]) -> Vec<ChartPoint> {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| ChartPoint::new(String::new(), i as i64 * 60, *v))
            .collect()
    }

    #[test]
    fn test_stats_empty_is_none() {
        assert_eq!(MetricStats::from_points(&[]), None);
        assert_eq!(NormalizedSeries::new(Vec::new()).stats, None);
    }

    #[test]
    fn test_stats_min_avg_max() {
        let stats = MetricStats::from_points(&points(&[12.5, 0.0])).unwrap();
        assert_eq!(stats, MetricStats { min: 0.0, avg: 6.25, max: 12.5 });

        let single = MetricStats::from_points(&points(&[-4.0])).unwrap();
        assert_eq!(single, MetricStats { min: -4.0, avg: -4.0, max: -4.0 });
    }

    #[test]
    fn test_stats_ordering_holds() {
        let samples: [&[f64]; 9] = [
            &[1.0, 2.0, 3.0],
            &[-10.0, 5.5, 0.25, 99.0],
            &[0.1, 0.1, 0.1],
            &[1e9, -1e9, 3.0],
            &[f64::INFINITY, f64::NEG_INFINITY],
            &[1.7e308, 1.7e308, -1e308],
            &[-1.7e308, 1.7e308],
            &[f64::INFINITY, 1.0],
            &[f64::NEG_INFINITY, -2.0, 5.0],
        ];
        for values in samples {
            let stats = MetricStats::from_points(&points(values)).unwrap();
            assert!(stats.min <= stats.avg, "{values:?}");
            assert!(stats.avg <= stats.max, "{values:?}");
        }
    }

    #[test]
    fn test_stats_extreme_values() {
        let opposing = MetricStats::from_points(&points(&[f64::INFINITY, f64::NEG_INFINITY])).unwrap();
        assert_eq!(opposing.avg, 0.0);

        let large = MetricStats::from_points(&points(&[1.7e308, 1.7e308, -1e308])).unwrap();
        assert!(large.avg < large.max);
        assert!((large.avg / 8e307 - 1.0).abs() < 1e-9, "{}", large.avg);

        let unbounded = MetricStats::from_points(&points(&[f64::INFINITY, 1.0])).unwrap();
        assert_eq!(unbounded.avg, f64::INFINITY);
        let unbounded_below = MetricStats::from_points(&points(&[f64::NEG_INFINITY, 1.0])).unwrap();
        assert_eq!(unbounded_below.avg, f64::NEG_INFINITY);
    }
}
