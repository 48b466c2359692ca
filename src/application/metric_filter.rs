// Metric filter - free-text narrowing by name or key
use crate::domain::metric::RawMetric;

/// Case-insensitive substring matcher over a metric's name and key.
#[derive(Debug, Clone, Default)]
pub struct MetricFilter {
    needle: Option<String>,
}

impl MetricFilter {
    /// A blank query matches everything.
    pub fn new(query: &str) -> Self {
        let needle = (!query.trim().is_empty()).then(|| query.to_lowercase());
        Self { needle }
    }

    pub fn is_identity(&self) -> bool {
        self.needle.is_none()
    }

    pub fn matches(&self, metric: &RawMetric) -> bool {
        match &self.needle {
            None => true,
            Some(needle) => {
                metric.name.to_lowercase().contains(needle.as_str())
                    || metric.key.to_lowercase().contains(needle.as_str())
            }
        }
    }
}

/// Stable subsequence of `metrics` matching `query`; never reorders.
pub fn filter_metrics<'a, I>(metrics: I, query: &str) -> Vec<&'a RawMetric>
where
    I: IntoIterator<Item = &'a RawMetric>,
{
    let filter = MetricFilter::new(query);
    if filter.is_identity() {
        return metrics.into_iter().collect();
    }
    metrics.into_iter().filter(|m| filter.matches(m)).collect()
}
