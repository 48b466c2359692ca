// Metric query orchestrator - one active fetch per (device, range) key
use crate::application::monitoring_repository::{MonitoringError, MonitoringRepository};
use crate::domain::metric::RawMetric;
use crate::domain::window::{RangeSelector, TimeWindow};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

const COMPLETION_BUFFER: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey {
    pub device_id: String,
    pub range: RangeSelector,
}

impl QueryKey {
    pub fn new(device_id: impl Into<String>, range: RangeSelector) -> Self {
        Self {
            device_id: device_id.into(),
            range,
        }
    }
}

/// Monotonic id of an issued request; only the newest one may settle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestToken(u64);

#[cfg(test)]
impl RequestToken {
    pub fn from_raw(raw: u64) -> Self {
        RequestToken(raw)
    }
}

/// Completion of a fetch, delivered on the orchestrator's channel.
#[derive(Debug)]
pub struct FetchOutcome {
    pub token: RequestToken,
    pub key: QueryKey,
    pub window: TimeWindow,
    pub result: Result<Vec<RawMetric>, MonitoringError>,
}

struct ActiveFetch {
    token: RequestToken,
    key: QueryKey,
    handle: JoinHandle<()>,
}

/// Issues metric queries in the background and decides which completions are current.
///
/// Completions arrive on an mpsc channel; the owner passes each one back through
/// [`settle`](Self::settle), which drops anything but the newest request.
pub struct MetricQueryOrchestrator {
    repository: Arc<dyn MonitoringRepository>,
    completions: mpsc::Sender<FetchOutcome>,
    last_token: u64,
    active: Option<ActiveFetch>,
}

impl MetricQueryOrchestrator {
    pub fn new(repository: Arc<dyn MonitoringRepository>, completions: mpsc::Sender<FetchOutcome>) -> Self {
        Self {
            repository,
            completions,
            last_token: 0,
            active: None,
        }
    }

    /// Orchestrator plus the receiver its completions arrive on.
    pub fn channel(repository: Arc<dyn MonitoringRepository>) -> (Self, mpsc::Receiver<FetchOutcome>) {
        let (tx, rx) = mpsc::channel(COMPLETION_BUFFER);
        (Self::new(repository, tx), rx)
    }

    /// Request metrics for `(device_id, range)`.
    ///
    /// Without a device nothing is issued and `None` is returned. A request
    /// already in flight for the same key is reused.
    pub fn fetch(&mut self, device_id: Option<&str>, range: RangeSelector) -> Option<RequestToken> {
        let Some(device_id) = device_id else {
            self.cancel();
            return None;
        };

        let key = QueryKey::new(device_id, range);
        if let Some(active) = &self.active {
            if active.key == key {
                return Some(active.token);
            }
        }

        Some(self.issue(key))
    }

    /// Like [`fetch`](Self::fetch) but always issues a new request against a freshly resolved window.
    pub fn refetch(&mut self, device_id: Option<&str>, range: RangeSelector) -> Option<RequestToken> {
        let Some(device_id) = device_id else {
            self.cancel();
            return None;
        };

        Some(self.issue(QueryKey::new(device_id, range)))
    }

    fn issue(&mut self, key: QueryKey) -> RequestToken {
        self.cancel();

        self.last_token += 1;
        let token = RequestToken(self.last_token);
        let window = TimeWindow::resolve(key.range);

        tracing::debug!(
            "Issuing metrics request {:?} for {} ({}..{})",
            token,
            key.device_id,
            window.from,
            window.to
        );

        let repository = self.repository.clone();
        let completions = self.completions.clone();
        let task_key = key.clone();

        let handle = tokio::spawn(async move {
            let result = repository
                .get_host_metrics(&task_key.device_id, window)
                .await
                .map(|body| body.metrics);

            let outcome = FetchOutcome {
                token,
                key: task_key,
                window,
                result,
            };
            if completions.send(outcome).await.is_err() {
                tracing::debug!("Completion receiver dropped before request {:?} finished", token);
            }
        });

        self.active = Some(ActiveFetch { token, key, handle });
        token
    }

    /// Abort the active request, if any. Its completion, should it still arrive, is stale.
    pub fn cancel(&mut self) {
        if let Some(active) = self.active.take() {
            tracing::debug!("Cancelling metrics request {:?} for {}", active.token, active.key.device_id);
            active.handle.abort();
        }
    }

    /// Accept a completion if it belongs to the active request; stale ones yield `None`.
    pub fn settle(&mut self, outcome: FetchOutcome) -> Option<FetchOutcome> {
        match &self.active {
            Some(active) if active.token == outcome.token => {
                self.active = None;
                Some(outcome)
            }
            _ => {
                tracing::debug!(
                    "Discarding stale metrics response {:?} for {}",
                    outcome.token,
                    outcome.key.device_id
                );
                None
            }
        }
    }

    pub fn is_pending(&self) -> bool {
        self.active.is_some()
    }
}

impl Drop for MetricQueryOrchestrator {
    fn drop(&mut self) {
        self.cancel();
    }
}
