use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use once_cell::sync::OnceCell;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

static TRACING_INIT: OnceCell<()> = OnceCell::new();

#[derive(Debug, Default)]
pub struct AppMetrics {
    requests_total: AtomicU64,
    reviews_analyzed_total: AtomicU64,
    published_total: AtomicU64,
    rejected_total: AtomicU64,
    failed_items_total: AtomicU64,
    batches_total: AtomicU64,
    total_latency_micros: AtomicU64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsSnapshot {
    pub requests_total: u64,
    pub reviews_analyzed_total: u64,
    pub published_total: u64,
    pub rejected_total: u64,
    pub failed_items_total: u64,
    pub batches_total: u64,
    pub avg_analysis_latency_micros: f64,
}

impl AppMetrics {
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn inc_request(&self) {
        self.requests_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_decision(&self, published: bool) {
        self.reviews_analyzed_total.fetch_add(1, Ordering::Relaxed);
        if published {
            self.published_total.fetch_add(1, Ordering::Relaxed);
        } else {
            self.rejected_total.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn add_failed_items(&self, count: usize) {
        self.failed_items_total
            .fetch_add(count as u64, Ordering::Relaxed);
    }

    pub fn inc_batch(&self) {
        self.batches_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn observe_latency(&self, duration: Duration) {
        self.total_latency_micros
            .fetch_add(duration.as_micros() as u64, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let analyzed = self.reviews_analyzed_total.load(Ordering::Relaxed);
        let latency = self.total_latency_micros.load(Ordering::Relaxed);

        MetricsSnapshot {
            requests_total: self.requests_total.load(Ordering::Relaxed),
            reviews_analyzed_total: analyzed,
            published_total: self.published_total.load(Ordering::Relaxed),
            rejected_total: self.rejected_total.load(Ordering::Relaxed),
            failed_items_total: self.failed_items_total.load(Ordering::Relaxed),
            batches_total: self.batches_total.load(Ordering::Relaxed),
            avg_analysis_latency_micros: if analyzed == 0 {
                0.0
            } else {
                latency as f64 / analyzed as f64
            },
        }
    }
}

pub fn init_tracing(service_name: &str) {
    TRACING_INIT.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}=info,review_engine=info,review_api=info,review_storage=info",
                service_name
            ))
        });

        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_current_span(true)
            .with_span_list(true)
            .init();
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_tracks_decisions_and_latency() {
        let metrics = AppMetrics::default();
        metrics.inc_request();
        metrics.record_decision(true);
        metrics.record_decision(false);
        metrics.record_decision(true);
        metrics.add_failed_items(2);
        metrics.inc_batch();
        metrics.observe_latency(Duration::from_micros(300));

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.requests_total, 1);
        assert_eq!(snapshot.reviews_analyzed_total, 3);
        assert_eq!(snapshot.published_total, 2);
        assert_eq!(snapshot.rejected_total, 1);
        assert_eq!(snapshot.failed_items_total, 2);
        assert_eq!(snapshot.batches_total, 1);
        assert_eq!(snapshot.avg_analysis_latency_micros, 100.0);
    }

    #[test]
    fn empty_snapshot_has_zero_latency() {
        assert_eq!(AppMetrics::default().snapshot().avg_analysis_latency_micros, 0.0);
    }
}
