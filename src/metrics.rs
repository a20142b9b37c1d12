use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters describing parse service activity.
#[derive(Default)]
pub struct ParseMetrics {
    requests_served: AtomicU64,
    questions_parsed: AtomicU64,
    cache_hits: AtomicU64,
}

impl ParseMetrics {
    /// Create an empty metrics accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a request that ran the extraction engine.
    pub fn record_parse(&self, question_count: u64) {
        self.requests_served.fetch_add(1, Ordering::Relaxed);
        self.questions_parsed
            .fetch_add(question_count, Ordering::Relaxed);
    }

    /// Record a request answered from the response cache.
    pub fn record_cache_hit(&self) {
        self.requests_served.fetch_add(1, Ordering::Relaxed);
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    /// Return a snapshot of the current counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            requests_served: self.requests_served.load(Ordering::Relaxed),
            questions_parsed: self.questions_parsed.load(Ordering::Relaxed),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
        }
    }
}

/// Immutable view of parse counters used for reporting.
#[derive(Debug, Clone, Copy, serde::Serialize)]
pub struct MetricsSnapshot {
    /// Requests handled since startup, cached or not.
    pub requests_served: u64,
    /// Total questions produced by non-cached parses.
    pub questions_parsed: u64,
    /// Requests answered from the response cache.
    pub cache_hits: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_parses_and_cache_hits() {
        let metrics = ParseMetrics::new();
        metrics.record_parse(3);
        metrics.record_parse(2);
        metrics.record_cache_hit();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.requests_served, 3);
        assert_eq!(snapshot.questions_parsed, 5);
        assert_eq!(snapshot.cache_hits, 1);
    }

    #[test]
    fn snapshot_starts_at_zero() {
        let snapshot = ParseMetrics::new().snapshot();
        assert_eq!(snapshot.requests_served, 0);
        assert_eq!(snapshot.questions_parsed, 0);
        assert_eq!(snapshot.cache_hits, 0);
    }
}
