use dashmap::DashMap;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Global metrics collector for the application.
///
/// Tracks request latency, cache performance, and per-provider call counts.
/// Thread-safe and cheap to clone.
#[derive(Clone)]
pub struct Metrics {
    inner: Arc<MetricsInner>,
}

struct MetricsInner {
    // Request metrics
    requests_total: AtomicUsize,
    request_latency_ms: RwLock<Vec<u64>>,

    // Cache metrics
    cache_hits: AtomicUsize,
    cache_misses: AtomicUsize,
    cache_size: AtomicUsize,

    // Per-provider call counters: (success, failure)
    provider_calls: DashMap<String, (AtomicUsize, AtomicUsize)>,

    // Per-endpoint request counters
    endpoint_counters: DashMap<String, AtomicUsize>,

    // Start time for uptime calculation
    start_time: Instant,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(MetricsInner {
                requests_total: AtomicUsize::new(0),
                request_latency_ms: RwLock::new(Vec::new()),
                cache_hits: AtomicUsize::new(0),
                cache_misses: AtomicUsize::new(0),
                cache_size: AtomicUsize::new(0),
                provider_calls: DashMap::new(),
                endpoint_counters: DashMap::new(),
                start_time: Instant::now(),
            }),
        }
    }

    pub fn record_request(&self, duration: Duration) {
        self.inner.requests_total.fetch_add(1, Ordering::Relaxed);
        self.inner
            .request_latency_ms
            .write()
            .push(duration.as_millis() as u64);
    }

    // Cache metrics
    pub fn record_cache_hit(&self) {
        self.inner.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cache_miss(&self) {
        self.inner.cache_misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn update_cache_size(&self, size: usize) {
        self.inner.cache_size.store(size, Ordering::Relaxed);
    }

    // Provider metrics
    pub fn record_provider_call(&self, provider: &str, success: bool) {
        let entry = self
            .inner
            .provider_calls
            .entry(provider.to_string())
            .or_insert_with(|| (AtomicUsize::new(0), AtomicUsize::new(0)));
        let (successes, failures) = entry.value();
        if success {
            successes.fetch_add(1, Ordering::Relaxed);
        } else {
            failures.fetch_add(1, Ordering::Relaxed);
        }
    }

    // Endpoint metrics
    pub fn record_endpoint_request(&self, endpoint: &str) {
        self.inner
            .endpoint_counters
            .entry(endpoint.to_string())
            .or_insert_with(|| AtomicUsize::new(0))
            .fetch_add(1, Ordering::Relaxed);
    }

    // Get snapshot for reporting
    pub fn snapshot(&self) -> MetricsSnapshot {
        let latency = self.inner.request_latency_ms.read();
        let latency_avg = avg(&latency);
        let latency_p50 = percentile(&latency, 0.5);
        let latency_p95 = percentile(&latency, 0.95);
        let latency_p99 = percentile(&latency, 0.99);
        drop(latency);

        let cache_hits = self.inner.cache_hits.load(Ordering::Relaxed);
        let cache_misses = self.inner.cache_misses.load(Ordering::Relaxed);
        let cache_total = cache_hits + cache_misses;
        let cache_hit_rate = if cache_total > 0 {
            cache_hits as f64 / cache_total as f64
        } else {
            0.0
        };

        let providers = self
            .inner
            .provider_calls
            .iter()
            .map(|entry| {
                (
                    entry.key().clone(),
                    ProviderCounters {
                        success: entry.value().0.load(Ordering::Relaxed),
                        failure: entry.value().1.load(Ordering::Relaxed),
                    },
                )
            })
            .collect();

        MetricsSnapshot {
            requests_total: self.inner.requests_total.load(Ordering::Relaxed),
            request_latency_avg_ms: latency_avg,
            request_latency_p50_ms: latency_p50,
            request_latency_p95_ms: latency_p95,
            request_latency_p99_ms: latency_p99,
            cache_hits,
            cache_misses,
            cache_hit_rate,
            cache_size: self.inner.cache_size.load(Ordering::Relaxed),
            providers,
            uptime_seconds: self.inner.start_time.elapsed().as_secs(),
        }
    }

    /// Generate Prometheus-format metrics
    pub fn to_prometheus(&self) -> String {
        let snapshot = self.snapshot();
        let mut out = format!(
            r#"# HELP requests_total Total number of translation requests
# TYPE requests_total counter
requests_total {{}} {}

# HELP request_latency_avg_ms Average request latency in milliseconds
# TYPE request_latency_avg_ms gauge
request_latency_avg_ms {{}} {}

# HELP cache_hits_total Translation cache hits
# TYPE cache_hits_total counter
cache_hits_total {{}} {}

# HELP cache_misses_total Translation cache misses
# TYPE cache_misses_total counter
cache_misses_total {{}} {}

# HELP cache_hit_rate Cache hit rate (0.0 to 1.0)
# TYPE cache_hit_rate gauge
cache_hit_rate {{}} {}

# HELP cache_size Current cache size
# TYPE cache_size gauge
cache_size {{}} {}

# HELP uptime_seconds Application uptime in seconds
# TYPE uptime_seconds counter
uptime_seconds {{}} {}
"#,
            snapshot.requests_total,
            snapshot.request_latency_avg_ms,
            snapshot.cache_hits,
            snapshot.cache_misses,
            snapshot.cache_hit_rate,
            snapshot.cache_size,
            snapshot.uptime_seconds,
        );

        for (provider, counters) in &snapshot.providers {
            out.push_str(&format!(
                "\nprovider_calls_total {{provider=\"{}\",outcome=\"success\"}} {}\nprovider_calls_total {{provider=\"{}\",outcome=\"failure\"}} {}\n",
                provider, counters.success, provider, counters.failure,
            ));
        }

        out
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderCounters {
    pub success: usize,
    pub failure: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub requests_total: usize,
    pub request_latency_avg_ms: u64,
    pub request_latency_p50_ms: u64,
    pub request_latency_p95_ms: u64,
    pub request_latency_p99_ms: u64,
    pub cache_hits: usize,
    pub cache_misses: usize,
    pub cache_hit_rate: f64,
    pub cache_size: usize,
    pub providers: std::collections::HashMap<String, ProviderCounters>,
    pub uptime_seconds: u64,
}

fn percentile(values: &[u64], p: f64) -> u64 {
    if values.is_empty() {
        return 0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_unstable();
    let idx = ((values.len() as f64 - 1.0) * p) as usize;
    sorted[idx]
}

fn avg(values: &[u64]) -> u64 {
    if values.is_empty() {
        return 0;
    }
    values.iter().sum::<u64>() / values.len() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_recording() {
        let metrics = Metrics::new();

        metrics.record_request(Duration::from_millis(100));
        metrics.record_cache_hit();
        metrics.record_cache_miss();
        metrics.update_cache_size(5);
        metrics.record_provider_call("local", false);
        metrics.record_provider_call("remote", true);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.requests_total, 1);
        assert_eq!(snapshot.cache_hits, 1);
        assert_eq!(snapshot.cache_misses, 1);
        assert_eq!(snapshot.cache_hit_rate, 0.5);
        assert_eq!(snapshot.cache_size, 5);
        assert_eq!(snapshot.providers["local"].failure, 1);
        assert_eq!(snapshot.providers["remote"].success, 1);
    }

    #[test]
    fn test_prometheus_format() {
        let metrics = Metrics::new();
        metrics.record_request(Duration::from_millis(100));
        metrics.record_provider_call("remote", true);

        let prometheus = metrics.to_prometheus();
        assert!(prometheus.contains("requests_total {} 1"));
        assert!(prometheus.contains("provider_calls_total {provider=\"remote\",outcome=\"success\"} 1"));
    }
}
