//! Per-bot run-time counters

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Monotonic counters owned by one bot
///
/// Atomic so a bot shared behind an `Arc` can be executed from several
/// tasks at once without losing increments.
#[derive(Debug, Default)]
pub struct BotCounters {
    total: AtomicU64,
    successful: AtomicU64,
    failed: AtomicU64,
    latency_micros: AtomicU64,
}

impl BotCounters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the outcome of one logical execution
    pub fn record(&self, success: bool, elapsed: Duration) {
        self.total.fetch_add(1, Ordering::Relaxed);
        if success {
            self.successful.fetch_add(1, Ordering::Relaxed);
        } else {
            self.failed.fetch_add(1, Ordering::Relaxed);
        }
        let micros = u64::try_from(elapsed.as_micros()).unwrap_or(u64::MAX);
        self.latency_micros.fetch_add(micros, Ordering::Relaxed);
    }

    /// Point-in-time snapshot with derived ratios
    pub fn snapshot(&self, bot_id: u32) -> BotMetrics {
        BotMetrics::from_counts(
            bot_id,
            self.total.load(Ordering::Relaxed),
            self.successful.load(Ordering::Relaxed),
            self.failed.load(Ordering::Relaxed),
            Duration::from_micros(self.latency_micros.load(Ordering::Relaxed)).as_secs_f64(),
        )
    }
}

/// Metrics snapshot for one bot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BotMetrics {
    pub bot_id: u32,
    pub total_requests: u64,
    pub successful_requests: u64,
    pub failed_requests: u64,
    /// Cumulative seconds spent in execute calls
    pub total_response_time: f64,
    /// Successful requests as a percentage of all requests
    pub success_rate: f64,
    /// Mean seconds per request
    pub avg_response_time: f64,
}

impl BotMetrics {
    /// Build a snapshot, deriving the ratios; both are 0 when nothing ran
    pub fn from_counts(
        bot_id: u32,
        total_requests: u64,
        successful_requests: u64,
        failed_requests: u64,
        total_response_time: f64,
    ) -> Self {
        let (success_rate, avg_response_time) = if total_requests > 0 {
            let total = total_requests as f64;
            (
                successful_requests as f64 / total * 100.0,
                total_response_time / total,
            )
        } else {
            (0.0, 0.0)
        };

        Self {
            bot_id,
            total_requests,
            successful_requests,
            failed_requests,
            total_response_time,
            success_rate,
            avg_response_time,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_counters_yield_zero_ratios() {
        let metrics = BotCounters::new().snapshot(3);
        assert_eq!(metrics.bot_id, 3);
        assert_eq!(metrics.total_requests, 0);
        assert_eq!(metrics.success_rate, 0.0);
        assert_eq!(metrics.avg_response_time, 0.0);
    }

    #[test]
    fn test_ratios_follow_counts() {
        let counters = BotCounters::new();
        counters.record(true, Duration::from_millis(500));
        counters.record(true, Duration::from_millis(1500));
        counters.record(false, Duration::from_millis(1000));
        counters.record(true, Duration::from_millis(1000));

        let metrics = counters.snapshot(1);
        assert_eq!(metrics.total_requests, 4);
        assert_eq!(metrics.successful_requests, 3);
        assert_eq!(metrics.failed_requests, 1);
        assert!((metrics.total_response_time - 4.0).abs() < 1e-9);
        assert!((metrics.success_rate - 75.0).abs() < 1e-9);
        assert!((metrics.avg_response_time - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_concurrent_records_are_not_lost() {
        let counters = std::sync::Arc::new(BotCounters::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let counters = counters.clone();
                std::thread::spawn(move || {
                    for _ in 0..100 {
                        counters.record(i % 2 == 0, Duration::from_micros(10));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let metrics = counters.snapshot(0);
        assert_eq!(metrics.total_requests, 800);
        assert_eq!(metrics.successful_requests, 400);
        assert_eq!(metrics.failed_requests, 400);
    }
}
