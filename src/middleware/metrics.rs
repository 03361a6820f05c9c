use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use super::Middleware;
use crate::events::{AfterExecutionEvent, BeforeExecutionEvent};

/// Call counters and latency, updated with relaxed atomics.
///
/// Canceled calls are counted in [`call_count`](Self::call_count) but never
/// reach the after-channels, so they add no latency sample.
#[derive(Debug, Default)]
pub struct MetricsMiddleware {
    call_count: AtomicUsize,
    completed: AtomicUsize,
    failures: AtomicUsize,
    total_latency_ns: AtomicU64,
}

impl MetricsMiddleware {
    pub fn new() -> Self {
        Self::default()
    }

    /// Calls that reached the before-channel.
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::Relaxed)
    }

    /// Calls that went through the failure channel.
    pub fn failure_count(&self) -> usize {
        self.failures.load(Ordering::Relaxed)
    }

    /// Calls that started but never reached an after-channel.
    pub fn canceled_count(&self) -> usize {
        self.call_count()
            .saturating_sub(self.completed.load(Ordering::Relaxed))
    }

    /// Mean latency over completed calls; zero before the first one.
    pub fn average_latency(&self) -> Duration {
        let count = self.completed.load(Ordering::Relaxed) as u64;
        if count == 0 {
            Duration::from_nanos(0)
        } else {
            Duration::from_nanos(self.total_latency_ns.load(Ordering::Relaxed) / count)
        }
    }

    fn record(&self, event: &AfterExecutionEvent) {
        let nanos = u64::try_from(event.context().elapsed().as_nanos()).unwrap_or(u64::MAX);
        self.total_latency_ns.fetch_add(nanos, Ordering::Relaxed);
        self.completed.fetch_add(1, Ordering::Relaxed);
    }
}

impl Middleware for MetricsMiddleware {
    fn before(&self, _event: &mut BeforeExecutionEvent) -> anyhow::Result<()> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn on_success(&self, event: &mut AfterExecutionEvent) -> anyhow::Result<()> {
        self.record(event);
        Ok(())
    }

    fn on_failure(&self, event: &mut AfterExecutionEvent) -> anyhow::Result<()> {
        self.failures.fetch_add(1, Ordering::Relaxed);
        self.record(event);
        Ok(())
    }
}
