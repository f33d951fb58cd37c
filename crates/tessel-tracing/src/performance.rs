//! Timing spans for work-division hot paths.
//!
//! Whether spans report, and the default reporting threshold, are process
//! wide; [`crate::init_global_tracing`] sets them from the installed
//! [`crate::TracingConfig`].

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Instant;

static ENABLED: AtomicBool = AtomicBool::new(cfg!(debug_assertions));

// 0 means "no threshold"
static DEFAULT_THRESHOLD_US: AtomicU64 = AtomicU64::new(0);

/// Set whether performance spans report and the threshold `perf_span!` uses
pub fn configure(enabled: bool, default_threshold_us: Option<u64>) {
    ENABLED.store(enabled, Ordering::Relaxed);
    DEFAULT_THRESHOLD_US.store(default_threshold_us.unwrap_or(0), Ordering::Relaxed);
}

pub fn is_enabled() -> bool {
    ENABLED.load(Ordering::Relaxed)
}

/// Threshold applied by `perf_span!`
pub fn default_threshold_us() -> Option<u64> {
    match DEFAULT_THRESHOLD_US.load(Ordering::Relaxed) {
        0 => None,
        threshold => Some(threshold),
    }
}

/// RAII guard that times a span and logs its duration on drop.
///
/// Nothing is logged when performance tracing is disabled or the duration
/// stays below `threshold_us`.
#[derive(Debug)]
pub struct PerformanceSpan {
    name: String,
    threshold_us: Option<u64>,
    start_time: Instant,
    span: tracing::Span,
    enabled: bool,
}

impl PerformanceSpan {
    /// Time a fresh `perf` span called `name`.
    pub fn new(name: impl Into<String>, threshold_us: Option<u64>) -> Self {
        let name = name.into();
        let span = tracing::debug_span!("perf", name = %name);
        Self::with_span(name, threshold_us, span)
    }

    /// Time an already-built span, keeping the fields recorded on it.
    pub fn with_span(name: impl Into<String>, threshold_us: Option<u64>, span: tracing::Span) -> Self {
        Self {
            name: name.into(),
            threshold_us,
            start_time: Instant::now(),
            span,
            enabled: is_enabled(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn elapsed_us(&self) -> u64 {
        u64::try_from(self.start_time.elapsed().as_micros()).unwrap_or(u64::MAX)
    }

    fn should_report(&self, elapsed_us: u64) -> bool {
        self.enabled && self.threshold_us.map_or(true, |threshold| elapsed_us >= threshold)
    }
}

impl Drop for PerformanceSpan {
    fn drop(&mut self) {
        let elapsed_us = self.elapsed_us();
        if self.should_report(elapsed_us) {
            let _entered = self.span.enter();
            tracing::debug!(duration_us = elapsed_us, "performance_span_complete");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_span_keeps_name_and_threshold() {
        let span = PerformanceSpan::new("partition", Some(50));
        assert_eq!(span.name(), "partition");
        assert_eq!(span.threshold_us, Some(50));
    }

    #[test]
    fn test_span_elapsed() {
        let span = PerformanceSpan::new("sleep", None);
        thread::sleep(Duration::from_millis(5));
        assert!(span.elapsed_us() >= 5_000);
    }

    #[test]
    fn test_threshold_gates_reporting() {
        let mut span = PerformanceSpan::new("gate", Some(100));
        span.enabled = true;
        assert!(!span.should_report(99));
        assert!(span.should_report(100));
        span.enabled = false;
        assert!(!span.should_report(1_000));
    }
}
