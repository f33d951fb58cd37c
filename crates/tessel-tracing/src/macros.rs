//! Instrumentation macros.

/// Time the enclosing scope, recording `field = value` pairs on the span.
///
/// The reporting threshold is the process-wide default set by
/// [`crate::init_global_tracing`].
///
/// ```rust
/// use tessel_tracing::perf_span;
///
/// {
///     let _span = perf_span!("compute_work_extent", gx = 100, gy = 64);
///     // ... timed work ...
/// }
/// ```
#[macro_export]
macro_rules! perf_span {
    ($name:expr) => {{
        $crate::performance::PerformanceSpan::new($name, $crate::performance::default_threshold_us())
    }};
    ($name:expr, $($field:tt = $value:expr),+ $(,)?) => {{
        $crate::performance::PerformanceSpan::with_span(
            $name,
            $crate::performance::default_threshold_us(),
            $crate::tracing::debug_span!("perf", name = $name, $($field = $value),+),
        )
    }};
}

/// Emit a debug-level event tagged with `event = name`.
///
/// ```rust
/// use tessel_tracing::perf_event;
///
/// perf_event!("limits_cache_miss", backends = 3);
/// ```
#[macro_export]
macro_rules! perf_event {
    ($name:expr, $($field:tt = $value:expr),+ $(,)?) => {
        $crate::tracing::debug!(event = $name, $($field = $value),+)
    };
}
