//! Metrics and observability utilities
//!
//! Provides metric name constants and registration with standardized
//! naming conventions. Exporter wiring is left to the embedding process.

use metrics::{describe_counter, describe_histogram, Unit};
use std::time::Instant;

/// Metrics prefix for all MarkScout metrics
pub const METRICS_PREFIX: &str = "markscout";

/// Total questions processed through the pipeline
pub const QUESTIONS_TOTAL: &str = "markscout_questions_total";

/// Total registry lookups issued (one per refined keyword)
pub const REGISTRY_SEARCHES_TOTAL: &str = "markscout_registry_searches_total";

/// Registry lookup latency in seconds
pub const REGISTRY_SEARCH_DURATION: &str = "markscout_registry_search_duration_seconds";

/// Model-variant failures that advanced the fallback chain
pub const MODEL_FALLBACKS_TOTAL: &str = "markscout_model_fallbacks_total";

/// Pipeline runs that ended in a terminal keyword-absence error
pub const TERMINAL_ERRORS_TOTAL: &str = "markscout_terminal_errors_total";

/// Register all metric descriptions
pub fn register_metrics() {
    describe_counter!(QUESTIONS_TOTAL, Unit::Count, "Total questions processed");

    describe_counter!(
        REGISTRY_SEARCHES_TOTAL,
        Unit::Count,
        "Total registry lookups issued"
    );

    describe_histogram!(
        REGISTRY_SEARCH_DURATION,
        Unit::Seconds,
        "Registry lookup latency in seconds"
    );

    describe_counter!(
        MODEL_FALLBACKS_TOTAL,
        Unit::Count,
        "Model-variant failures that advanced the fallback chain"
    );

    describe_counter!(
        TERMINAL_ERRORS_TOTAL,
        Unit::Count,
        "Pipeline runs ending in a terminal keyword-absence error"
    );
}

/// Timer that records a histogram observation on drop
pub struct Timer {
    name: &'static str,
    start: Instant,
}

impl Timer {
    pub fn start(name: &'static str) -> Self {
        Self {
            name,
            start: Instant::now(),
        }
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        metrics::histogram!(self.name).record(self.start.elapsed().as_secs_f64());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_names_are_prefixed() {
        for name in [
            QUESTIONS_TOTAL,
            REGISTRY_SEARCHES_TOTAL,
            REGISTRY_SEARCH_DURATION,
            MODEL_FALLBACKS_TOTAL,
            TERMINAL_ERRORS_TOTAL,
        ] {
            assert!(name.starts_with(METRICS_PREFIX));
        }
    }

    #[test]
    fn test_timer_records_without_panic() {
        register_metrics();
        let timer = Timer::start(REGISTRY_SEARCH_DURATION);
        drop(timer);
    }
}
