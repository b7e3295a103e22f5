//! Dispatch metrics.
//!
//! Metrics are recorded through the `metrics` facade. They cost nothing
//! until the application installs a recorder (for example a Prometheus
//! exporter).
//!
//! | Metric | Type | Labels | Description |
//! |--------|------|--------|-------------|
//! | `httprpc_requests_total` | Counter | `outcome` | Requests seen by the dispatcher |
//! | `httprpc_request_duration_seconds` | Histogram | `outcome` | Time from dispatch to response |

use metrics::{counter, describe_counter, describe_histogram, histogram};
use std::fmt;
use std::time::Duration;

/// Request counter name.
pub const REQUESTS_TOTAL: &str = "httprpc_requests_total";

/// Request duration histogram name.
pub const REQUEST_DURATION_SECONDS: &str = "httprpc_request_duration_seconds";

/// How the dispatcher resolved a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DispatchOutcome {
    /// A registered endpoint handled the request.
    Matched,
    /// No route matched and no fallback was set.
    NotFound,
    /// No route matched and the fallback handled the request.
    Fallback,
    /// The path matched but not the method.
    MethodNotAllowed,
}

impl DispatchOutcome {
    /// The label value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Matched => "matched",
            Self::NotFound => "not_found",
            Self::Fallback => "fallback",
            Self::MethodNotAllowed => "method_not_allowed",
        }
    }
}

impl fmt::Display for DispatchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Registers descriptions for the dispatch metrics with the installed
/// recorder.
pub fn describe_metrics() {
    describe_counter!(REQUESTS_TOTAL, "Total number of requests seen by the dispatcher");
    describe_histogram!(
        REQUEST_DURATION_SECONDS,
        "Time from dispatch to response in seconds"
    );
}

/// Records one dispatched request.
pub fn record_dispatch(outcome: DispatchOutcome, duration: Duration) {
    counter!(REQUESTS_TOTAL, "outcome" => outcome.as_str()).increment(1);
    histogram!(REQUEST_DURATION_SECONDS, "outcome" => outcome.as_str())
        .record(duration.as_secs_f64());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_labels() {
        assert_eq!(DispatchOutcome::Matched.as_str(), "matched");
        assert_eq!(DispatchOutcome::NotFound.as_str(), "not_found");
        assert_eq!(DispatchOutcome::Fallback.as_str(), "fallback");
        assert_eq!(DispatchOutcome::MethodNotAllowed.to_string(), "method_not_allowed");
    }

    #[test]
    fn test_record_without_recorder() {
        describe_metrics();
        record_dispatch(DispatchOutcome::Matched, Duration::from_millis(3));
    }
}
