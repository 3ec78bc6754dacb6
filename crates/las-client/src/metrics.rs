//! Request counters
//!
//! - `las_requests_total` (counter): label `status`, one per HTTP attempt
//! - `las_request_retries_total` (counter): label `reason`, one per retry
//!
//! Recorded through the `metrics` facade; without an installed recorder these
//! are no-ops.

/// Record one completed HTTP attempt.
pub fn record_request(status: u16) {
    metrics::counter!("las_requests_total", "status" => status.to_string()).increment(1);
}

/// Record one attempt that failed before a response arrived.
pub fn record_transport_error() {
    metrics::counter!("las_requests_total", "status" => "transport_error").increment(1);
}

/// Record a retry with its classification label.
pub fn record_retry(reason: &str) {
    metrics::counter!("las_request_retries_total", "reason" => reason.to_string()).increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_functions_do_not_panic_without_recorder() {
        record_request(200);
        record_transport_error();
        record_retry("rate_limited");
    }
}
