//! Client metrics definitions
//!
//! OpenTelemetry instruments for the dispatcher. They are recorded through
//! the global meter, so nothing is exported unless
//! [`clnwire_core::init_observability`] installed a meter provider.
//!
//! # Metrics Collected
//!
//! - **calls_total**: calls that reached the daemon, by method and status (counter)
//! - **call_duration**: round-trip latency in seconds (histogram)
//! - **errors_total**: failed calls by error kind (counter)
//! - **timeouts_total**: calls whose deadline expired (counter)
//! - **late_responses_total**: responses with no pending call (counter)
//! - **notifications_received**: daemon notifications (counter)
//! - **pending_calls**: calls awaiting a response (gauge)

use opentelemetry::{
    global,
    metrics::{Counter, Gauge, Histogram, Meter},
    KeyValue,
};

/// Client metrics for monitoring
pub struct ClientMetrics {
    pub calls_total: Counter<u64>,
    /// Seconds from write to response
    pub call_duration: Histogram<f64>,
    pub errors_total: Counter<u64>,
    pub timeouts_total: Counter<u64>,
    pub late_responses_total: Counter<u64>,
    pub notifications_received: Counter<u64>,
    pub pending_calls: Gauge<u64>,
}

impl ClientMetrics {
    /// Metrics on the global meter named `service_name`
    pub fn new(service_name: impl Into<String>) -> Self {
        let name: &'static str = Box::leak(service_name.into().into_boxed_str());
        let meter = global::meter(name);
        Self::new_with_meter(&meter)
    }

    pub fn new_with_meter(meter: &Meter) -> Self {
        Self {
            calls_total: meter
                .u64_counter("clnwire.client.calls.total")
                .with_description("Total number of calls sent to the daemon")
                .build(),
            call_duration: meter
                .f64_histogram("clnwire.client.call.duration")
                .with_description("Call round-trip duration in seconds")
                .build(),
            errors_total: meter
                .u64_counter("clnwire.client.errors.total")
                .with_description("Total number of failed calls")
                .build(),
            timeouts_total: meter
                .u64_counter("clnwire.client.timeouts.total")
                .with_description("Total number of calls whose deadline expired")
                .build(),
            late_responses_total: meter
                .u64_counter("clnwire.client.late_responses.total")
                .with_description("Responses discarded because no call was waiting")
                .build(),
            notifications_received: meter
                .u64_counter("clnwire.client.notifications.received")
                .with_description("Total number of notifications received")
                .build(),
            pending_calls: meter
                .u64_gauge("clnwire.client.pending_calls")
                .with_description("Calls awaiting a response")
                .build(),
        }
    }

    /// Record a finished round trip
    pub fn record_call(&self, method: &str, status: &str, duration_secs: f64) {
        let attributes = &[
            KeyValue::new("method", method.to_string()),
            KeyValue::new("status", status.to_string()),
        ];
        self.calls_total.add(1, attributes);
        self.call_duration.record(duration_secs, attributes);
    }

    /// Record a failure, labelled with [`clnwire_core::Error::kind`]
    pub fn record_error(&self, method: &str, kind: &str) {
        let attributes = &[
            KeyValue::new("method", method.to_string()),
            KeyValue::new("kind", kind.to_string()),
        ];
        self.errors_total.add(1, attributes);
    }

    pub fn record_timeout(&self, method: &str) {
        self.timeouts_total
            .add(1, &[KeyValue::new("method", method.to_string())]);
    }

    pub fn record_late_response(&self) {
        self.late_responses_total.add(1, &[]);
    }

    pub fn record_notification(&self, method: &str) {
        let attributes = &[KeyValue::new("method", method.to_string())];
        self.notifications_received.add(1, attributes);
    }

    pub fn update_pending(&self, count: usize) {
        self.pending_calls.record(count as u64, &[]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_creation() {
        let metrics = ClientMetrics::new("test-client");

        // Without a meter provider these are no-ops; they must not panic
        metrics.record_call("invoice", "success", 0.05);
        metrics.record_error("invoice", "conflict");
        metrics.record_timeout("fundchannel");
        metrics.record_late_response();
        metrics.record_notification("progress");
        metrics.update_pending(3);
    }

    #[test]
    fn test_call_metrics() {
        let metrics = ClientMetrics::new("test-client-calls");

        metrics.record_call("txprepare", "success", 0.02);
        metrics.record_call("utxopsbt", "error", 0.01);
        metrics.record_error("utxopsbt", "insufficient_funds");
        metrics.record_error("setchannel", "validation");
    }
}
