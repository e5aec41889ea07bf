//! Prometheus metrics for the schema automation.

use metrics::counter;

/// Initialize metrics exporter (Prometheus).
pub fn init_metrics() {
    let builder = metrics_exporter_prometheus::PrometheusBuilder::new();
    if let Err(e) = builder.install() {
        tracing::warn!("Failed to install Prometheus exporter: {}", e);
    }
}

/// Record an incoming event or command.
pub fn event_received(kind: &str) {
    counter!("schema_events_received_total", "kind" => kind.to_string()).increment(1);
}

/// Record a fingerprint publish attempt.
pub fn fingerprint_published(outcome: &'static str) {
    counter!("schema_fingerprints_published_total", "outcome" => outcome).increment(1);
}

/// Record a before-commit fingerprint that could not be published.
/// These never reach chat, so this counter is the only place they show.
pub fn backfill_failed() {
    counter!("schema_backfill_failures_total").increment(1);
}

/// Record a schema deploy.
pub fn deploy_completed(environment: &'static str, outcome: &'static str) {
    counter!("schema_deploys_total", "environment" => environment, "outcome" => outcome)
        .increment(1);
}

/// Record a chat message that could not be delivered.
pub fn message_failed(kind: &'static str) {
    counter!("schema_message_failures_total", "kind" => kind).increment(1);
}
