//! Prometheus metrics for report traffic.

use std::time::Duration;

use metrics::{counter, histogram};

/// Initialize metrics exporter (Prometheus).
pub fn init_metrics() {
    let builder = metrics_exporter_prometheus::PrometheusBuilder::new();
    if let Err(e) = builder.install() {
        tracing::warn!("Failed to install Prometheus exporter: {}", e);
    }
}

/// Record a report answered from the database.
pub fn report_served(report: &'static str, rows: usize, elapsed: Duration) {
    counter!("parts_reports_total", "report" => report, "outcome" => "ok").increment(1);
    histogram!("parts_report_duration_ms", "report" => report)
        .record(elapsed.as_secs_f64() * 1000.0);
    histogram!("parts_report_rows", "report" => report).record(rows as f64);
}

/// Record a report whose query failed and was answered empty.
pub fn report_failed(report: &'static str) {
    counter!("parts_reports_total", "report" => report, "outcome" => "error").increment(1);
}

/// Record a request rejected by filter validation.
pub fn filter_rejected(reason: &'static str) {
    counter!("parts_filter_rejections_total", "reason" => reason).increment(1);
}
