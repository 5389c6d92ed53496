//! Shared plumbing for report handlers.

use std::future::Future;
use std::time::Instant;

use axum::http::StatusCode;

use crate::error::FilterError;
use crate::filters::{ReportFilter, ReportRequest};

/// Validate a request body, answering 400 on bad filters.
pub fn validate(report: &'static str, req: ReportRequest) -> Result<ReportFilter, StatusCode> {
    ReportFilter::try_from(req).map_err(|e| reject(report, e))
}

pub fn reject(report: &'static str, error: FilterError) -> StatusCode {
    tracing::warn!(report, error = %error, "Rejected report filter");
    crate::metrics::filter_rejected(error.kind());
    StatusCode::BAD_REQUEST
}

/// Run a report query. Failures are logged and answered with no rows so the
/// dashboard renders an empty table instead of an error page.
pub async fn collect<T, F>(report: &'static str, query: F) -> Vec<T>
where
    F: Future<Output = anyhow::Result<Vec<T>>>,
{
    let started = Instant::now();
    match query.await {
        Ok(rows) => {
            let elapsed = started.elapsed();
            tracing::debug!(
                report,
                rows = rows.len(),
                elapsed_ms = elapsed.as_millis() as u64,
                "Report served"
            );
            crate::metrics::report_served(report, rows.len(), elapsed);
            rows
        }
        Err(e) => {
            tracing::error!(report, error = %e, "Report query failed");
            crate::metrics::report_failed(report);
            Vec::new()
        }
    }
}
