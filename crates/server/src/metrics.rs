//! Prometheus metrics

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use loan_agent_core::{ApprovalStatus, LoanType};

/// Install the Prometheus recorder. Returns `None` when a recorder is
/// already installed (e.g. in tests).
pub fn init_metrics() -> Option<PrometheusHandle> {
    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => Some(handle),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to install metrics recorder");
            None
        }
    }
}

/// Record one processed turn.
pub fn record_turn(loan_type: LoanType, latency_ms: f64) {
    metrics::counter!("loan_agent_turns_total", "loan_type" => loan_type.as_str()).increment(1);
    metrics::histogram!("loan_agent_turn_latency_ms", "loan_type" => loan_type.as_str())
        .record(latency_ms);
}

/// Record a validation rejection surfaced to the user.
pub fn record_rejection(loan_type: LoanType) {
    metrics::counter!("loan_agent_rejections_total", "loan_type" => loan_type.as_str())
        .increment(1);
}

/// Record a completed decision.
pub fn record_decision(loan_type: LoanType, status: ApprovalStatus) {
    metrics::counter!(
        "loan_agent_decisions_total",
        "loan_type" => loan_type.as_str(),
        "status" => status.as_str()
    )
    .increment(1);
}

/// Record a turn that failed with an internal error.
pub fn record_turn_error(loan_type: LoanType) {
    metrics::counter!("loan_agent_turn_errors_total", "loan_type" => loan_type.as_str())
        .increment(1);
}
