//! Client metrics
//!
//! Emitted through the `metrics` facade; no-ops until the application
//! installs a recorder.
//!
//! - `crm_http_requests_total` (counter): labels `method`, `status`
//! - `crm_http_request_duration_seconds` (histogram): label `method`
//! - `crm_token_refresh_total` (counter): label `outcome`
//! - `crm_transport_errors_total` (counter): label `error_type`

/// Outcome labels for `crm_token_refresh_total`.
pub mod outcome {
    pub const SUCCESS: &str = "success";
    pub const SHARED: &str = "shared";
    pub const NO_REFRESH_TOKEN: &str = "no_refresh_token";
    pub const FAILED: &str = "failed";
}

/// Record one send that produced a response.
pub fn record_request(method: &str, status: u16, duration_secs: f64) {
    metrics::counter!("crm_http_requests_total", "method" => method.to_string(), "status" => status.to_string())
        .increment(1);
    metrics::histogram!("crm_http_request_duration_seconds", "method" => method.to_string())
        .record(duration_secs);
}

pub fn record_refresh(outcome: &'static str) {
    metrics::counter!("crm_token_refresh_total", "outcome" => outcome).increment(1);
}

/// Record a send that produced no response.
pub fn record_transport_error(error_type: &'static str) {
    metrics::counter!("crm_transport_errors_total", "error_type" => error_type).increment(1);
}

/// Classify a reqwest failure for the `error_type` label.
pub(crate) fn classify(err: &reqwest::Error) -> &'static str {
    if err.is_timeout() {
        "timeout"
    } else if err.is_connect() {
        "connection"
    } else {
        "other"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle, PrometheusRecorder};

    fn isolated_recorder() -> (PrometheusRecorder, PrometheusHandle) {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();
        (recorder, handle)
    }

    #[test]
    fn calls_are_noops_without_recorder() {
        record_request("GET", 200, 0.01);
        record_refresh(outcome::SUCCESS);
        record_transport_error("timeout");
    }

    #[test]
    fn request_counter_carries_method_and_status() {
        let (recorder, handle) = isolated_recorder();
        let _guard = metrics::set_default_local_recorder(&recorder);

        record_request("GET", 200, 0.02);
        record_request("POST", 401, 0.1);

        let output = handle.render();
        assert!(output.contains("crm_http_requests_total"));
        assert!(output.contains("method=\"GET\""));
        assert!(output.contains("status=\"401\""));
        assert!(output.contains("crm_http_request_duration_seconds"));
    }

    #[test]
    fn refresh_and_transport_counters_labelled() {
        let (recorder, handle) = isolated_recorder();
        let _guard = metrics::set_default_local_recorder(&recorder);

        record_refresh(outcome::SHARED);
        record_refresh(outcome::FAILED);
        record_transport_error("connection");

        let output = handle.render();
        assert!(output.contains("crm_token_refresh_total"));
        assert!(output.contains("outcome=\"shared\""));
        assert!(output.contains("outcome=\"failed\""));
        assert!(output.contains("error_type=\"connection\""));
    }
}
