//! Metrics registration and Prometheus export

use anyhow::Result;
use metrics::describe_counter;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

pub const LOGINS: &str = "fittrack_logins_total";
pub const LOGIN_LOCKOUTS: &str = "fittrack_login_lockouts_total";
pub const PLAN_MATCHES: &str = "fittrack_plan_matches_total";
pub const AI_REQUESTS: &str = "fittrack_ai_requests_total";

/// Install the global Prometheus recorder. Call once at startup.
pub fn install_prometheus() -> Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| anyhow::anyhow!("Failed to install Prometheus recorder: {}", e))?;
    describe_metrics();
    Ok(handle)
}

fn describe_metrics() {
    describe_counter!(LOGINS, "Login attempts by outcome");
    describe_counter!(LOGIN_LOCKOUTS, "Login keys locked after repeated failures");
    describe_counter!(PLAN_MATCHES, "Diet plan match requests by outcome");
    describe_counter!(AI_REQUESTS, "Generative AI calls by kind and outcome");
}
