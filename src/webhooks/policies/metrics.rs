//! Metrics policy
//!
//! Integration servers must expose metrics. There is no override.

use super::RuleOutcome;
use crate::crd::IntegrationServer;

pub const METRICS_DISABLED: &str = "MetricsDisabled";

/// Rule: `spec.enableMetrics` must be `true`.
pub fn validate_metrics_enabled(server: &IntegrationServer) -> RuleOutcome {
    if !server.spec.enable_metrics {
        return RuleOutcome::fail(
            METRICS_DISABLED,
            "Server denied: The enableMetrics property must be set to true.",
        );
    }
    RuleOutcome::pass()
}
