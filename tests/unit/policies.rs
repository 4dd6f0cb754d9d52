//! Unit tests for admission policies
//!
//! These tests use the public policy API (ValidationContext and validate_all)
//! to verify policy enforcement and ordering from an external perspective.
//!
//! Note: Single-rule tests are in src/webhooks/policies/*.rs

use crate::common::*;
use integration_server_admission::webhooks::EnvironmentPolicy;
use integration_server_admission::webhooks::policies::{
    RULE_CHAIN, RuleOutcome, ValidationContext, labels, license, metrics, validate_all,
};

fn run(
    server: &integration_server_admission::IntegrationServer,
    environment: EnvironmentPolicy,
) -> RuleOutcome {
    validate_all(&ValidationContext::new(server, environment))
}

// =============================================================================
// Label Policy Tests
// =============================================================================

mod label_policy_tests {
    use super::*;

    #[test]
    fn test_no_labels_denied_regardless_of_other_fields() {
        let server = IntegrationServerBuilder::new("ace1", "dev-ns")
            .with_metrics()
            .with_license_use(NON_PRODUCTION_USE)
            .with_annotation("owner", "team")
            .build();
        let result = run(&server, EnvironmentPolicy::non_production());
        assert_eq!(result.reason(), Some(labels::REQUIRED_LABELS_MISSING));
        assert_eq!(
            result.message(),
            Some("Required labels not defined in metadata.")
        );
    }

    #[test]
    fn test_spec_labels_do_not_satisfy_metadata_labels() {
        let mut server = create_valid_server("ace1", "dev-ns", false);
        server.spec.labels = server.metadata.labels.clone();
        server.metadata.labels.clear();
        let result = run(&server, EnvironmentPolicy::non_production());
        assert_eq!(result.reason(), Some(labels::REQUIRED_LABELS_MISSING));
    }

    #[test]
    fn test_server_id_absent_denied() {
        let server = IntegrationServerBuilder::new("ace1", "dev-ns")
            .with_label("app", "ace")
            .with_metrics()
            .with_license_use(NON_PRODUCTION_USE)
            .build();
        let result = run(&server, EnvironmentPolicy::non_production());
        assert_eq!(result.reason(), Some(labels::SERVER_ID_MISSING));
        assert_eq!(
            result.message(),
            Some("Server denied: Required label ibm.com/serverid is missing or blank in metadata.")
        );
    }

    #[test]
    fn test_server_id_empty_denied() {
        let server = IntegrationServerBuilder::new("ace1", "dev-ns")
            .with_server_id("")
            .with_metrics()
            .with_license_use(NON_PRODUCTION_USE)
            .build();
        let result = run(&server, EnvironmentPolicy::non_production());
        assert_eq!(result.reason(), Some(labels::SERVER_ID_MISSING));
    }

    #[test]
    fn test_server_id_non_numeric_denied() {
        let server = IntegrationServerBuilder::new("ace1", "dev-ns")
            .with_server_id("12a")
            .with_metrics()
            .with_license_use(NON_PRODUCTION_USE)
            .build();
        let result = run(&server, EnvironmentPolicy::non_production());
        assert_eq!(result.reason(), Some(labels::SERVER_ID_NOT_NUMERIC));
        assert_eq!(
            result.message(),
            Some("Server denied: Label ibm.com/serverid in metadata may only contain digits.")
        );
    }

    #[test]
    fn test_server_id_numeric_passes() {
        let server = IntegrationServerBuilder::new("ace1", "dev-ns")
            .with_server_id("123")
            .with_metrics()
            .with_license_use(NON_PRODUCTION_USE)
            .build();
        assert!(run(&server, EnvironmentPolicy::non_production()).is_pass());
    }
}

// =============================================================================
// Metrics Policy Tests
// =============================================================================

mod metrics_policy_tests {
    use super::*;

    #[test]
    fn test_metrics_disabled_denied_after_label_rules_pass() {
        let server = IntegrationServerBuilder::new("ace1", "prod-ns")
            .with_server_id("42")
            .with_license_use(PRODUCTION_USE)
            .build();
        let result = run(&server, EnvironmentPolicy::production());
        assert_eq!(result.reason(), Some(metrics::METRICS_DISABLED));
        assert_eq!(
            result.message(),
            Some("Server denied: The enableMetrics property must be set to true.")
        );
    }

    #[test]
    fn test_metrics_checked_before_license() {
        // Wrong license class for the environment as well
        let server = IntegrationServerBuilder::new("ace1", "prod-ns")
            .with_server_id("42")
            .with_license_use(NON_PRODUCTION_USE)
            .build();
        let result = run(&server, EnvironmentPolicy::production());
        assert_eq!(result.reason(), Some(metrics::METRICS_DISABLED));
    }
}

// =============================================================================
// License Policy Tests
// =============================================================================

mod license_policy_tests {
    use super::*;

    fn with_use(license_use: &str) -> integration_server_admission::IntegrationServer {
        IntegrationServerBuilder::new("ace1", "ns")
            .with_server_id("42")
            .with_metrics()
            .with_license_use(license_use)
            .build()
    }

    #[test]
    fn test_production_denies_non_production_license() {
        let result = run(&with_use("FooNonProduction"), EnvironmentPolicy::production());
        assert_eq!(result.reason(), Some(license::LICENSE_USE_INVALID));
        assert!(result.message().unwrap().contains("FooNonProduction"));
        assert!(result.message().unwrap().contains("production environment"));
    }

    #[test]
    fn test_production_allows_production_license() {
        assert!(run(&with_use("FooProduction"), EnvironmentPolicy::production()).is_pass());
    }

    #[test]
    fn test_non_production_allows_non_production_license() {
        assert!(run(&with_use("FooNonProduction"), EnvironmentPolicy::non_production()).is_pass());
    }

    #[test]
    fn test_non_production_denies_production_license() {
        let result = run(&with_use("FooProduction"), EnvironmentPolicy::non_production());
        assert_eq!(result.reason(), Some(license::LICENSE_USE_INVALID));
        assert_eq!(
            result.message(),
            Some("License use FooProduction is not valid for a non-production environment.")
        );
    }

    #[test]
    fn test_missing_license_use_denied_outside_production() {
        let result = run(&with_use(""), EnvironmentPolicy::non_production());
        assert_eq!(result.reason(), Some(license::LICENSE_USE_INVALID));
    }
}

// =============================================================================
// Combined Validation Tests
// =============================================================================

mod combined_validation_tests {
    use super::*;

    #[test]
    fn test_chain_has_five_rules() {
        assert_eq!(RULE_CHAIN.len(), 5);
    }

    #[test]
    fn test_each_rule_fails_in_isolation() {
        // Break one more field at a time; the reported failure moves up the chain
        let mut server = create_valid_server("ace1", "prod-ns", true);
        let production = EnvironmentPolicy::production();
        assert!(run(&server, production).is_pass());

        server.spec.license.r#use = NON_PRODUCTION_USE.to_string();
        assert_eq!(
            run(&server, production).reason(),
            Some(license::LICENSE_USE_INVALID)
        );

        server.spec.enable_metrics = false;
        assert_eq!(run(&server, production).reason(), Some(metrics::METRICS_DISABLED));

        server
            .metadata
            .labels
            .insert("ibm.com/serverid".to_string(), "x1".to_string());
        assert_eq!(
            run(&server, production).reason(),
            Some(labels::SERVER_ID_NOT_NUMERIC)
        );

        server.metadata.labels.insert("ibm.com/serverid".to_string(), String::new());
        assert_eq!(run(&server, production).reason(), Some(labels::SERVER_ID_MISSING));

        server.metadata.labels.clear();
        assert_eq!(
            run(&server, production).reason(),
            Some(labels::REQUIRED_LABELS_MISSING)
        );
    }

    #[test]
    fn test_unused_fields_do_not_affect_outcome() {
        let mut server = create_valid_server("ace1", "dev-ns", false);
        server.spec.disable_routes = true;
        server.spec.version = String::new();
        server.spec.license.accept = false;
        server.spec.pod.containers.runtime.image = "registry.example.com/ace:latest".to_string();
        assert!(run(&server, EnvironmentPolicy::non_production()).is_pass());
    }
}
