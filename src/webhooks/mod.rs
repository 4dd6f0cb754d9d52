//! Admission webhook for IntegrationServer validation
//!
//! This module implements a ValidatingAdmissionWebhook that enforces labelling,
//! metrics and licensing policies on IntegrationServer resources before they
//! are persisted.
//!
//! The decision core is synchronous and side-effect free apart from logging:
//! - [`environment`] resolves the production flag
//! - [`policies`] holds the ordered rule chain
//! - [`decision`] turns raw bytes into an allow/deny [`Decision`]

pub mod decision;
pub mod environment;
pub mod policies;
mod server;

pub use decision::{Decision, DenialKind, admit, evaluate};
pub use environment::{EnvironmentPolicy, IS_PRODUCTION_VAR, PolicySource, ProcessEnvironment};
pub use policies::{
    Check, RULE_CHAIN, Rule, RuleOutcome, ValidationContext, validate_all, validate_resolving,
};
pub use server::{
    WEBHOOK_CERT_PATH, WEBHOOK_KEY_PATH, WEBHOOK_PORT, WebhookState, create_webhook_router,
    parse_review, review_request, run_webhook_server,
};

// Re-export kube-rs admission types for contract testing
pub use kube::core::admission::{AdmissionRequest, AdmissionResponse, AdmissionReview, Operation};
