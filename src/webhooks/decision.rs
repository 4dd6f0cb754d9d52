//! Admission decisions
//!
//! [`evaluate`] is the pure rule chain over a parsed IntegrationServer.
//! [`admit`] is the full pipeline from raw object bytes: parse, then walk the
//! chain, resolving the environment policy once when the license rule is
//! reached. Every failure along the way becomes a denial; nothing is ever
//! allowed when a step cannot complete.

use tracing::{error, info, warn};

use super::environment::{EnvironmentPolicy, PolicySource};
use super::policies::{RuleOutcome, ValidationContext, validate_all, validate_resolving};
use crate::crd::IntegrationServer;

pub const INVALID_REQUEST: &str = "InvalidRequest";
pub const CONFIGURATION_FAULT: &str = "ConfigurationFault";

/// Why a request was denied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DenialKind {
    /// The payload could not be parsed into an IntegrationServer
    MalformedRequest,
    /// A policy in the rule chain failed
    Policy,
    /// The environment policy could not be resolved
    ConfigurationFault,
}

impl DenialKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DenialKind::MalformedRequest => "malformed_request",
            DenialKind::Policy => "policy",
            DenialKind::ConfigurationFault => "configuration_fault",
        }
    }
}

/// Final admission decision
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allowed {
        message: String,
    },
    Denied {
        kind: DenialKind,
        reason: &'static str,
        message: String,
    },
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allowed { .. })
    }

    pub fn message(&self) -> &str {
        match self {
            Decision::Allowed { message } | Decision::Denied { message, .. } => message.as_str(),
        }
    }

    /// Reason code of a denial
    pub fn reason(&self) -> Option<&'static str> {
        match self {
            Decision::Allowed { .. } => None,
            Decision::Denied { reason, .. } => Some(*reason),
        }
    }

    pub fn denial_kind(&self) -> Option<DenialKind> {
        match self {
            Decision::Allowed { .. } => None,
            Decision::Denied { kind, .. } => Some(*kind),
        }
    }

    pub(crate) fn malformed_request() -> Self {
        Decision::Denied {
            kind: DenialKind::MalformedRequest,
            reason: INVALID_REQUEST,
            message: "Invalid request".to_string(),
        }
    }
}

/// Evaluate the rule chain against a parsed IntegrationServer
pub fn evaluate(server: &IntegrationServer, environment: EnvironmentPolicy) -> Decision {
    let ctx = ValidationContext::new(server, environment);
    decide(server, validate_all(&ctx))
}

fn decide(server: &IntegrationServer, outcome: RuleOutcome) -> Decision {
    match outcome {
        RuleOutcome::Pass => Decision::Allowed {
            message: format!(
                "IntegrationServer {} in namespace {} allowed.",
                server.name(),
                server.namespace()
            ),
        },
        RuleOutcome::Fail { reason, message } => Decision::Denied {
            kind: DenialKind::Policy,
            reason,
            message,
        },
    }
}

/// Decide on a raw IntegrationServer payload
pub fn admit(raw: &[u8], source: &dyn PolicySource) -> Decision {
    let server = match IntegrationServer::from_slice(raw) {
        Ok(server) => server,
        Err(e) => {
            error!(error = %e, "Failed to parse IntegrationServer");
            return Decision::malformed_request();
        }
    };

    info!(
        name = %server.name(),
        namespace = %server.namespace(),
        "Validating IntegrationServer"
    );

    let outcome = match validate_resolving(&server, || source.resolve()) {
        Ok(outcome) => outcome,
        Err(e) => {
            error!(
                name = %server.name(),
                namespace = %server.namespace(),
                error = %e,
                "Environment policy could not be resolved, denying request"
            );
            return Decision::Denied {
                kind: DenialKind::ConfigurationFault,
                reason: CONFIGURATION_FAULT,
                message: e.to_string(),
            };
        }
    };

    let decision = decide(&server, outcome);
    match &decision {
        Decision::Allowed { message } => {
            info!(name = %server.name(), namespace = %server.namespace(), "{}", message);
        }
        Decision::Denied {
            kind,
            reason,
            message,
        } => {
            warn!(
                name = %server.name(),
                namespace = %server.namespace(),
                kind = kind.as_str(),
                reason = %reason,
                message = %message,
                "IntegrationServer denied"
            );
        }
    }
    decision
}
