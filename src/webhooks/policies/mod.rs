//! Admission webhook policies
//!
//! Each policy module exports `validate_*` functions that check one rule.
//! The rules run in the fixed order of [`RULE_CHAIN`]: identity checks on the
//! metadata labels come first, then the behavioral checks on spec fields.
//! Only the license rule reads the environment policy, and it runs last.

pub mod labels;
pub mod license;
pub mod metrics;

pub use labels::{validate_required_labels, validate_server_id_format, validate_server_id_present};
pub use license::{is_non_production_license, validate_license_use};
pub use metrics::validate_metrics_enabled;

use std::convert::Infallible;

use tracing::{debug, warn};

use super::environment::EnvironmentPolicy;
use crate::crd::IntegrationServer;

/// Outcome of a single policy check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleOutcome {
    Pass,
    Fail {
        reason: &'static str,
        message: String,
    },
}

impl RuleOutcome {
    pub fn pass() -> Self {
        Self::Pass
    }

    pub fn fail(reason: &'static str, message: impl Into<String>) -> Self {
        Self::Fail {
            reason,
            message: message.into(),
        }
    }

    pub fn is_pass(&self) -> bool {
        matches!(self, Self::Pass)
    }

    /// Machine-readable reason code of a failure
    pub fn reason(&self) -> Option<&'static str> {
        match self {
            Self::Pass => None,
            Self::Fail { reason, .. } => Some(*reason),
        }
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Pass => None,
            Self::Fail { message, .. } => Some(message.as_str()),
        }
    }
}

/// Everything a policy may look at for one evaluation
#[derive(Debug, Clone, Copy)]
pub struct ValidationContext<'a> {
    pub server: &'a IntegrationServer,
    pub environment: EnvironmentPolicy,
}

impl<'a> ValidationContext<'a> {
    pub fn new(server: &'a IntegrationServer, environment: EnvironmentPolicy) -> Self {
        Self {
            server,
            environment,
        }
    }
}

/// What a policy check needs to see
#[derive(Clone, Copy)]
pub enum Check {
    /// Reads only the resource
    Resource(fn(&IntegrationServer) -> RuleOutcome),
    /// Also reads the resolved environment policy
    Environment(fn(&ValidationContext) -> RuleOutcome),
}

/// A named policy check
#[derive(Clone, Copy)]
pub struct Rule {
    pub name: &'static str,
    pub check: Check,
}

impl Rule {
    pub fn reads_environment(&self) -> bool {
        matches!(self.check, Check::Environment(_))
    }
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name)
            .field("reads_environment", &self.reads_environment())
            .finish()
    }
}

/// Policies in evaluation order
pub const RULE_CHAIN: [Rule; 5] = [
    Rule {
        name: "required-labels",
        check: Check::Resource(validate_required_labels),
    },
    Rule {
        name: "server-id-present",
        check: Check::Resource(validate_server_id_present),
    },
    Rule {
        name: "server-id-format",
        check: Check::Resource(validate_server_id_format),
    },
    Rule {
        name: "metrics-enabled",
        check: Check::Resource(validate_metrics_enabled),
    },
    Rule {
        name: "license-environment",
        check: Check::Environment(validate_license_use),
    },
];

/// Run all policies against a known environment and return the first failure
pub fn validate_all(ctx: &ValidationContext) -> RuleOutcome {
    let environment = ctx.environment;
    match validate_resolving(ctx.server, || Ok::<_, Infallible>(environment)) {
        Ok(outcome) => outcome,
        Err(never) => match never {},
    }
}

/// Run all policies, resolving the environment policy only when the first
/// rule that reads it is reached
///
/// `resolve` is called at most once. A resource that fails a rule before the
/// license check never triggers it, so its policy denial is reported even
/// when the environment is misconfigured.
pub fn validate_resolving<E>(
    server: &IntegrationServer,
    mut resolve: impl FnMut() -> Result<EnvironmentPolicy, E>,
) -> Result<RuleOutcome, E> {
    let name = server.name();
    let namespace = server.namespace();
    let mut environment: Option<EnvironmentPolicy> = None;

    for rule in &RULE_CHAIN {
        let outcome = match rule.check {
            Check::Resource(check) => check(server),
            Check::Environment(check) => {
                let resolved = match environment {
                    Some(resolved) => resolved,
                    None => {
                        let resolved = resolve()?;
                        environment = Some(resolved);
                        resolved
                    }
                };
                check(&ValidationContext::new(server, resolved))
            }
        };

        match &outcome {
            RuleOutcome::Pass => {
                debug!(name = %name, namespace = %namespace, rule = rule.name, "Policy passed");
            }
            RuleOutcome::Fail { reason, message } => {
                warn!(
                    name = %name,
                    namespace = %namespace,
                    rule = rule.name,
                    reason = %reason,
                    message = %message,
                    "Policy failed"
                );
                return Ok(outcome);
            }
        }
    }

    Ok(RuleOutcome::pass())
}
