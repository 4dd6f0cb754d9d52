//! Metadata label policies
//!
//! Every IntegrationServer must carry labels, and `ibm.com/serverid` must be a
//! non-empty string of decimal digits.

use std::sync::LazyLock;

use regex::Regex;

use super::RuleOutcome;
use crate::crd::{IntegrationServer, SERVER_ID_LABEL};

pub const REQUIRED_LABELS_MISSING: &str = "RequiredLabelsMissing";
pub const SERVER_ID_MISSING: &str = "ServerIdMissing";
pub const SERVER_ID_NOT_NUMERIC: &str = "ServerIdNotNumeric";

#[allow(clippy::expect_used)]
static SERVER_ID_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]+$").expect("server id pattern is valid"));

/// Server ids may only contain ASCII digits
pub fn is_valid_server_id(value: &str) -> bool {
    SERVER_ID_PATTERN.is_match(value)
}

/// Rule: `metadata.labels` must not be empty.
pub fn validate_required_labels(server: &IntegrationServer) -> RuleOutcome {
    if server.metadata.labels.is_empty() {
        return RuleOutcome::fail(
            REQUIRED_LABELS_MISSING,
            "Required labels not defined in metadata.",
        );
    }
    RuleOutcome::pass()
}

/// Rule: the server id label must be present and non-blank.
pub fn validate_server_id_present(server: &IntegrationServer) -> RuleOutcome {
    match server.server_id() {
        Some(id) if !id.is_empty() => RuleOutcome::pass(),
        _ => RuleOutcome::fail(
            SERVER_ID_MISSING,
            format!("Server denied: Required label {SERVER_ID_LABEL} is missing or blank in metadata."),
        ),
    }
}

/// Rule: the server id label must be digits only.
pub fn validate_server_id_format(server: &IntegrationServer) -> RuleOutcome {
    let id = server.server_id().unwrap_or_default();
    if !is_valid_server_id(id) {
        return RuleOutcome::fail(
            SERVER_ID_NOT_NUMERIC,
            format!("Server denied: Label {SERVER_ID_LABEL} in metadata may only contain digits."),
        );
    }
    RuleOutcome::pass()
}
