//! License use policy
//!
//! License use strings ending in `NonProduction` are for development,
//! integration and QA environments; every other value is production-class.
//! Production environments reject non-production licenses and vice versa.

use std::sync::LazyLock;

use regex::Regex;

use super::{RuleOutcome, ValidationContext};

pub const LICENSE_USE_INVALID: &str = "LicenseUseInvalid";

// ASCII whitespace only; `\S` in the regex crate also excludes Unicode spaces
#[allow(clippy::expect_used)]
static NON_PRODUCTION_USE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\t\n\x0C\r ]+NonProduction$").expect("license use pattern is valid")
});

/// Whether a license use value names a non-production license
pub fn is_non_production_license(license_use: &str) -> bool {
    NON_PRODUCTION_USE.is_match(license_use)
}

/// Rule: the license use class must match the deployment environment.
pub fn validate_license_use(ctx: &ValidationContext) -> RuleOutcome {
    let license_use = ctx.server.spec.license.r#use.as_str();
    let non_production = is_non_production_license(license_use);

    match (ctx.environment.is_production, non_production) {
        (true, true) => RuleOutcome::fail(
            LICENSE_USE_INVALID,
            format!("License use {license_use} is not valid for a production environment."),
        ),
        (false, false) => RuleOutcome::fail(
            LICENSE_USE_INVALID,
            format!("License use {license_use} is not valid for a non-production environment."),
        ),
        _ => RuleOutcome::pass(),
    }
}
