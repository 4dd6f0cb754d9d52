//! Environment policy source
//!
//! The production/non-production switch is process-wide configuration. It is
//! resolved once per evaluation and handed to the policies as a value, so the
//! policies themselves never read the process environment.

use std::env::{self, VarError};

use crate::error::ConfigError;

/// Default name of the variable holding the production flag
pub const IS_PRODUCTION_VAR: &str = "IS_PRODUCTION";

/// Deployment environment the webhook enforces licensing for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnvironmentPolicy {
    pub is_production: bool,
}

impl EnvironmentPolicy {
    pub fn production() -> Self {
        Self {
            is_production: true,
        }
    }

    pub fn non_production() -> Self {
        Self {
            is_production: false,
        }
    }
}

/// Something that can resolve the environment policy for one evaluation
pub trait PolicySource: Send + Sync {
    fn resolve(&self) -> Result<EnvironmentPolicy, ConfigError>;
}

/// A fixed policy always resolves to itself
impl PolicySource for EnvironmentPolicy {
    fn resolve(&self) -> Result<EnvironmentPolicy, ConfigError> {
        Ok(*self)
    }
}

/// Reads the production flag from a process environment variable on every call
#[derive(Debug, Clone)]
pub struct ProcessEnvironment {
    var: String,
}

impl Default for ProcessEnvironment {
    fn default() -> Self {
        Self::new(IS_PRODUCTION_VAR)
    }
}

impl ProcessEnvironment {
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }

    pub fn var(&self) -> &str {
        &self.var
    }
}

impl PolicySource for ProcessEnvironment {
    fn resolve(&self) -> Result<EnvironmentPolicy, ConfigError> {
        match env::var(&self.var) {
            Ok(value) => parse_policy(&self.var, &value),
            Err(VarError::NotPresent) => Err(ConfigError::Missing {
                var: self.var.clone(),
            }),
            Err(VarError::NotUnicode(_)) => Err(ConfigError::NotUnicode {
                var: self.var.clone(),
            }),
        }
    }
}

/// Parse a raw flag value read from variable `var`
pub fn parse_policy(var: &str, value: &str) -> Result<EnvironmentPolicy, ConfigError> {
    parse_bool(value)
        .map(|is_production| EnvironmentPolicy { is_production })
        .ok_or_else(|| ConfigError::Malformed {
            var: var.to_string(),
            value: value.to_string(),
        })
}

/// Boolean spellings accepted for the production flag.
///
/// Surrounding whitespace is not trimmed.
pub fn parse_bool(value: &str) -> Option<bool> {
    match value {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}
