//! Error types for the admission webhook

use thiserror::Error;

/// Failure to resolve the environment policy from process configuration.
///
/// These indicate a misconfigured deployment rather than an invalid resource.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Environment variable {var} is not set.")]
    Missing { var: String },

    #[error("Environment variable {var} value {value} could not be converted to a boolean.")]
    Malformed { var: String, value: String },

    #[error("Environment variable {var} is not valid unicode.")]
    NotUnicode { var: String },
}

/// Error variants are named after the failing concern (request, configuration, server).
#[derive(Error, Debug)]
pub enum Error {
    #[error("Malformed request: {0}")]
    MalformedRequest(#[source] serde_json::Error),

    #[error("Configuration fault: {0}")]
    Configuration(#[from] ConfigError),

    #[error("Invalid setting {name}: {value}")]
    InvalidSetting { name: &'static str, value: String },

    #[error("TLS configuration error: {0}")]
    Tls(String),

    #[error("Webhook server error: {0}")]
    Server(#[from] std::io::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
