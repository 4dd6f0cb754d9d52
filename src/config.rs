//! Process configuration
//!
//! Settings are read from environment variables once at startup. The
//! production flag is deliberately not part of this: it is resolved per
//! evaluation by [`ProcessEnvironment`].

use std::env;
use std::path::PathBuf;

use crate::error::{Error, Result};
use crate::webhooks::{
    IS_PRODUCTION_VAR, ProcessEnvironment, WEBHOOK_CERT_PATH, WEBHOOK_KEY_PATH, WEBHOOK_PORT,
};

/// Default health/metrics server port
pub const HEALTH_PORT: u16 = 8080;

/// Startup settings for the webhook process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookConfig {
    pub cert_path: PathBuf,
    pub key_path: PathBuf,
    pub webhook_port: u16,
    pub health_port: u16,
    /// Name of the variable holding the production flag
    pub is_production_var: String,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            cert_path: PathBuf::from(WEBHOOK_CERT_PATH),
            key_path: PathBuf::from(WEBHOOK_KEY_PATH),
            webhook_port: WEBHOOK_PORT,
            health_port: HEALTH_PORT,
            is_production_var: IS_PRODUCTION_VAR.to_string(),
        }
    }
}

impl WebhookConfig {
    /// Load settings from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load settings through an arbitrary lookup, falling back to defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        Ok(Self {
            cert_path: lookup("WEBHOOK_CERT_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.cert_path),
            key_path: lookup("WEBHOOK_KEY_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.key_path),
            webhook_port: parse_port("WEBHOOK_PORT", lookup("WEBHOOK_PORT"))?
                .unwrap_or(defaults.webhook_port),
            health_port: parse_port("HEALTH_PORT", lookup("HEALTH_PORT"))?
                .unwrap_or(defaults.health_port),
            is_production_var: lookup("IS_PRODUCTION_VAR")
                .filter(|v| !v.is_empty())
                .unwrap_or(defaults.is_production_var),
        })
    }

    /// Whether both TLS files exist
    pub fn tls_available(&self) -> bool {
        self.cert_path.exists() && self.key_path.exists()
    }

    /// Policy source reading the configured production flag variable
    pub fn policy_source(&self) -> ProcessEnvironment {
        ProcessEnvironment::new(self.is_production_var.clone())
    }
}

fn parse_port(name: &'static str, value: Option<String>) -> Result<Option<u16>> {
    match value {
        None => Ok(None),
        Some(value) => match value.parse::<u16>() {
            Ok(port) if port != 0 => Ok(Some(port)),
            _ => Err(Error::InvalidSetting { name, value }),
        },
    }
}
