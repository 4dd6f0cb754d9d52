pub mod config;
pub mod crd;
pub mod error;
pub mod health;
pub mod webhooks;

pub use config::WebhookConfig;
pub use crd::IntegrationServer;
pub use error::{ConfigError, Error, Result};
pub use health::{HealthState, Metrics};
pub use webhooks::{
    Decision, DenialKind, EnvironmentPolicy, PolicySource, ProcessEnvironment, WebhookState,
    admit, evaluate, run_webhook_server,
};
