//! Webhook HTTP server handlers
//!
//! Implements the ValidatingAdmissionWebhook HTTP endpoint for
//! IntegrationServer resources. The handler only translates between
//! AdmissionReview and [`Decision`]; all policy lives in [`admit`].
//!
//! The candidate object is detached from the review as raw JSON before kube
//! parses the envelope, so an object kube cannot type still reaches [`admit`]
//! and is denied as a malformed request.

use axum::{
    Json, Router, body::Bytes, extract::State, http::StatusCode, response::IntoResponse,
    routing::post,
};
use kube::core::DynamicObject;
use kube::core::admission::{AdmissionRequest, AdmissionResponse, AdmissionReview, Operation};
use serde_json::Value;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};

use super::decision::{Decision, admit};
use super::environment::PolicySource;
use crate::error::{Error, Result};
use crate::health::HealthState;

/// Shared state for webhook handlers
pub struct WebhookState {
    pub policy_source: Arc<dyn PolicySource>,
    pub health: Option<Arc<HealthState>>,
}

impl WebhookState {
    pub fn new(policy_source: Arc<dyn PolicySource>, health: Option<Arc<HealthState>>) -> Self {
        Self {
            policy_source,
            health,
        }
    }
}

/// Create the webhook router
pub fn create_webhook_router(state: Arc<WebhookState>) -> Router {
    Router::new()
        .route("/validate", post(validate_integration_server))
        .with_state(state)
}

/// Validate IntegrationServer admission webhook handler
async fn validate_integration_server(
    State(state): State<Arc<WebhookState>>,
    body: Bytes,
) -> impl IntoResponse {
    let (review, object) = match parse_review(&body) {
        Ok(parsed) => parsed,
        Err(e) => {
            error!(error = %e, "Failed to parse AdmissionReview");
            return (
                StatusCode::BAD_REQUEST,
                Json(AdmissionResponse::invalid("Invalid request").into_review()),
            );
        }
    };

    let request: AdmissionRequest<DynamicObject> = match review.try_into() {
        Ok(req) => req,
        Err(e) => {
            error!(error = %e, "Admission review missing request");
            return (
                StatusCode::OK,
                Json(AdmissionResponse::invalid(e.to_string()).into_review()),
            );
        }
    };

    (
        StatusCode::OK,
        Json(review_request(&state, &request, object.as_ref()).into_review()),
    )
}

/// Split an AdmissionReview body into the kube envelope and the raw object
///
/// `object` and `oldObject` are nulled before kube sees the envelope, so only
/// the review metadata has to match kube's types.
pub fn parse_review(
    body: &[u8],
) -> Result<(AdmissionReview<DynamicObject>, Option<Value>), serde_json::Error> {
    let mut review: Value = serde_json::from_slice(body)?;

    let object = match review.get_mut("request").and_then(Value::as_object_mut) {
        Some(request) => {
            if let Some(old) = request.get_mut("oldObject") {
                old.take();
            }
            request
                .get_mut("object")
                .map(Value::take)
                .filter(|object| !object.is_null())
        }
        None => None,
    };

    Ok((serde_json::from_value(review)?, object))
}

/// Decide on a single admission request
///
/// `object` is the candidate IntegrationServer exactly as submitted.
pub fn review_request(
    state: &WebhookState,
    request: &AdmissionRequest<DynamicObject>,
    object: Option<&Value>,
) -> AdmissionResponse {
    let response = AdmissionResponse::from(request);
    info!(
        uid = %request.uid,
        operation = ?request.operation,
        namespace = ?request.namespace,
        name = %request.name,
        "Processing admission request"
    );

    // Nothing to validate on removal
    if matches!(request.operation, Operation::Delete) {
        if let Some(health) = &state.health {
            health.metrics.record_skipped();
        }
        return response;
    }

    let started = Instant::now();
    let decision = match object {
        Some(object) => match serde_json::to_vec(object) {
            Ok(raw) => admit(&raw, state.policy_source.as_ref()),
            Err(e) => {
                error!(uid = %request.uid, error = %e, "Failed to serialize admission object");
                Decision::malformed_request()
            }
        },
        None => {
            error!(uid = %request.uid, "Missing object in admission request");
            Decision::malformed_request()
        }
    };

    if let Some(health) = &state.health {
        health
            .metrics
            .record_decision(&decision, started.elapsed().as_secs_f64());
    }

    match decision {
        Decision::Allowed { .. } => {
            info!(uid = %request.uid, "Admission request allowed");
            response
        }
        Decision::Denied {
            kind,
            reason,
            message,
        } => {
            info!(
                uid = %request.uid,
                kind = kind.as_str(),
                reason = %reason,
                "Admission request denied"
            );
            response.deny(message)
        }
    }
}

/// Default path to webhook TLS certificate
pub const WEBHOOK_CERT_PATH: &str = "/etc/webhook/certs/tls.crt";
/// Default path to webhook TLS private key
pub const WEBHOOK_KEY_PATH: &str = "/etc/webhook/certs/tls.key";
/// Default webhook server port
pub const WEBHOOK_PORT: u16 = 8443;

/// Run the webhook server with TLS
///
/// Binds to 0.0.0.0 on `port` and serves the /validate endpoint.
///
/// # Arguments
/// * `state` - Policy source and optional health state for metrics
/// * `cert_path` - Path to TLS certificate file (PEM format)
/// * `key_path` - Path to TLS private key file (PEM format)
/// * `port` - Port to listen on
pub async fn run_webhook_server(
    state: Arc<WebhookState>,
    cert_path: &Path,
    key_path: &Path,
    port: u16,
) -> Result<()> {
    use axum_server::tls_rustls::RustlsConfig;

    let app = create_webhook_router(state);

    let config = RustlsConfig::from_pem_file(cert_path, key_path)
        .await
        .map_err(|e| Error::Tls(e.to_string()))?;

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Webhook server listening on {} with TLS", addr);

    axum_server::bind_rustls(addr, config)
        .serve(app.into_make_service())
        .await?;

    Ok(())
}
