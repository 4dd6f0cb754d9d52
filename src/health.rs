//! Health server for Kubernetes probes and Prometheus metrics
//!
//! Provides HTTP endpoints for:
//! - `/healthz` - Liveness probe (is the process alive?)
//! - `/readyz` - Readiness probe (is the webhook ready to serve?)
//! - `/metrics` - Prometheus metrics

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use prometheus_client::encoding::text::encode;
use prometheus_client::metrics::counter::Counter;
use prometheus_client::metrics::family::Family;
use prometheus_client::metrics::histogram::{Histogram, exponential_buckets};
use prometheus_client::registry::Registry;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::RwLock;

use crate::webhooks::Decision;

/// Labels for admission review metrics
#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub struct ReviewLabels {
    pub outcome: String,
    pub reason: String,
}

impl prometheus_client::encoding::EncodeLabelSet for ReviewLabels {
    fn encode(
        &self,
        encoder: &mut prometheus_client::encoding::LabelSetEncoder,
    ) -> Result<(), std::fmt::Error> {
        use prometheus_client::encoding::EncodeLabel;
        ("outcome", self.outcome.as_str()).encode(encoder.encode_label())?;
        ("reason", self.reason.as_str()).encode(encoder.encode_label())?;
        Ok(())
    }
}

/// Shared metrics state
pub struct Metrics {
    /// Admission reviews by outcome and reason
    pub reviews_total: Family<ReviewLabels, Counter>,
    /// Denials caused by an unresolvable environment policy
    pub configuration_faults_total: Counter,
    /// Time spent deciding a review
    pub evaluation_duration_seconds: Histogram,

    /// Prometheus registry
    registry: Registry,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub fn new() -> Self {
        let mut registry = Registry::default();

        let reviews_total = Family::<ReviewLabels, Counter>::default();
        registry.register(
            "integration_server_admission_reviews",
            "Total number of admission reviews by outcome",
            reviews_total.clone(),
        );

        let configuration_faults_total = Counter::default();
        registry.register(
            "integration_server_admission_configuration_faults",
            "Admission reviews denied because the environment policy could not be resolved",
            configuration_faults_total.clone(),
        );

        let evaluation_duration_seconds = Histogram::new(exponential_buckets(0.00001, 2.0, 15));
        registry.register(
            "integration_server_admission_evaluation_duration_seconds",
            "Duration of admission evaluation in seconds",
            evaluation_duration_seconds.clone(),
        );

        Self {
            reviews_total,
            configuration_faults_total,
            evaluation_duration_seconds,
            registry,
        }
    }

    /// Record a decision and how long it took
    pub fn record_decision(&self, decision: &Decision, duration_secs: f64) {
        let labels = match decision {
            Decision::Allowed { .. } => ReviewLabels {
                outcome: "allowed".to_string(),
                reason: String::new(),
            },
            Decision::Denied { kind, reason, .. } => {
                if *kind == crate::webhooks::DenialKind::ConfigurationFault {
                    self.configuration_faults_total.inc();
                }
                ReviewLabels {
                    outcome: "denied".to_string(),
                    reason: reason.to_string(),
                }
            }
        };
        self.reviews_total.get_or_create(&labels).inc();
        self.evaluation_duration_seconds.observe(duration_secs);
    }

    /// Record a DELETE review, which is allowed without evaluation
    pub fn record_skipped(&self) {
        let labels = ReviewLabels {
            outcome: "skipped".to_string(),
            reason: String::new(),
        };
        self.reviews_total.get_or_create(&labels).inc();
    }

    /// Encode metrics to Prometheus text format
    ///
    /// Returns an empty string if encoding fails (should never happen with valid metrics).
    pub(crate) fn encode(&self) -> String {
        let mut buffer = String::new();
        if let Err(e) = encode(&mut buffer, &self.registry) {
            tracing::error!("Failed to encode metrics: {}", e);
            return String::new();
        }
        buffer
    }
}

/// Shared state for the health server
pub struct HealthState {
    /// Whether the webhook is ready to serve admission reviews
    pub ready: RwLock<bool>,
    /// Metrics registry
    pub metrics: Metrics,
}

impl Default for HealthState {
    fn default() -> Self {
        Self::new()
    }
}

impl HealthState {
    pub fn new() -> Self {
        Self {
            ready: RwLock::new(false),
            metrics: Metrics::new(),
        }
    }

    /// Mark the webhook as ready
    pub async fn set_ready(&self, ready: bool) {
        *self.ready.write().await = ready;
    }

    /// Check if the webhook is ready
    pub async fn is_ready(&self) -> bool {
        *self.ready.read().await
    }
}

/// Liveness probe handler
async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

/// Readiness probe handler
///
/// Returns 503 Service Unavailable until the webhook is marked ready.
async fn readyz(State(state): State<Arc<HealthState>>) -> Response {
    if state.is_ready().await {
        (StatusCode::OK, "ready").into_response()
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "not ready").into_response()
    }
}

async fn metrics(State(state): State<Arc<HealthState>>) -> impl IntoResponse {
    let body = state.metrics.encode();
    (
        StatusCode::OK,
        [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
        body,
    )
}

/// Create the health server router
pub fn create_router(state: Arc<HealthState>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/metrics", get(metrics))
        .with_state(state)
}

/// Run the health server on the given port (plain HTTP)
pub async fn run_health_server(state: Arc<HealthState>, port: u16) -> Result<(), std::io::Error> {
    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;
    tracing::info!("Health server listening on {}", addr);

    axum::serve(listener, app).await
}
