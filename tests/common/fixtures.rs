//! Test fixtures and builders for IntegrationServer resources
//!
//! # Quick Start
//!
//! For simple tests, use the convenience functions:
//! ```rust,ignore
//! let server = create_valid_server("ace1", "prod-ns", true);
//! ```
//!
//! For other configurations, use the builder:
//! ```rust,ignore
//! let server = IntegrationServerBuilder::new("ace1", "dev-ns")
//!     .with_server_id("42")
//!     .with_metrics()
//!     .with_license_use("CloudPakForIntegrationNonProduction")
//!     .build();
//! ```

use integration_server_admission::crd::{IntegrationServer, SERVER_ID_LABEL};
use std::collections::BTreeMap;

pub const PRODUCTION_USE: &str = "AppConnectEnterpriseProduction";
pub const NON_PRODUCTION_USE: &str = "AppConnectEnterpriseNonProduction";

// =============================================================================
// Convenience Functions for Simple Test Cases
// =============================================================================

/// Create a server that passes every policy for the given environment
pub fn create_valid_server(name: &str, namespace: &str, is_production: bool) -> IntegrationServer {
    IntegrationServerBuilder::new(name, namespace)
        .with_server_id("42")
        .with_metrics()
        .with_license_use(if is_production {
            PRODUCTION_USE
        } else {
            NON_PRODUCTION_USE
        })
        .build()
}

/// Serialize a server the way the API server would send it
pub fn to_payload(server: &IntegrationServer) -> Vec<u8> {
    let mut value = serde_json::to_value(server).expect("server serializes");
    if let Some(obj) = value.as_object_mut() {
        obj.insert(
            "apiVersion".to_string(),
            serde_json::json!("appconnect.ibm.com/v1beta1"),
        );
        obj.insert("kind".to_string(), serde_json::json!("IntegrationServer"));
    }
    serde_json::to_vec(&value).expect("payload serializes")
}

// =============================================================================
// IntegrationServer Builder
// =============================================================================

/// Builder for IntegrationServer test fixtures
#[allow(dead_code)]
pub struct IntegrationServerBuilder {
    name: String,
    namespace: String,
    labels: BTreeMap<String, String>,
    annotations: BTreeMap<String, String>,
    enable_metrics: bool,
    version: String,
    license_accept: bool,
    license: String,
    license_use: String,
    image: String,
}

#[allow(dead_code)]
impl IntegrationServerBuilder {
    pub fn new(name: &str, namespace: &str) -> Self {
        Self {
            name: name.to_string(),
            namespace: namespace.to_string(),
            labels: BTreeMap::new(),
            annotations: BTreeMap::new(),
            enable_metrics: false,
            version: "12.0".to_string(),
            license_accept: true,
            license: "L-APEH-CJUCNR".to_string(),
            license_use: String::new(),
            image: String::new(),
        }
    }

    pub fn with_server_id(self, id: &str) -> Self {
        self.with_label(SERVER_ID_LABEL, id)
    }

    pub fn with_label(mut self, key: &str, value: &str) -> Self {
        self.labels.insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_annotation(mut self, key: &str, value: &str) -> Self {
        self.annotations.insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_metrics(mut self) -> Self {
        self.enable_metrics = true;
        self
    }

    pub fn with_license_use(mut self, license_use: &str) -> Self {
        self.license_use = license_use.to_string();
        self
    }

    pub fn with_image(mut self, image: &str) -> Self {
        self.image = image.to_string();
        self
    }

    pub fn build(self) -> IntegrationServer {
        let mut server = IntegrationServer::default();
        server.metadata.name = self.name;
        server.metadata.namespace = self.namespace;
        server.metadata.labels = self.labels;
        server.metadata.annotations = self.annotations;
        server.spec.enable_metrics = self.enable_metrics;
        server.spec.version = self.version;
        server.spec.license.accept = self.license_accept;
        server.spec.license.license = self.license;
        server.spec.license.r#use = self.license_use;
        server.spec.pod.containers.runtime.image = self.image;
        server
    }
}
