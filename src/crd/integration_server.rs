use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

use crate::error::{Error, Result};

/// Label carrying the numeric server identifier
pub const SERVER_ID_LABEL: &str = "ibm.com/serverid";

/// IntegrationServer as submitted to the API server.
///
/// Only the fields the admission policies need are modelled. Parsing is
/// lenient: unknown fields are ignored and absent (or `null`) fields take
/// their zero value, so only the policies decide whether an absence is fatal.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IntegrationServer {
    #[serde(default, deserialize_with = "null_as_default")]
    pub metadata: ResourceMetadata,

    #[serde(default, deserialize_with = "null_as_default")]
    pub spec: IntegrationServerSpec,
}

impl IntegrationServer {
    /// Parse an IntegrationServer from raw JSON bytes
    pub fn from_slice(raw: &[u8]) -> Result<Self> {
        serde_json::from_slice(raw).map_err(Error::MalformedRequest)
    }

    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    pub fn namespace(&self) -> &str {
        &self.metadata.namespace
    }

    /// Value of the server id label, if present
    pub fn server_id(&self) -> Option<&str> {
        self.metadata.labels.get(SERVER_ID_LABEL).map(String::as_str)
    }
}

/// Object metadata relevant to admission
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResourceMetadata {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub namespace: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub labels: BTreeMap<String, String>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub annotations: BTreeMap<String, String>,
}

/// IntegrationServer spec fragment
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IntegrationServerSpec {
    /// Labels applied to the generated workload (independent of metadata labels)
    #[serde(default, deserialize_with = "null_as_default")]
    pub labels: BTreeMap<String, String>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub annotations: BTreeMap<String, String>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub enable_metrics: bool,

    /// App Connect version (e.g., "12.0")
    #[serde(default, deserialize_with = "null_as_default")]
    pub version: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub disable_routes: bool,

    #[serde(default, deserialize_with = "null_as_default")]
    pub pod: PodSpec,

    #[serde(default, deserialize_with = "null_as_default")]
    pub license: LicenseSpec,
}

/// License acceptance and use
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LicenseSpec {
    #[serde(default, deserialize_with = "null_as_default")]
    pub accept: bool,

    /// License identifier (e.g., "L-APEH-CJUCNR")
    #[serde(default, deserialize_with = "null_as_default")]
    pub license: String,

    /// License use (e.g., "AppConnectEnterpriseProduction", "CloudPakForIntegrationNonProduction")
    #[serde(default, deserialize_with = "null_as_default")]
    pub r#use: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PodSpec {
    #[serde(default, deserialize_with = "null_as_default")]
    pub containers: ContainersSpec,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ContainersSpec {
    #[serde(default, deserialize_with = "null_as_default")]
    pub runtime: RuntimeContainer,
}

/// Runtime container settings; not inspected by any policy yet
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeContainer {
    #[serde(default, deserialize_with = "null_as_default")]
    pub image: String,
}

fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}
