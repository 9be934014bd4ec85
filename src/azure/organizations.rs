use crate::azure::client::{AzureDevOpsClient, AzureError};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// `_apis/connectionData`. Fields not modelled here are kept in `extra` and
/// serialized back unchanged.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionData {
    pub authenticated_user: Identity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authorized_user: Option<Identity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_id: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_display_name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Details of the signed-in user as seen by the organization
pub async fn get_connection_data(
    client: &AzureDevOpsClient,
) -> Result<ConnectionData, AzureError> {
    client.get("connectionData").await
}
