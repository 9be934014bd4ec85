use crate::azure::client::{AzureDevOpsClient, AzureError};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct Team {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TeamListResponse {
    value: Vec<Team>,
}

/// List teams of a project
pub async fn list_teams(
    client: &AzureDevOpsClient,
    project: &str,
    mine: bool,
) -> Result<Vec<Team>, AzureError> {
    // Teams API: https://dev.azure.com/{organization}/_apis/projects/{project}/teams
    let path = format!(
        "projects/{}/teams?$mine={}&api-version=7.1",
        urlencoding::encode(project),
        mine
    );
    let response: TeamListResponse = client.get(&path).await?;
    Ok(response.value)
}
