use crate::azure::client::{AzureDevOpsClient, AzureError};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub state: String,
    #[serde(default)]
    pub visibility: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProjectListResponse {
    value: Vec<Project>,
}

/// List all projects in the organization
pub async fn list_projects(
    client: &AzureDevOpsClient,
    top: Option<u32>,
    skip: Option<u32>,
) -> Result<Vec<Project>, AzureError> {
    let mut path = "projects?api-version=7.1".to_string();
    if let Some(top) = top {
        path.push_str(&format!("&$top={}", top));
    }
    if let Some(skip) = skip {
        path.push_str(&format!("&$skip={}", skip));
    }
    let response: ProjectListResponse = client.get(&path).await?;
    Ok(response.value)
}
