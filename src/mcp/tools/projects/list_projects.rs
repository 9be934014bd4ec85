use crate::azure::{client::AzureDevOpsClient, projects};
use crate::mcp::tools::support::{projects_to_csv, tool_error};
use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
    schemars::{self, JsonSchema},
    serde::Deserialize,
};

#[derive(Deserialize, JsonSchema)]
pub struct ListProjectsArgs {
    /// Maximum number of projects to return
    #[serde(default)]
    pub top: Option<u32>,
    /// Number of projects to skip
    #[serde(default)]
    pub skip: Option<u32>,
}

pub async fn list_projects(
    client: &AzureDevOpsClient,
    args: ListProjectsArgs,
) -> Result<CallToolResult, McpError> {
    log::info!(
        "Tool invoked: core_list_projects(top={:?}, skip={:?})",
        args.top,
        args.skip
    );
    let projects = projects::list_projects(client, args.top, args.skip)
        .await
        .map_err(tool_error)?;

    let data = projects_to_csv(&projects).map_err(tool_error)?;
    Ok(CallToolResult::success(vec![Content::text(data)]))
}
