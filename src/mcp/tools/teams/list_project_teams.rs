use crate::azure::{client::AzureDevOpsClient, teams};
use crate::mcp::tools::support::{deserialize_non_empty_string, tool_error};
use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
    schemars::{self, JsonSchema},
    serde::Deserialize,
};

#[derive(Deserialize, JsonSchema)]
pub struct ListProjectTeamsArgs {
    /// AzDO project name or id
    #[serde(deserialize_with = "deserialize_non_empty_string")]
    pub project: String,
    /// Only teams the current user belongs to
    #[serde(default)]
    pub mine: bool,
}

pub async fn list_project_teams(
    client: &AzureDevOpsClient,
    args: ListProjectTeamsArgs,
) -> Result<CallToolResult, McpError> {
    log::info!(
        "Tool invoked: core_list_project_teams(project={}, mine={})",
        args.project,
        args.mine
    );
    let teams = teams::list_teams(client, &args.project, args.mine)
        .await
        .map_err(tool_error)?;

    // Names only, to keep the response compact
    let team_names: Vec<String> = teams.into_iter().map(|team| team.name).collect();
    let text = serde_json::to_string(&team_names).map_err(tool_error)?;

    Ok(CallToolResult::success(vec![Content::text(text)]))
}
