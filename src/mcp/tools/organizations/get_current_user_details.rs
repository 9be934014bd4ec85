use crate::azure::{client::AzureDevOpsClient, organizations};
use crate::mcp::tools::support::tool_error;
use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};

pub async fn get_current_user_details(
    client: &AzureDevOpsClient,
) -> Result<CallToolResult, McpError> {
    log::info!("Tool invoked: core_get_current_user_details");
    let data = organizations::get_connection_data(client)
        .await
        .map_err(tool_error)?;

    let text = serde_json::to_string_pretty(&data).map_err(tool_error)?;
    Ok(CallToolResult::success(vec![Content::text(text)]))
}
