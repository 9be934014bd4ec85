use crate::azure::client::AzureDevOpsClient;
use crate::mcp::tools::{organizations, projects, teams};
use rmcp::{
    ErrorData as McpError, RoleServer,
    handler::server::router::tool::ToolRouter,
    handler::server::wrapper::Parameters,
    model::{CallToolResult, Implementation, ServerCapabilities, ServerInfo},
    service::NotificationContext,
    tool, tool_handler, tool_router,
};
use std::future::Future;
use std::sync::Arc;

#[derive(Clone)]
pub struct AzureDevOpsMcpServer {
    client: Arc<AzureDevOpsClient>,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl AzureDevOpsMcpServer {
    pub fn new(client: AzureDevOpsClient) -> Self {
        Self {
            client: Arc::new(client),
            tool_router: Self::tool_router(),
        }
    }

    #[tool(
        description = "Get details of the currently authenticated user (id, display name, account) for the organization"
    )]
    async fn core_get_current_user_details(&self) -> Result<CallToolResult, McpError> {
        organizations::get_current_user_details(&self.client).await
    }

    #[tool(description = "List projects in the Azure DevOps organization")]
    async fn core_list_projects(
        &self,
        args: Parameters<projects::ListProjectsArgs>,
    ) -> Result<CallToolResult, McpError> {
        projects::list_projects(&self.client, args.0).await
    }

    #[tool(description = "List teams of a project")]
    async fn core_list_project_teams(
        &self,
        args: Parameters<teams::ListProjectTeamsArgs>,
    ) -> Result<CallToolResult, McpError> {
        teams::list_project_teams(&self.client, args.0).await
    }
}

#[tool_handler]
impl rmcp::ServerHandler for AzureDevOpsMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "Azure DevOps MCP Server".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                icons: None,
                title: None,
                website_url: None,
            },
            instructions: Some(format!(
                "Use these tools to interact with the Azure DevOps organization '{}'",
                self.client.organization()
            )),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }

    fn on_initialized(
        &self,
        context: NotificationContext<RoleServer>,
    ) -> impl Future<Output = ()> + Send + '_ {
        if let Some(peer) = context.peer.peer_info() {
            log::info!(
                "MCP client connected: {} {}",
                peer.client_info.name,
                peer.client_info.version
            );
            self.client
                .user_agent()
                .append_mcp_client_info(&peer.client_info.name, &peer.client_info.version);
        }
        std::future::ready(())
    }
}
