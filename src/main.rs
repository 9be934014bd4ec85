use anyhow::Context;
use clap::Parser;
use mcp_server_azuredevops::auth::{AuthMode, create_authenticator};
use mcp_server_azuredevops::azure::client::AzureDevOpsClient;
use mcp_server_azuredevops::azure::user_agent::UserAgentComposer;
use mcp_server_azuredevops::mcp::server::AzureDevOpsMcpServer;
use mcp_server_azuredevops::server::http;
use rmcp::ServiceExt;
use rmcp::transport::stdio;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "mcp-server-azuredevops", author, version, about = "Azure DevOps MCP Server", long_about = None)]
struct Args {
    /// Azure DevOps organization name
    #[arg(env = "ADO_MCP_ORGANIZATION")]
    organization: String,

    /// Type of authentication to use: 'interactive', 'azcli' or 'env'
    #[arg(
        short,
        long,
        env = "ADO_MCP_AUTHENTICATION",
        default_value = "interactive",
        value_parser = parse_auth_mode
    )]
    authentication: AuthMode,

    /// Azure tenant ID (applied to 'azcli' and 'env' authentication)
    #[arg(short, long, env = "ADO_MCP_TENANT")]
    tenant: Option<String>,

    /// Serve MCP over streamable HTTP instead of stdio
    #[arg(long)]
    server: bool,

    /// Port to run the HTTP server on
    #[arg(long, env = "ADO_MCP_PORT", default_value_t = 3000)]
    port: u16,
}

// Unknown values select interactive authentication instead of failing.
fn parse_auth_mode(value: &str) -> Result<AuthMode, std::convert::Infallible> {
    Ok(AuthMode::from(value))
}

async fn run(args: Args) -> anyhow::Result<()> {
    let user_agent = Arc::new(UserAgentComposer::new(env!("CARGO_PKG_VERSION")));
    let authenticator = create_authenticator(args.authentication, args.tenant.as_deref());
    let client = AzureDevOpsClient::new(&args.organization, authenticator, user_agent);
    let mcp_server = AzureDevOpsMcpServer::new(client);

    if args.server {
        log::info!("Starting web server on port {}", args.port);
        http::run_server(mcp_server, args.port)
            .await
            .context("HTTP server failed")?;
    } else {
        log::info!(
            "Starting stdio server for organization {}",
            args.organization
        );
        let service = mcp_server
            .serve(stdio())
            .await
            .context("failed to start MCP stdio server")?;
        service.waiting().await?;
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    // stdout carries the MCP stdio transport; env_logger writes to stderr.
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    if let Err(e) = run(args).await {
        log::error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}
