use std::sync::RwLock;

/// Builds the `User-Agent` sent to Azure DevOps. The MCP client that
/// connected is appended once it has identified itself.
#[derive(Debug)]
pub struct UserAgentComposer {
    base: String,
    mcp_client: RwLock<Option<String>>,
}

impl UserAgentComposer {
    pub fn new(version: &str) -> Self {
        Self {
            base: format!(
                "AzureDevOps.MCP/{} ({}; {})",
                version,
                std::env::consts::OS,
                std::env::consts::ARCH
            ),
            mcp_client: RwLock::new(None),
        }
    }

    /// Records the MCP client; only the first call has an effect.
    pub fn append_mcp_client_info(&self, name: &str, version: &str) {
        let mut client = self
            .mcp_client
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if client.is_none() {
            *client = Some(format!("MCPClient/{}@{}", name, version));
        }
    }

    pub fn user_agent(&self) -> String {
        let client = self
            .mcp_client
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        match client.as_deref() {
            Some(client) => format!("{} {}", self.base, client),
            None => self.base.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_agent_names_product_and_version() {
        let composer = UserAgentComposer::new("1.2.3");
        assert!(composer.user_agent().starts_with("AzureDevOps.MCP/1.2.3 ("));
    }

    #[test]
    fn client_info_is_appended_once() {
        let composer = UserAgentComposer::new("1.2.3");
        composer.append_mcp_client_info("vscode", "1.99.0");
        composer.append_mcp_client_info("other", "0.1");

        let agent = composer.user_agent();
        assert!(agent.ends_with(" MCPClient/vscode@1.99.0"));
        assert!(!agent.contains("other"));
    }
}
