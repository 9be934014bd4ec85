use crate::auth::credential::{AccessToken, TokenSource};
use crate::auth::error::CredentialError;
use async_trait::async_trait;
use serde::Deserialize;
use tokio::process::Command;

const AZ_PROGRAM: &str = "az";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CliTokenResponse {
    access_token: String,
}

/// Mints tokens by shelling out to `az account get-access-token`, optionally
/// scoped to one tenant.
#[derive(Debug, Clone)]
pub struct AzureCliCredential {
    tenant_id: Option<String>,
    program: String,
}

impl Default for AzureCliCredential {
    fn default() -> Self {
        Self::new()
    }
}

impl AzureCliCredential {
    pub fn new() -> Self {
        Self {
            tenant_id: None,
            program: AZ_PROGRAM.to_string(),
        }
    }

    pub fn with_tenant(tenant_id: impl Into<String>) -> Self {
        Self {
            tenant_id: Some(tenant_id.into()),
            program: AZ_PROGRAM.to_string(),
        }
    }

    /// Override the executable, mostly useful to point at a wrapper script.
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    pub fn tenant_id(&self) -> Option<&str> {
        self.tenant_id.as_deref()
    }

    fn args(&self, resource: &str) -> Result<Vec<String>, CredentialError> {
        let mut args = vec![
            "account".to_string(),
            "get-access-token".to_string(),
            "--resource".to_string(),
            resource.to_string(),
            "--output".to_string(),
            "json".to_string(),
        ];
        if let Some(tenant) = &self.tenant_id {
            validate_tenant_id(tenant)?;
            args.push("--tenant".to_string());
            args.push(tenant.clone());
        }
        Ok(args)
    }

    fn command(&self, args: &[String]) -> Command {
        if cfg!(windows) && self.program == AZ_PROGRAM {
            let mut cmd = Command::new("cmd");
            cmd.arg("/C").arg(&self.program).args(args);
            cmd
        } else {
            let mut cmd = Command::new(&self.program);
            cmd.args(args);
            cmd
        }
    }
}

// Tenant ids are GUIDs or domain names.
fn validate_tenant_id(tenant_id: &str) -> Result<(), CredentialError> {
    let valid = !tenant_id.is_empty()
        && tenant_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '.');
    if valid {
        Ok(())
    } else {
        Err(CredentialError::AzureCli(format!(
            "invalid tenant id '{}'",
            tenant_id
        )))
    }
}

fn parse_cli_output(stdout: &[u8]) -> Result<AccessToken, CredentialError> {
    let response: CliTokenResponse = serde_json::from_slice(stdout)?;
    let token = AccessToken::new(response.access_token);
    if token.is_empty() {
        return Err(CredentialError::EmptyToken);
    }
    Ok(token)
}

#[async_trait]
impl TokenSource for AzureCliCredential {
    fn name(&self) -> &str {
        "azure_cli"
    }

    async fn get_token(&self, resource: &str) -> Result<AccessToken, CredentialError> {
        let args = self.args(resource)?;
        log::debug!(
            "Requesting token from Azure CLI (tenant={})",
            self.tenant_id.as_deref().unwrap_or("<default>")
        );

        let output = self.command(&args).output().await.map_err(|e| {
            CredentialError::AzureCli(format!(
                "failed to run '{}', is the Azure CLI installed? {}",
                self.program, e
            ))
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(CredentialError::AzureCli(stderr.trim().to_string()));
        }

        parse_cli_output(&output.stdout)
    }
}
