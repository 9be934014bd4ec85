use crate::auth::error::CredentialError;
use async_trait::async_trait;
use tokio::process::Command;

/// Presents a sign-in URL to the user.
#[async_trait]
pub trait BrowserOpener: Send + Sync {
    async fn open(&self, url: &str) -> Result<(), CredentialError>;
}

/// Opens URLs with the platform's default browser.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemBrowser;

#[async_trait]
impl BrowserOpener for SystemBrowser {
    async fn open(&self, url: &str) -> Result<(), CredentialError> {
        let mut cmd = if cfg!(target_os = "macos") {
            let mut cmd = Command::new("open");
            cmd.arg(url);
            cmd
        } else if cfg!(windows) {
            let mut cmd = Command::new("rundll32");
            cmd.arg("url.dll,FileProtocolHandler").arg(url);
            cmd
        } else {
            let mut cmd = Command::new("xdg-open");
            cmd.arg(url);
            cmd
        };

        // stdout belongs to the MCP stdio transport.
        cmd.stdin(std::process::Stdio::null())
            .stdout(std::process::Stdio::null())
            .stderr(std::process::Stdio::null());

        let status = cmd
            .status()
            .await
            .map_err(|e| CredentialError::Interactive(format!("failed to launch browser: {}", e)))?;
        if !status.success() {
            return Err(CredentialError::Interactive(format!(
                "browser launcher exited with {}",
                status
            )));
        }
        Ok(())
    }
}
