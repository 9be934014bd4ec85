use crate::auth::azure_cli::AzureCliCredential;
use crate::auth::credential::{AccessToken, TokenSource};
use crate::auth::error::CredentialError;
use async_trait::async_trait;
use azure_core::auth::TokenCredential;
use azure_identity::DefaultAzureCredential;
use std::sync::Arc;

/// Which sources the default resolver may consult.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSelection {
    /// Developer tooling only (the Azure CLI login).
    DeveloperTools,
    /// The full azure_identity chain: environment, managed identity, Azure CLI.
    All,
}

enum Resolver {
    DeveloperTools(AzureCliCredential),
    All(Arc<DefaultAzureCredential>),
}

/// The default credential resolver, narrowed to developer tooling unless the
/// full chain is asked for explicitly.
pub struct DefaultCredentialResolver {
    selection: CredentialSelection,
    resolver: Resolver,
}

impl DefaultCredentialResolver {
    pub fn new(selection: CredentialSelection) -> Self {
        let resolver = match selection {
            CredentialSelection::DeveloperTools => {
                Resolver::DeveloperTools(AzureCliCredential::new())
            }
            CredentialSelection::All => Resolver::All(Arc::new(DefaultAzureCredential::default())),
        };
        Self {
            selection,
            resolver,
        }
    }

    pub fn selection(&self) -> CredentialSelection {
        self.selection
    }
}

#[async_trait]
impl TokenSource for DefaultCredentialResolver {
    fn name(&self) -> &str {
        match self.selection {
            CredentialSelection::DeveloperTools => "default(dev)",
            CredentialSelection::All => "default(all)",
        }
    }

    async fn get_token(&self, resource: &str) -> Result<AccessToken, CredentialError> {
        let token = match &self.resolver {
            Resolver::DeveloperTools(cli) => cli.get_token(resource).await?,
            Resolver::All(credential) => {
                let response = credential.get_token(resource).await?;
                AccessToken::new(response.token.secret().to_string())
            }
        };
        if token.is_empty() {
            return Err(CredentialError::EmptyToken);
        }
        Ok(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selection_is_reported_in_name() {
        let dev = DefaultCredentialResolver::new(CredentialSelection::DeveloperTools);
        assert_eq!(dev.selection(), CredentialSelection::DeveloperTools);
        assert_eq!(dev.name(), "default(dev)");

        let all = DefaultCredentialResolver::new(CredentialSelection::All);
        assert_eq!(all.name(), "default(all)");
    }
}
