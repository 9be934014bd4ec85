//! Authenticator factory.
//!
//! Picks one strategy for the process and hands back a [`TokenGetter`] that
//! every outbound Azure DevOps request calls first:
//! - `interactive`: browser sign-in through a public client app, renewed
//!   silently afterwards ([`oauth::InteractiveOAuthStrategy`]).
//! - `azcli` / `env`: a credential chain over the Azure CLI login or the full
//!   azure_identity default chain, with a tenant-scoped Azure CLI credential
//!   tried first when a tenant is given.

pub mod azure_cli;
pub mod chain;
pub mod credential;
pub mod default_credential;
pub mod error;
pub mod oauth;

use futures::FutureExt;
use futures::future::BoxFuture;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

pub use azure_cli::AzureCliCredential;
pub use chain::ChainedCredential;
pub use credential::{AccessToken, TokenSource};
pub use default_credential::{CredentialSelection, DefaultCredentialResolver};
pub use error::{AuthError, CredentialError};

use oauth::{BrowserOpener, InteractiveOAuthStrategy, PublicClient, PublicClientApp, SystemBrowser};

/// Application id of the Azure DevOps resource.
pub const AZURE_DEVOPS_RESOURCE: &str = "499b84ac-1321-427f-aa17-267ca6975798";
/// OAuth scope for the Azure DevOps resource.
pub const AZURE_DEVOPS_SCOPE: &str = "499b84ac-1321-427f-aa17-267ca6975798/.default";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthMode {
    #[default]
    Interactive,
    AzCli,
    Env,
}

impl AuthMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthMode::Interactive => "interactive",
            AuthMode::AzCli => "azcli",
            AuthMode::Env => "env",
        }
    }
}

/// Never fails: anything unrecognized selects interactive authentication.
impl From<&str> for AuthMode {
    fn from(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "interactive" => AuthMode::Interactive,
            "azcli" => AuthMode::AzCli,
            "env" => AuthMode::Env,
            other => {
                log::warn!(
                    "Unknown authentication type '{}', using interactive authentication",
                    other
                );
                AuthMode::Interactive
            }
        }
    }
}

impl fmt::Display for AuthMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

type TokenFn = dyn Fn() -> BoxFuture<'static, Result<AccessToken, AuthError>> + Send + Sync;

/// Nullary async token function shared by every caller in the process.
#[derive(Clone)]
pub struct TokenGetter {
    strategy: &'static str,
    get: Arc<TokenFn>,
}

impl TokenGetter {
    pub fn from_fn<F, Fut>(strategy: &'static str, f: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<AccessToken, AuthError>> + Send + 'static,
    {
        Self {
            strategy,
            get: Arc::new(move || f().boxed()),
        }
    }

    pub async fn get_token(&self) -> Result<AccessToken, AuthError> {
        (self.get)().await
    }

    /// Which strategy backs this getter: `"interactive"` or `"credential-chain"`.
    pub fn strategy(&self) -> &'static str {
        self.strategy
    }
}

impl fmt::Debug for TokenGetter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenGetter")
            .field("strategy", &self.strategy)
            .finish()
    }
}

/// Build the token getter for `mode`, opening the system browser for
/// interactive sign-in.
pub fn create_authenticator(mode: AuthMode, tenant_id: Option<&str>) -> TokenGetter {
    create_authenticator_with_browser(mode, tenant_id, Arc::new(SystemBrowser))
}

pub fn create_authenticator_with_browser(
    mode: AuthMode,
    tenant_id: Option<&str>,
    browser: Arc<dyn BrowserOpener>,
) -> TokenGetter {
    log::info!("Using '{}' authentication", mode);
    match mode {
        AuthMode::AzCli => credential_getter(Arc::new(build_credential_chain(
            CredentialSelection::DeveloperTools,
            tenant_id,
        ))),
        AuthMode::Env => credential_getter(Arc::new(build_credential_chain(
            CredentialSelection::All,
            tenant_id,
        ))),
        AuthMode::Interactive => interactive_getter(Arc::new(PublicClientApp::new(browser))),
    }
}

/// The tenant-scoped Azure CLI credential (when a tenant is given) followed
/// by the default resolver.
pub fn build_credential_chain(
    selection: CredentialSelection,
    tenant_id: Option<&str>,
) -> ChainedCredential {
    let mut chain = ChainedCredential::new(Vec::new());
    if let Some(tenant) = tenant_id.map(str::trim).filter(|t| !t.is_empty()) {
        chain = chain.with(AzureCliCredential::with_tenant(tenant));
    }
    chain.with(DefaultCredentialResolver::new(selection))
}

pub(crate) fn credential_getter(source: Arc<dyn TokenSource>) -> TokenGetter {
    TokenGetter::from_fn("credential-chain", move || {
        let source = source.clone();
        async move {
            source
                .get_token(AZURE_DEVOPS_RESOURCE)
                .await
                .map_err(AuthError::CredentialUnavailable)
        }
    })
}

pub(crate) fn interactive_getter(client: Arc<dyn PublicClient>) -> TokenGetter {
    let strategy = Arc::new(InteractiveOAuthStrategy::new(client, AZURE_DEVOPS_SCOPE));
    TokenGetter::from_fn("interactive", move || {
        let strategy = strategy.clone();
        async move { strategy.get_token().await }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::oauth::{AuthenticationResult, CachedAccount, MockPublicClient};
    use async_trait::async_trait;

    struct NoLogin;

    #[async_trait]
    impl TokenSource for NoLogin {
        fn name(&self) -> &str {
            "no_login"
        }

        async fn get_token(&self, _resource: &str) -> Result<AccessToken, CredentialError> {
            Err(CredentialError::AzureCli(
                "Please run 'az login' to setup account.".to_string(),
            ))
        }
    }

    struct FixedToken;

    #[async_trait]
    impl TokenSource for FixedToken {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn get_token(&self, resource: &str) -> Result<AccessToken, CredentialError> {
            assert_eq!(resource, AZURE_DEVOPS_RESOURCE);
            Ok(AccessToken::new("cli-token"))
        }
    }

    #[test]
    fn known_modes_parse_case_insensitively() {
        assert_eq!(AuthMode::from("interactive"), AuthMode::Interactive);
        assert_eq!(AuthMode::from("AzCli"), AuthMode::AzCli);
        assert_eq!(AuthMode::from(" env "), AuthMode::Env);
    }

    #[test]
    fn unknown_mode_falls_back_to_interactive() {
        assert_eq!(AuthMode::from("device-code"), AuthMode::Interactive);
        assert_eq!(AuthMode::from(""), AuthMode::Interactive);
    }

    #[test]
    fn scope_is_resource_default_scope() {
        assert_eq!(AZURE_DEVOPS_SCOPE, format!("{}/.default", AZURE_DEVOPS_RESOURCE));
    }

    #[test]
    fn every_mode_yields_a_getter_without_failing() {
        assert_eq!(
            create_authenticator(AuthMode::Interactive, None).strategy(),
            "interactive"
        );
        assert_eq!(
            create_authenticator(AuthMode::AzCli, Some("contoso")).strategy(),
            "credential-chain"
        );
        assert_eq!(
            create_authenticator(AuthMode::Env, None).strategy(),
            "credential-chain"
        );
        assert_eq!(
            create_authenticator(AuthMode::from("bogus"), Some("contoso")).strategy(),
            "interactive"
        );
    }

    #[test]
    fn tenant_scoped_cli_credential_is_tried_first() {
        let chain = build_credential_chain(CredentialSelection::DeveloperTools, Some("contoso"));
        assert_eq!(chain.source_names(), vec!["azure_cli", "default(dev)"]);

        let chain = build_credential_chain(CredentialSelection::All, Some("contoso"));
        assert_eq!(chain.source_names(), vec!["azure_cli", "default(all)"]);
    }

    #[test]
    fn without_tenant_only_the_default_resolver_is_used() {
        let chain = build_credential_chain(CredentialSelection::DeveloperTools, None);
        assert_eq!(chain.source_names(), vec!["default(dev)"]);

        let chain = build_credential_chain(CredentialSelection::DeveloperTools, Some("  "));
        assert_eq!(chain.source_names(), vec!["default(dev)"]);
    }

    #[tokio::test]
    async fn credential_getter_returns_resolver_token() {
        let getter = credential_getter(Arc::new(FixedToken));
        assert_eq!(getter.get_token().await.unwrap().secret(), "cli-token");
    }

    #[tokio::test]
    async fn credential_getter_failure_mentions_cli_login_and_interactive() {
        let getter = credential_getter(Arc::new(NoLogin));
        let err = getter.get_token().await.unwrap_err();

        assert!(matches!(err, AuthError::CredentialUnavailable(_)));
        let message = err.to_string();
        assert!(message.contains("Azure CLI"));
        assert!(message.contains("interactive"));
    }

    #[tokio::test]
    async fn interactive_getter_is_shared_across_clones() {
        let mut client = MockPublicClient::new();
        client
            .expect_acquire_token_interactive()
            .withf(|scope: &str| scope == AZURE_DEVOPS_SCOPE)
            .times(1)
            .returning(|_| {
                Ok(AuthenticationResult {
                    access_token: AccessToken::new("interactive"),
                    account: CachedAccount {
                        home_account_id: "acct".to_string(),
                        username: None,
                        tenant_id: None,
                    },
                })
            });
        client
            .expect_acquire_token_silent()
            .times(1)
            .returning(|account, _| {
                Ok(AuthenticationResult {
                    access_token: AccessToken::new("silent"),
                    account: account.clone(),
                })
            });

        let getter = interactive_getter(Arc::new(client));
        let other = getter.clone();

        assert_eq!(getter.get_token().await.unwrap().secret(), "interactive");
        assert_eq!(other.get_token().await.unwrap().secret(), "silent");
    }
}
