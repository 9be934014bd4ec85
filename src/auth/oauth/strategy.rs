use crate::auth::credential::AccessToken;
use crate::auth::error::{AuthError, CredentialError};
use crate::auth::oauth::client::{CachedAccount, PublicClient};
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountState {
    NoAccount,
    HasAccount(CachedAccount),
}

/// Interactive OAuth sign-in with silent renewal for the account obtained by
/// the last successful grant.
///
/// Calls are serialized: the state lock is held for the whole acquisition, so
/// concurrent callers in `NoAccount` trigger one interactive grant and the
/// rest renew silently with the account it produced.
pub struct InteractiveOAuthStrategy {
    client: Arc<dyn PublicClient>,
    scope: String,
    state: Mutex<AccountState>,
}

impl InteractiveOAuthStrategy {
    pub fn new(client: Arc<dyn PublicClient>, scope: impl Into<String>) -> Self {
        Self {
            client,
            scope: scope.into(),
            state: Mutex::new(AccountState::NoAccount),
        }
    }

    pub async fn account_state(&self) -> AccountState {
        self.state.lock().await.clone()
    }

    pub async fn get_token(&self) -> Result<AccessToken, AuthError> {
        let mut state = self.state.lock().await;

        if let AccountState::HasAccount(account) = &*state {
            match self.client.acquire_token_silent(account, &self.scope).await {
                Ok(result) if !result.access_token.is_empty() => return Ok(result.access_token),
                Ok(_) => log::debug!("Silent renewal returned no access token"),
                Err(e) => log::debug!("Silent renewal failed: {}", e),
            }
            log::info!("Falling back to interactive sign-in");
        }

        let result = self
            .client
            .acquire_token_interactive(&self.scope)
            .await
            .map_err(AuthError::OAuth)?;
        if result.access_token.is_empty() {
            return Err(AuthError::OAuth(CredentialError::EmptyToken));
        }

        *state = AccountState::HasAccount(result.account);
        Ok(result.access_token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::oauth::client::{AuthenticationResult, MockPublicClient};

    const SCOPE: &str = "499b84ac-1321-427f-aa17-267ca6975798/.default";

    fn account(id: &str) -> CachedAccount {
        CachedAccount {
            home_account_id: id.to_string(),
            username: Some("ada@contoso.com".to_string()),
            tenant_id: Some("tid".to_string()),
        }
    }

    fn grant(token: &str, id: &str) -> AuthenticationResult {
        AuthenticationResult {
            access_token: AccessToken::new(token),
            account: account(id),
        }
    }

    #[tokio::test]
    async fn first_call_runs_interactive_grant_and_stores_account() {
        let mut client = MockPublicClient::new();
        client.expect_acquire_token_silent().never();
        client
            .expect_acquire_token_interactive()
            .withf(|scope: &str| scope == SCOPE)
            .times(1)
            .returning(|_| Ok(grant("interactive", "acct-1")));

        let strategy = InteractiveOAuthStrategy::new(Arc::new(client), SCOPE);
        assert_eq!(strategy.account_state().await, AccountState::NoAccount);

        let token = strategy.get_token().await.unwrap();
        assert_eq!(token.secret(), "interactive");
        assert_eq!(
            strategy.account_state().await,
            AccountState::HasAccount(account("acct-1"))
        );
    }

    #[tokio::test]
    async fn granted_account_is_passed_verbatim_to_silent_renewal() {
        let mut client = MockPublicClient::new();
        client
            .expect_acquire_token_interactive()
            .times(1)
            .returning(|_| Ok(grant("interactive", "acct-1")));
        let expected = account("acct-1");
        client
            .expect_acquire_token_silent()
            .withf(move |account: &CachedAccount, scope: &str| {
                *account == expected && scope == SCOPE
            })
            .times(1)
            .returning(|_, _| Ok(grant("silent", "acct-1")));

        let strategy = InteractiveOAuthStrategy::new(Arc::new(client), SCOPE);
        strategy.get_token().await.unwrap();
        assert_eq!(strategy.get_token().await.unwrap().secret(), "silent");
    }

    #[tokio::test]
    async fn silent_failure_falls_back_to_exactly_one_interactive_grant() {
        let mut client = MockPublicClient::new();
        let mut seq = mockall::Sequence::new();
        client
            .expect_acquire_token_interactive()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(grant("first", "acct-1")));
        client
            .expect_acquire_token_silent()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| {
                Err(CredentialError::OAuth {
                    error: "invalid_grant".to_string(),
                    description: "refresh token revoked".to_string(),
                })
            });
        client
            .expect_acquire_token_interactive()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(grant("second", "acct-2")));

        let strategy = InteractiveOAuthStrategy::new(Arc::new(client), SCOPE);
        strategy.get_token().await.unwrap();

        let token = strategy.get_token().await.unwrap();
        assert_eq!(token.secret(), "second");
        assert_eq!(
            strategy.account_state().await,
            AccountState::HasAccount(account("acct-2"))
        );
    }

    #[tokio::test]
    async fn empty_silent_token_is_a_renewal_miss() {
        let mut client = MockPublicClient::new();
        let mut seq = mockall::Sequence::new();
        client
            .expect_acquire_token_interactive()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(grant("first", "acct-1")));
        client
            .expect_acquire_token_silent()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(grant("", "acct-1")));
        client
            .expect_acquire_token_interactive()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(grant("second", "acct-1")));

        let strategy = InteractiveOAuthStrategy::new(Arc::new(client), SCOPE);
        strategy.get_token().await.unwrap();
        assert_eq!(strategy.get_token().await.unwrap().secret(), "second");
    }

    #[tokio::test]
    async fn repeated_calls_with_working_renewal_never_prompt_again() {
        let mut client = MockPublicClient::new();
        client
            .expect_acquire_token_interactive()
            .times(1)
            .returning(|_| Ok(grant("interactive", "acct-1")));
        client
            .expect_acquire_token_silent()
            .times(2)
            .returning(|_, _| Ok(grant("silent", "acct-1")));

        let strategy = InteractiveOAuthStrategy::new(Arc::new(client), SCOPE);
        strategy.get_token().await.unwrap();
        assert_eq!(strategy.get_token().await.unwrap().secret(), "silent");
        assert_eq!(strategy.get_token().await.unwrap().secret(), "silent");
    }

    #[tokio::test]
    async fn failed_grant_raises_oauth_error_and_keeps_state() {
        let mut client = MockPublicClient::new();
        client
            .expect_acquire_token_interactive()
            .times(1)
            .returning(|_| {
                Err(CredentialError::Interactive(
                    "timed out waiting for sign-in".to_string(),
                ))
            });

        let strategy = InteractiveOAuthStrategy::new(Arc::new(client), SCOPE);
        let err = strategy.get_token().await.unwrap_err();

        assert!(matches!(err, AuthError::OAuth(_)));
        assert!(
            err.to_string()
                .starts_with("Failed to obtain Azure DevOps OAuth token.")
        );
        assert_eq!(strategy.account_state().await, AccountState::NoAccount);
    }

    #[tokio::test]
    async fn grant_without_access_token_is_a_failure() {
        let mut client = MockPublicClient::new();
        client
            .expect_acquire_token_interactive()
            .times(1)
            .returning(|_| Ok(grant("", "acct-1")));

        let strategy = InteractiveOAuthStrategy::new(Arc::new(client), SCOPE);
        let err = strategy.get_token().await.unwrap_err();

        assert!(matches!(err, AuthError::OAuth(CredentialError::EmptyToken)));
        assert_eq!(strategy.account_state().await, AccountState::NoAccount);
    }

    #[tokio::test]
    async fn concurrent_callers_share_one_interactive_grant() {
        let mut client = MockPublicClient::new();
        client
            .expect_acquire_token_interactive()
            .times(1)
            .returning(|_| Ok(grant("interactive", "acct-1")));
        client
            .expect_acquire_token_silent()
            .times(1)
            .returning(|_, _| Ok(grant("silent", "acct-1")));

        let strategy = Arc::new(InteractiveOAuthStrategy::new(Arc::new(client), SCOPE));
        let (a, b) = futures::future::join(strategy.get_token(), strategy.get_token()).await;

        let mut tokens = vec![
            a.unwrap().secret().to_string(),
            b.unwrap().secret().to_string(),
        ];
        tokens.sort();
        assert_eq!(tokens, vec!["interactive", "silent"]);
    }
}
