use crate::auth::credential::AccessToken;
use crate::auth::error::CredentialError;
use crate::auth::oauth::browser::BrowserOpener;
use crate::auth::oauth::callback::CallbackListener;
use crate::auth::oauth::pkce::{generate_pkce_pair, random_url_safe};
use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

pub const PUBLIC_CLIENT_ID: &str = "ac9c72b1-86e4-4849-be22-eaae7731117a";
pub const AUTHORITY_HOST: &str = "https://login.microsoftonline.com";
pub const DEFAULT_TENANT: &str = "common";

const INTERACTIVE_TIMEOUT: Duration = Duration::from_secs(300);
// Requested next to the resource scope so the grant carries a refresh token
// and an id token describing the account.
const OIDC_SCOPES: &str = "offline_access openid profile";

/// Account identity returned by an interactive grant; the key under which
/// the client keeps the refresh token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedAccount {
    pub home_account_id: String,
    pub username: Option<String>,
    pub tenant_id: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AuthenticationResult {
    pub access_token: AccessToken,
    pub account: CachedAccount,
}

/// An OAuth public client application able to renew silently for a known
/// account or run an interactive grant.
#[cfg_attr(any(test, feature = "test-support"), mockall::automock)]
#[async_trait]
pub trait PublicClient: Send + Sync {
    async fn acquire_token_silent(
        &self,
        account: &CachedAccount,
        scope: &str,
    ) -> Result<AuthenticationResult, CredentialError>;

    async fn acquire_token_interactive(
        &self,
        scope: &str,
    ) -> Result<AuthenticationResult, CredentialError>;
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    id_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenErrorResponse {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct IdTokenClaims {
    #[serde(default)]
    oid: Option<String>,
    #[serde(default)]
    tid: Option<String>,
    #[serde(default)]
    sub: Option<String>,
    #[serde(default)]
    preferred_username: Option<String>,
}

/// Authorization-code + PKCE public client against the Microsoft identity
/// platform, with an in-memory refresh-token cache.
pub struct PublicClientApp {
    client_id: String,
    authority_host: String,
    tenant: String,
    http: reqwest::Client,
    browser: Arc<dyn BrowserOpener>,
    interactive_timeout: Duration,
    refresh_tokens: Mutex<HashMap<String, String>>,
}

impl PublicClientApp {
    pub fn new(browser: Arc<dyn BrowserOpener>) -> Self {
        Self {
            client_id: PUBLIC_CLIENT_ID.to_string(),
            authority_host: AUTHORITY_HOST.to_string(),
            tenant: DEFAULT_TENANT.to_string(),
            http: reqwest::Client::new(),
            browser,
            interactive_timeout: INTERACTIVE_TIMEOUT,
            refresh_tokens: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_authority_host(mut self, host: impl Into<String>) -> Self {
        self.authority_host = host.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_interactive_timeout(mut self, timeout: Duration) -> Self {
        self.interactive_timeout = timeout;
        self
    }

    fn endpoint(&self, tenant: &str, name: &str) -> String {
        format!("{}/{}/oauth2/v2.0/{}", self.authority_host, tenant, name)
    }

    fn authorize_url(
        &self,
        redirect_uri: &str,
        scope: &str,
        state: &str,
        challenge: &str,
    ) -> String {
        let params = [
            ("client_id", self.client_id.as_str()),
            ("response_type", "code"),
            ("redirect_uri", redirect_uri),
            ("response_mode", "query"),
            ("scope", scope),
            ("state", state),
            ("code_challenge", challenge),
            ("code_challenge_method", "S256"),
            ("prompt", "select_account"),
        ];
        let query = params
            .iter()
            .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");
        format!("{}?{}", self.endpoint(&self.tenant, "authorize"), query)
    }

    async fn post_token_request(
        &self,
        tenant: &str,
        form: &[(&str, &str)],
    ) -> Result<TokenResponse, CredentialError> {
        let url = self.endpoint(tenant, "token");
        log::debug!("OAuth token request: POST {}", url);

        let response = self.http.post(&url).form(form).send().await?;
        let status = response.status();
        let body = response.text().await?;
        log::debug!("OAuth token response status: {}", status);

        if !status.is_success() {
            return Err(match serde_json::from_str::<TokenErrorResponse>(&body) {
                Ok(err) => CredentialError::OAuth {
                    error: err.error,
                    description: err.error_description.unwrap_or_default(),
                },
                Err(_) => CredentialError::OAuth {
                    error: status.to_string(),
                    description: body.chars().take(240).collect(),
                },
            });
        }

        Ok(serde_json::from_str(&body)?)
    }

    async fn remember_refresh_token(&self, account: &CachedAccount, token: Option<String>) {
        if let Some(token) = token.filter(|t| !t.is_empty()) {
            self.refresh_tokens
                .lock()
                .await
                .insert(account.home_account_id.clone(), token);
        }
    }

    #[cfg(test)]
    pub(crate) async fn seed_refresh_token(&self, account: &CachedAccount, token: &str) {
        self.remember_refresh_token(account, Some(token.to_string()))
            .await;
    }
}

fn scopes_with_oidc(scope: &str) -> String {
    format!("{} {}", scope, OIDC_SCOPES)
}

fn account_from_id_token(id_token: Option<&str>) -> CachedAccount {
    let claims = id_token
        .and_then(|t| t.split('.').nth(1))
        .and_then(|payload| URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok())
        .and_then(|bytes| serde_json::from_slice::<IdTokenClaims>(&bytes).ok())
        .unwrap_or_default();

    let home_account_id = match (&claims.oid, &claims.tid) {
        (Some(oid), Some(tid)) => format!("{}.{}", oid, tid),
        _ => claims
            .sub
            .clone()
            .unwrap_or_else(|| format!("anonymous-{}", random_url_safe(8))),
    };

    CachedAccount {
        home_account_id,
        username: claims.preferred_username,
        tenant_id: claims.tid,
    }
}

#[async_trait]
impl PublicClient for PublicClientApp {
    async fn acquire_token_silent(
        &self,
        account: &CachedAccount,
        scope: &str,
    ) -> Result<AuthenticationResult, CredentialError> {
        let refresh_token = self
            .refresh_tokens
            .lock()
            .await
            .get(&account.home_account_id)
            .cloned()
            .ok_or_else(|| CredentialError::NoRefreshToken(account.home_account_id.clone()))?;

        let tenant = account.tenant_id.as_deref().unwrap_or(&self.tenant);
        let scopes = scopes_with_oidc(scope);
        let response = self
            .post_token_request(
                tenant,
                &[
                    ("grant_type", "refresh_token"),
                    ("client_id", self.client_id.as_str()),
                    ("refresh_token", refresh_token.as_str()),
                    ("scope", scopes.as_str()),
                ],
            )
            .await?;

        self.remember_refresh_token(account, response.refresh_token)
            .await;

        Ok(AuthenticationResult {
            access_token: AccessToken::new(response.access_token.unwrap_or_default()),
            account: account.clone(),
        })
    }

    async fn acquire_token_interactive(
        &self,
        scope: &str,
    ) -> Result<AuthenticationResult, CredentialError> {
        let listener = CallbackListener::bind().await?;
        let redirect_uri = listener.redirect_uri();
        let pkce = generate_pkce_pair();
        let state = random_url_safe(16);
        let scopes = scopes_with_oidc(scope);

        let url = self.authorize_url(&redirect_uri, &scopes, &state, &pkce.challenge);
        log::warn!(
            "Sign in to Azure DevOps in your browser. If it does not open, visit: {}",
            url
        );
        if let Err(e) = self.browser.open(&url).await {
            log::warn!("Could not open a browser: {}", e);
        }

        let payload = listener
            .wait_for_redirect(&state, self.interactive_timeout)
            .await?;
        if let Some(error) = payload.error {
            return Err(CredentialError::OAuth {
                error,
                description: payload.error_description.unwrap_or_default(),
            });
        }
        let code = payload.code.ok_or_else(|| {
            CredentialError::Interactive("redirect carried no authorization code".to_string())
        })?;

        let response = self
            .post_token_request(
                &self.tenant,
                &[
                    ("grant_type", "authorization_code"),
                    ("client_id", self.client_id.as_str()),
                    ("code", code.as_str()),
                    ("redirect_uri", redirect_uri.as_str()),
                    ("code_verifier", pkce.verifier.as_str()),
                    ("scope", scopes.as_str()),
                ],
            )
            .await?;

        let account = account_from_id_token(response.id_token.as_deref());
        log::info!(
            "Signed in to Azure DevOps as {}",
            account.username.as_deref().unwrap_or("<unknown user>")
        );
        self.remember_refresh_token(&account, response.refresh_token)
            .await;

        Ok(AuthenticationResult {
            access_token: AccessToken::new(response.access_token.unwrap_or_default()),
            account,
        })
    }
}
