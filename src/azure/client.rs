use crate::auth::{AccessToken, AuthError, TokenGetter};
use crate::azure::user_agent::UserAgentComposer;
use reqwest::{Client, Method};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use thiserror::Error;

pub const AZURE_DEVOPS_BASE_URL: &str = "https://dev.azure.com";

#[derive(Error, Debug)]
pub enum AzureError {
    #[error("Authentication failed: {0}")]
    AuthError(#[from] AuthError),
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("JSON parsing failed: {0}")]
    SerdeJson(#[from] serde_json::Error),
    #[error("API error: {0}")]
    ApiError(String),
}

/// REST client bound to one Azure DevOps organization. Every request asks the
/// token getter for a bearer token first.
pub struct AzureDevOpsClient {
    client: Client,
    base_url: String,
    organization: String,
    token_getter: TokenGetter,
    user_agent: Arc<UserAgentComposer>,
}

impl AzureDevOpsClient {
    pub fn new(
        organization: impl Into<String>,
        token_getter: TokenGetter,
        user_agent: Arc<UserAgentComposer>,
    ) -> Self {
        Self {
            client: Client::new(),
            base_url: AZURE_DEVOPS_BASE_URL.to_string(),
            organization: organization.into(),
            token_getter,
            user_agent,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn organization(&self) -> &str {
        &self.organization
    }

    /// `https://dev.azure.com/{organization}`
    pub fn org_url(&self) -> String {
        format!("{}/{}", self.base_url, self.organization)
    }

    pub fn user_agent(&self) -> &UserAgentComposer {
        &self.user_agent
    }

    async fn get_token(&self) -> Result<AccessToken, AzureError> {
        Ok(self.token_getter.get_token().await?)
    }

    /// Make a request at the organization level
    /// URL format: https://dev.azure.com/{organization}/_apis/{path}
    pub async fn org_request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&(impl Serialize + ?Sized)>,
    ) -> Result<T, AzureError> {
        let url = format!("{}/_apis/{}", self.org_url(), path);
        let token = self.get_token().await?;

        log::debug!("ORG Request: {} {}", method, url);
        if let Some(b) = &body
            && let Ok(json) = serde_json::to_string_pretty(b)
        {
            log::debug!("Request body: {}", json);
        }

        let mut request = self
            .client
            .request(method, &url)
            .bearer_auth(token.secret())
            .header(reqwest::header::USER_AGENT, self.user_agent.user_agent())
            .header("Content-Type", "application/json");

        if let Some(b) = body {
            request = request.json(b);
        }

        let response = request.send().await?;
        let status = response.status();

        log::debug!("Response status: {}", status);

        if !status.is_success() {
            let error_text = response.text().await?;
            log::debug!("Error response: {}", error_text);
            return Err(AzureError::ApiError(format!("{}: {}", status, error_text)));
        }

        let response_text = response.text().await?;
        log::debug!("Response body: {}", response_text);

        let data = serde_json::from_str(&response_text)?;
        Ok(data)
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, AzureError> {
        self.org_request(Method::GET, path, None::<&String>).await
    }
}

#[cfg(test)]
pub(crate) fn test_client(base_url: &str) -> AzureDevOpsClient {
    let getter = TokenGetter::from_fn("test", || async { Ok(AccessToken::new("t")) });
    AzureDevOpsClient::new("contoso", getter, Arc::new(UserAgentComposer::new("0.1.0")))
        .with_base_url(base_url)
}
