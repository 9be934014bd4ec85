use crate::auth::error::CredentialError;
use async_trait::async_trait;
use std::fmt;

/// Opaque bearer token. Never inspected; the `Debug` output is redacted so
/// the value cannot leak into logs.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn secret(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(<redacted>)")
    }
}

/// A source able to mint a token for a resource (Azure CLI, the default
/// azure_identity chain, an ordered chain of both).
#[async_trait]
pub trait TokenSource: Send + Sync {
    /// Source name for logging.
    fn name(&self) -> &str;

    async fn get_token(&self, resource: &str) -> Result<AccessToken, CredentialError>;
}
