use thiserror::Error;

/// Failure of a single credential source or identity-provider call.
#[derive(Error, Debug)]
pub enum CredentialError {
    #[error("Azure identity error: {0}")]
    Azure(#[from] azure_core::Error),
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON parsing failed: {0}")]
    SerdeJson(#[from] serde_json::Error),
    #[error("Azure CLI error: {0}")]
    AzureCli(String),
    #[error("identity provider returned {error}: {description}")]
    OAuth { error: String, description: String },
    #[error("interactive sign-in failed: {0}")]
    Interactive(String),
    #[error("no cached refresh token for account {0}")]
    NoRefreshToken(String),
    #[error("credential returned an empty access token")]
    EmptyToken,
    #[error("all credentials in the chain failed: {0}")]
    ChainExhausted(String),
}

/// User-visible authentication failure, raised once every fallback inside a
/// strategy has been used up.
#[derive(Error, Debug)]
pub enum AuthError {
    #[error(
        "Failed to obtain Azure DevOps token. Ensure you have Azure CLI logged or use interactive type of authentication. ({0})"
    )]
    CredentialUnavailable(#[source] CredentialError),
    #[error("Failed to obtain Azure DevOps OAuth token. ({0})")]
    OAuth(#[source] CredentialError),
}
