use crate::auth::credential::{AccessToken, TokenSource};
use crate::auth::error::CredentialError;
use async_trait::async_trait;

/// Tries each source in order and returns the first token obtained.
pub struct ChainedCredential {
    sources: Vec<Box<dyn TokenSource>>,
}

impl ChainedCredential {
    pub fn new(sources: Vec<Box<dyn TokenSource>>) -> Self {
        Self { sources }
    }

    pub fn with<S: TokenSource + 'static>(mut self, source: S) -> Self {
        self.sources.push(Box::new(source));
        self
    }

    /// Names of the sources in the order they are attempted.
    pub fn source_names(&self) -> Vec<&str> {
        self.sources.iter().map(|s| s.name()).collect()
    }
}

#[async_trait]
impl TokenSource for ChainedCredential {
    fn name(&self) -> &str {
        "chain"
    }

    async fn get_token(&self, resource: &str) -> Result<AccessToken, CredentialError> {
        let mut errors = Vec::new();

        for source in &self.sources {
            match source.get_token(resource).await {
                Ok(token) if !token.is_empty() => {
                    log::debug!("Token obtained from credential: {}", source.name());
                    return Ok(token);
                }
                Ok(_) => {
                    log::debug!("Credential {} returned an empty token", source.name());
                    errors.push(format!("{}: {}", source.name(), CredentialError::EmptyToken));
                }
                Err(e) => {
                    log::debug!("Credential {} failed: {}", source.name(), e);
                    errors.push(format!("{}: {}", source.name(), e));
                }
            }
        }

        Err(CredentialError::ChainExhausted(errors.join("; ")))
    }
}
