pub mod browser;
mod callback;
pub mod client;
mod pkce;
pub mod strategy;

pub use browser::{BrowserOpener, SystemBrowser};
#[cfg(any(test, feature = "test-support"))]
pub use client::MockPublicClient;
pub use client::{AuthenticationResult, CachedAccount, PublicClient, PublicClientApp};
pub use strategy::{AccountState, InteractiveOAuthStrategy};
