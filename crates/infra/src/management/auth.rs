//! Access tokens for the management API
//!
//! Acquiring and refreshing credentials happens outside this crate; the
//! client only asks a provider for the current bearer token before each
//! request.

use std::fmt;

use async_trait::async_trait;

/// Trait for providing access tokens
///
/// This trait allows dependency injection and testing with mock providers.
#[async_trait]
pub trait AccessTokenProvider: Send + Sync {
    /// Get a valid access token
    ///
    /// Implementations that cache tokens should refresh them here.
    async fn access_token(&self) -> anyhow::Result<String>;
}

/// Provider that always hands out the same token.
#[derive(Clone)]
pub struct StaticTokenProvider {
    token: String,
}

impl StaticTokenProvider {
    /// Provider that always hands out `token`.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self { token: token.into() }
    }
}

impl fmt::Debug for StaticTokenProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticTokenProvider").field("token", &"<redacted>").finish()
    }
}

#[async_trait]
impl AccessTokenProvider for StaticTokenProvider {
    async fn access_token(&self) -> anyhow::Result<String> {
        Ok(self.token.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn static_provider_returns_its_token() {
        let provider = StaticTokenProvider::new("t0k3n");
        assert_eq!(provider.access_token().await.unwrap(), "t0k3n");
        assert!(!format!("{provider:?}").contains("t0k3n"));
    }
}
