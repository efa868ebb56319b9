use super::{Claims, IdentityError, IdentityProvider, TokenPair};
use futures::future::{BoxFuture, FutureExt};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// In-process token table.
///
/// Tokens are registered up front; anything else is rejected as invalid.
/// Refresh returns `<refresh>-access` / `<refresh>-refresh` for any refresh
/// token that was registered with [`StaticIdentityProvider::with_refresh`].
#[derive(Debug, Clone, Default)]
pub struct StaticIdentityProvider {
    tokens: Arc<RwLock<HashMap<String, Claims>>>,
    refresh_tokens: Arc<RwLock<Vec<String>>>,
}

impl StaticIdentityProvider {
    /// Empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `token` for `claims`.
    #[must_use]
    pub fn with_token(self, token: impl Into<String>, claims: Claims) -> Self {
        self.insert(token, claims);
        self
    }

    /// Register a refresh token.
    #[must_use]
    pub fn with_refresh(self, refresh_token: impl Into<String>) -> Self {
        if let Ok(mut tokens) = self.refresh_tokens.write() {
            tokens.push(refresh_token.into());
        }
        self
    }

    /// Register `token` for `claims` on a shared table.
    pub fn insert(&self, token: impl Into<String>, claims: Claims) {
        if let Ok(mut tokens) = self.tokens.write() {
            tokens.insert(token.into(), claims);
        }
    }

    /// Verified, non-expiring claims for `subject`.
    #[must_use]
    pub fn verified(subject: &str) -> Claims {
        Claims {
            subject: subject.to_string(),
            expires_at: None,
            identity_verified: true,
            email: Some(format!("{subject}@example.com")),
        }
    }
}

impl IdentityProvider for StaticIdentityProvider {
    fn introspect<'a>(&'a self, token: &'a str) -> BoxFuture<'a, Result<Claims, IdentityError>> {
        let found = self
            .tokens
            .read()
            .ok()
            .and_then(|tokens| tokens.get(token).cloned());
        async move { found.ok_or(IdentityError::InvalidToken) }.boxed()
    }

    fn refresh<'a>(
        &'a self,
        refresh_token: &'a str,
    ) -> BoxFuture<'a, Result<TokenPair, IdentityError>> {
        let known = self
            .refresh_tokens
            .read()
            .is_ok_and(|tokens| tokens.iter().any(|t| t == refresh_token));
        async move {
            if !known {
                return Err(IdentityError::InvalidToken);
            }
            Ok(TokenPair {
                access_token: format!("{refresh_token}-access"),
                refresh_token: format!("{refresh_token}-refresh"),
                expires_in: 300,
            })
        }
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[tokio::test]
    async fn registered_tokens_resolve() {
        let provider =
            StaticIdentityProvider::new().with_token("t-1", StaticIdentityProvider::verified("alice"));
        assert_eq!(provider.introspect("t-1").await.unwrap().subject, "alice");
        assert_eq!(
            provider.introspect("other").await,
            Err(IdentityError::InvalidToken)
        );
    }

    #[tokio::test]
    async fn refresh_needs_a_known_token() {
        let provider = StaticIdentityProvider::new().with_refresh("r-1");
        assert_eq!(provider.refresh("r-1").await.unwrap().access_token, "r-1-access");
        assert!(provider.refresh("r-2").await.is_err());
    }
}
