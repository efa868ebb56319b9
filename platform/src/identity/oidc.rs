use super::{Claims, IdentityError, IdentityProvider, TokenPair};
use crate::config::IdentityConfig;
use chrono::{DateTime, Utc};
use futures::future::{BoxFuture, FutureExt};
use serde::Deserialize;
use std::time::Duration;
use webnovel_runtime::retry::{RetryPolicy, retry_with_predicate};

/// OIDC provider reached over HTTP.
///
/// Transport failures and 5xx answers are retried according to the policy
/// (two retries by default) and then surface as
/// [`IdentityError::Unavailable`].
#[derive(Debug, Clone)]
pub struct OidcIdentityProvider {
    client: reqwest::Client,
    config: IdentityConfig,
    retry: RetryPolicy,
}

#[derive(Debug, Deserialize)]
struct IntrospectionResponse {
    active: bool,
    sub: Option<String>,
    exp: Option<i64>,
    email: Option<String>,
    #[serde(default)]
    identity_verified: bool,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
    expires_in: i64,
}

fn transport(error: &reqwest::Error) -> IdentityError {
    IdentityError::Unavailable(error.to_string())
}

const fn retryable(error: &IdentityError) -> bool {
    matches!(error, IdentityError::Unavailable(_))
}

impl OidcIdentityProvider {
    /// Build a client for `config`.
    ///
    /// # Errors
    ///
    /// [`IdentityError::Unavailable`] when the HTTP client cannot be built.
    pub fn new(config: IdentityConfig, retry: RetryPolicy) -> Result<Self, IdentityError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| transport(&e))?;
        Ok(Self {
            client,
            config,
            retry,
        })
    }

    async fn introspect_once(&self, token: &str) -> Result<Claims, IdentityError> {
        let response = self
            .client
            .post(&self.config.introspection_url)
            .basic_auth(&self.config.client_id, Some(&self.config.client_secret))
            .form(&[("token", token)])
            .send()
            .await
            .map_err(|e| transport(&e))?;

        let status = response.status();
        if status.is_server_error() {
            return Err(IdentityError::Unavailable(format!("introspection answered {status}")));
        }
        if !status.is_success() {
            return Err(IdentityError::InvalidToken);
        }

        let body: IntrospectionResponse = response.json().await.map_err(|e| transport(&e))?;
        claims_from(body, Utc::now())
    }

    async fn refresh_once(&self, refresh_token: &str) -> Result<TokenPair, IdentityError> {
        let response = self
            .client
            .post(&self.config.token_url)
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
            ])
            .send()
            .await
            .map_err(|e| transport(&e))?;

        let status = response.status();
        if status.is_server_error() {
            return Err(IdentityError::Unavailable(format!("token endpoint answered {status}")));
        }
        if !status.is_success() {
            return Err(IdentityError::InvalidToken);
        }

        let body: TokenResponse = response.json().await.map_err(|e| transport(&e))?;
        Ok(TokenPair {
            access_token: body.access_token,
            refresh_token: body.refresh_token,
            expires_in: body.expires_in,
        })
    }
}

fn claims_from(body: IntrospectionResponse, now: DateTime<Utc>) -> Result<Claims, IdentityError> {
    let expires_at = body.exp.and_then(|exp| DateTime::from_timestamp(exp, 0));
    if !body.active {
        // Providers report expired tokens as inactive; keep the distinction
        return Err(match expires_at {
            Some(at) if at <= now => IdentityError::Expired,
            _ => IdentityError::InvalidToken,
        });
    }
    let subject = body.sub.ok_or(IdentityError::InvalidToken)?;
    let claims = Claims {
        subject,
        expires_at,
        identity_verified: body.identity_verified,
        email: body.email,
    };
    if claims.is_expired(now) {
        return Err(IdentityError::Expired);
    }
    Ok(claims)
}

impl IdentityProvider for OidcIdentityProvider {
    fn introspect<'a>(&'a self, token: &'a str) -> BoxFuture<'a, Result<Claims, IdentityError>> {
        retry_with_predicate(
            "identity_introspect",
            &self.retry,
            move || self.introspect_once(token),
            retryable,
        )
        .boxed()
    }

    fn refresh<'a>(
        &'a self,
        refresh_token: &'a str,
    ) -> BoxFuture<'a, Result<TokenPair, IdentityError>> {
        retry_with_predicate(
            "identity_refresh",
            &self.retry,
            move || self.refresh_once(refresh_token),
            retryable,
        )
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration as ChronoDuration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 6, 1, 0, 0).single().unwrap_or_default()
    }

    fn body(active: bool, exp: Option<DateTime<Utc>>) -> IntrospectionResponse {
        IntrospectionResponse {
            active,
            sub: Some("kc-123".into()),
            exp: exp.map(|at| at.timestamp()),
            email: None,
            identity_verified: true,
        }
    }

    #[test]
    fn active_token_yields_claims() {
        let claims = claims_from(body(true, Some(now() + ChronoDuration::minutes(5))), now());
        assert_eq!(claims.map(|c| c.subject), Ok("kc-123".to_string()));
    }

    #[test]
    fn inactive_past_expiry_is_expired() {
        assert_eq!(
            claims_from(body(false, Some(now() - ChronoDuration::minutes(1))), now()),
            Err(IdentityError::Expired)
        );
        assert_eq!(
            claims_from(body(false, None), now()),
            Err(IdentityError::InvalidToken)
        );
    }

    #[test]
    fn only_transport_failures_are_retried() {
        assert!(retryable(&IdentityError::Unavailable("timeout".into())));
        assert!(!retryable(&IdentityError::Expired));
    }

    #[tokio::test]
    async fn unreachable_provider_is_unavailable_after_retries() {
        let config = IdentityConfig {
            introspection_url: "http://127.0.0.1:9/introspect".into(),
            token_url: "http://127.0.0.1:9/token".into(),
            client_id: "backend".into(),
            client_secret: "secret".into(),
            timeout_ms: 200,
            max_retries: 2,
            initial_backoff_ms: 1,
        };
        let policy = RetryPolicy::builder()
            .max_retries(2)
            .initial_delay(std::time::Duration::from_millis(1))
            .build();
        let Ok(provider) = OidcIdentityProvider::new(config, policy) else {
            return;
        };
        assert!(matches!(
            provider.introspect("token").await,
            Err(IdentityError::Unavailable(_))
        ));
    }
}
