//! Service-token cache for outbound identity-provider calls.
//!
//! At most one refresh runs at a time: the cache sits behind a
//! `tokio::sync::Mutex`, so concurrent callers that find the token missing
//! or stale queue on the lock, the first one refreshes, and the rest observe
//! the fresh token when they acquire the guard.

use chrono::{DateTime, Duration, Utc};
use reqwest::Client;
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::debug;

use crate::identity::IdentityError;

/// Refresh this long before the token actually expires.
const EXPIRY_MARGIN_SECS: i64 = 30;

#[derive(Debug, Clone)]
struct CachedToken {
    token: String,
    expires_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    token: String,
    expires_in: i64,
}

pub struct TokenProvider {
    client: Client,
    token_url: String,
    service_key: String,
    cached: Mutex<Option<CachedToken>>,
}

impl TokenProvider {
    pub fn new(client: Client, base_url: &str, service_key: String) -> Self {
        Self {
            client,
            token_url: format!("{}/service-tokens", base_url.trim_end_matches('/')),
            service_key,
            cached: Mutex::new(None),
        }
    }

    /// Returns a valid bearer token, refreshing if the cached one is missing
    /// or about to expire.
    pub async fn bearer(&self) -> Result<String, IdentityError> {
        let mut guard = self.cached.lock().await;

        if let Some(cached) = guard.as_ref() {
            if cached.expires_at > Utc::now() + Duration::seconds(EXPIRY_MARGIN_SECS) {
                return Ok(cached.token.clone());
            }
        }

        debug!("refreshing identity service token");
        let fresh = self.fetch_token().await?;
        let token = fresh.token.clone();
        *guard = Some(fresh);
        Ok(token)
    }

    /// Drops the cached token so the next `bearer` call refreshes.
    /// Called by the identity client when a request comes back 401.
    pub async fn invalidate(&self) {
        *self.cached.lock().await = None;
    }

    async fn fetch_token(&self) -> Result<CachedToken, IdentityError> {
        let response = self
            .client
            .post(&self.token_url)
            .header("x-service-key", &self.service_key)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(IdentityError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: TokenResponse = response.json().await?;
        Ok(CachedToken {
            token: body.token,
            expires_at: Utc::now() + Duration::seconds(body.expires_in),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider(server: &MockServer) -> TokenProvider {
        TokenProvider::new(Client::new(), &server.uri(), "svc-key".to_string())
    }

    #[tokio::test]
    async fn test_token_is_cached_across_calls() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/service-tokens"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "token": "t1",
                "expires_in": 3600
            })))
            .expect(1)
            .mount(&server)
            .await;

        let provider = provider(&server);
        assert_eq!(provider.bearer().await.unwrap(), "t1");
        assert_eq!(provider.bearer().await.unwrap(), "t1");
    }

    #[tokio::test]
    async fn test_concurrent_callers_share_one_refresh() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/service-tokens"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "token": "t1",
                "expires_in": 3600
            })))
            .expect(1)
            .mount(&server)
            .await;

        let provider = provider(&server);
        let (a, b, c) = tokio::join!(provider.bearer(), provider.bearer(), provider.bearer());
        assert_eq!(a.unwrap(), "t1");
        assert_eq!(b.unwrap(), "t1");
        assert_eq!(c.unwrap(), "t1");
    }

    #[tokio::test]
    async fn test_invalidate_forces_refresh() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/service-tokens"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "token": "t1",
                "expires_in": 3600
            })))
            .expect(2)
            .mount(&server)
            .await;

        let provider = provider(&server);
        provider.bearer().await.unwrap();
        provider.invalidate().await;
        provider.bearer().await.unwrap();
    }

    #[tokio::test]
    async fn test_failed_refresh_surfaces_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/service-tokens"))
            .respond_with(ResponseTemplate::new(503).set_body_string("down"))
            .mount(&server)
            .await;

        let provider = provider(&server);
        match provider.bearer().await {
            Err(IdentityError::Api { status, .. }) => assert_eq!(status, 503),
            other => panic!("expected Api error, got {other:?}"),
        }
    }
}
