//! Identity provider client — the single point of entry for all calls to the
//! hosted identity service.
//!
//! Requests carry a cached service token from `TokenProvider`. A 401
//! response invalidates the cache and the request is replayed exactly once
//! with a fresh token; there is no other retry policy.

use std::sync::Arc;

use reqwest::{Client, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::auth::token_provider::TokenProvider;

const REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("identity API error (status {status}): {message}")]
    Api { status: u16, message: String },
}

/// A directory entry from the identity provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityUser {
    pub id: String,
    pub email: String,
    pub name: String,
    #[serde(default)]
    pub role: Option<String>,
}

#[derive(Clone)]
pub struct IdentityClient {
    client: Client,
    base_url: String,
    tokens: Arc<TokenProvider>,
}

impl IdentityClient {
    pub fn new(base_url: &str, service_key: String) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        let tokens = Arc::new(TokenProvider::new(
            client.clone(),
            base_url,
            service_key,
        ));

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            tokens,
        })
    }

    /// Lists the user directory.
    pub async fn list_users(&self) -> Result<Vec<IdentityUser>, IdentityError> {
        self.get_json("/users").await
    }

    /// Fetches a single directory entry.
    pub async fn get_user(&self, external_id: &str) -> Result<IdentityUser, IdentityError> {
        self.get_json(&format!("/users/{external_id}")).await
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, IdentityError> {
        let mut response = self.send(path).await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            // Stale service token: refresh and replay once.
            debug!("identity API returned 401, refreshing token and replaying");
            self.tokens.invalidate().await;
            response = self.send(path).await?;
        }

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(IdentityError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json().await?)
    }

    async fn send(&self, path: &str) -> Result<reqwest::Response, IdentityError> {
        let token = self.tokens.bearer().await?;
        Ok(self
            .client
            .get(format!("{}{path}", self.base_url))
            .bearer_auth(token)
            .send()
            .await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn mount_token(server: &MockServer, token: &str) {
        Mock::given(method("POST"))
            .and(path("/service-tokens"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "token": token,
                "expires_in": 3600
            })))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_list_users() {
        let server = MockServer::start().await;
        mount_token(&server, "t1").await;
        Mock::given(method("GET"))
            .and(path("/users"))
            .and(header("authorization", "Bearer t1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "id": "user_1", "email": "a@example.com", "name": "A" }
            ])))
            .mount(&server)
            .await;

        let client = IdentityClient::new(&server.uri(), "svc-key".to_string()).unwrap();
        let users = client.list_users().await.unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].id, "user_1");
        assert!(users[0].role.is_none());
    }

    #[tokio::test]
    async fn test_replays_once_after_401() {
        let server = MockServer::start().await;
        mount_token(&server, "t1").await;
        // First /users call is rejected, the replay succeeds.
        Mock::given(method("GET"))
            .and(path("/users"))
            .respond_with(ResponseTemplate::new(401))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/users"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(1)
            .mount(&server)
            .await;

        let client = IdentityClient::new(&server.uri(), "svc-key".to_string()).unwrap();
        let users = client.list_users().await.unwrap();
        assert!(users.is_empty());
    }

    #[tokio::test]
    async fn test_second_401_is_an_error_not_a_loop() {
        let server = MockServer::start().await;
        mount_token(&server, "t1").await;
        Mock::given(method("GET"))
            .and(path("/users"))
            .respond_with(ResponseTemplate::new(401).set_body_string("nope"))
            .mount(&server)
            .await;

        let client = IdentityClient::new(&server.uri(), "svc-key".to_string()).unwrap();
        match client.list_users().await {
            Err(IdentityError::Api { status, .. }) => assert_eq!(status, 401),
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_get_user() {
        let server = MockServer::start().await;
        mount_token(&server, "t1").await;
        Mock::given(method("GET"))
            .and(path("/users/user_7"))
            .and(header("authorization", "Bearer t1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!(
                { "id": "user_7", "email": "b@example.com", "name": "B", "role": "recruiter" }
            )))
            .mount(&server)
            .await;

        let client = IdentityClient::new(&server.uri(), "svc-key".to_string()).unwrap();
        let user = client.get_user("user_7").await.unwrap();
        assert_eq!(user.id, "user_7");
        assert_eq!(user.role.as_deref(), Some("recruiter"));
    }

    #[tokio::test]
    async fn test_non_success_status_surfaces_message() {
        let server = MockServer::start().await;
        mount_token(&server, "t1").await;
        Mock::given(method("GET"))
            .and(path("/users/missing"))
            .respond_with(ResponseTemplate::new(404).set_body_string("no such user"))
            .mount(&server)
            .await;

        let client = IdentityClient::new(&server.uri(), "svc-key".to_string()).unwrap();
        match client.get_user("missing").await {
            Err(IdentityError::Api { status, message }) => {
                assert_eq!(status, 404);
                assert_eq!(message, "no such user");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }
}
