use serde::Deserialize;
use thiserror::Error;

use crate::config::AuthConfig;

/// Bearer credential from the Azure AD v2 token endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct AccessToken {
    pub access_token: String,
    #[serde(default)]
    pub token_type: String,
    /// Lifetime in seconds; informational only, tokens are not cached.
    #[serde(default)]
    pub expires_in: u64,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("missing credential configuration: {0}")]
    MissingConfig(&'static str),

    #[error("token endpoint request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("token endpoint returned {status}: {body}")]
    Rejected { status: u16, body: String },
}

/// Client-credentials flow for the reporting-API service principal. One
/// token request per outbound API call, matching the upstream service's
/// behavior; no caching.
#[derive(Clone)]
pub struct AuthClient {
    http: reqwest::Client,
    token_url: String,
    client_id: String,
    client_secret: String,
    scope: String,
}

impl AuthClient {
    pub fn from_config(http: reqwest::Client, cfg: &AuthConfig) -> Self {
        let token_url = format!(
            "{}/{}/oauth2/v2.0/token",
            cfg.authority_url.trim_end_matches('/'),
            cfg.tenant_id
        );
        Self {
            http,
            token_url,
            client_id: cfg.client_id.clone(),
            client_secret: cfg.client_secret.clone(),
            scope: cfg.scope.clone(),
        }
    }

    /// Direct constructor, used by tests to point at a local token endpoint.
    pub fn new(
        http: reqwest::Client,
        token_url: String,
        client_id: String,
        client_secret: String,
        scope: String,
    ) -> Self {
        Self {
            http,
            token_url,
            client_id,
            client_secret,
            scope,
        }
    }

    pub async fn access_token(&self) -> Result<AccessToken, AuthError> {
        if self.client_id.is_empty() {
            return Err(AuthError::MissingConfig("client id"));
        }
        if self.client_secret.is_empty() {
            return Err(AuthError::MissingConfig("client secret"));
        }

        let params = [
            ("grant_type", "client_credentials"),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("scope", self.scope.as_str()),
        ];

        let response = self.http.post(&self.token_url).form(&params).send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status, "token endpoint rejected client credentials");
            return Err(AuthError::Rejected { status, body });
        }

        Ok(response.json::<AccessToken>().await?)
    }
}

/// `Authorization` header value for an acquired token.
pub fn auth_header(access_token: &str) -> String {
    format!("Bearer {}", access_token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::json;

    use crate::testing;

    #[test]
    fn auth_header_uses_bearer_scheme() {
        assert_eq!(auth_header("abc123"), "Bearer abc123");
    }

    #[test]
    fn access_token_parses_aad_response() {
        let token: AccessToken = serde_json::from_value(json!({
            "token_type": "Bearer",
            "expires_in": 3599,
            "access_token": "eyJ0eXAi"
        }))
        .unwrap();
        assert_eq!(token.access_token, "eyJ0eXAi");
        assert_eq!(token.token_type, "Bearer");
        assert_eq!(token.expires_in, 3599);
    }

    #[tokio::test]
    async fn empty_credentials_fail_before_any_request() {
        let client = AuthClient::new(
            reqwest::Client::new(),
            "http://127.0.0.1:1/token".into(),
            String::new(),
            String::new(),
            "scope".into(),
        );
        let err = client.access_token().await.unwrap_err();
        assert!(matches!(err, AuthError::MissingConfig("client id")));
    }

    #[tokio::test]
    async fn acquires_token_from_endpoint() {
        let app = Router::new().route(
            "/tenant-1/oauth2/v2.0/token",
            post(|| async {
                Json(json!({
                    "token_type": "Bearer",
                    "expires_in": 3599,
                    "access_token": "issued-token"
                }))
            }),
        );
        let base = testing::serve(app).await;

        let client = AuthClient::new(
            reqwest::Client::new(),
            format!("{}/tenant-1/oauth2/v2.0/token", base),
            "client".into(),
            "secret".into(),
            "scope".into(),
        );
        let token = client.access_token().await.unwrap();
        assert_eq!(token.access_token, "issued-token");
    }

    #[tokio::test]
    async fn rejected_credentials_surface_status_and_body() {
        let app = Router::new().route(
            "/t/oauth2/v2.0/token",
            post(|| async {
                (
                    axum::http::StatusCode::UNAUTHORIZED,
                    Json(json!({"error": "invalid_client"})),
                )
            }),
        );
        let base = testing::serve(app).await;

        let client = AuthClient::new(
            reqwest::Client::new(),
            format!("{}/t/oauth2/v2.0/token", base),
            "client".into(),
            "wrong".into(),
            "scope".into(),
        );
        match client.access_token().await.unwrap_err() {
            AuthError::Rejected { status, body } => {
                assert_eq!(status, 401);
                assert!(body.contains("invalid_client"));
            }
            other => panic!("expected Rejected, got {:?}", other),
        }
    }
}
