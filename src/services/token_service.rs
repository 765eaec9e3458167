use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};

use crate::auth::{auth_header, AuthClient};
use crate::error::EmbedError;

/// Role attached to every RLS identity this gateway builds.
pub const RLS_ROLE: &str = "Permissions";

/// Row-level-security identity the embed token is scoped to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectiveIdentity {
    pub username: String,
    pub roles: Vec<String>,
    pub datasets: Vec<String>,
}

impl EffectiveIdentity {
    /// The one identity shape this service produces: fixed role set, full
    /// dataset list attached.
    pub fn with_permissions_role(username: String, datasets: Vec<String>) -> Self {
        Self {
            username,
            roles: vec![RLS_ROLE.to_string()],
            datasets,
        }
    }
}

#[derive(Debug, Serialize)]
struct IdRef {
    id: String,
}

/// `POST /GenerateToken` body. `target_workspaces` serializes to JSON `null`
/// when no workspace is given, matching the upstream API contract.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateTokenRequest {
    reports: Vec<IdRef>,
    datasets: Vec<IdRef>,
    target_workspaces: Option<Vec<IdRef>>,
    identities: Vec<EffectiveIdentity>,
}

/// Opaque embed credential with a defined expiry; never parsed further.
#[derive(Debug, Clone, Deserialize)]
pub struct EmbedToken {
    pub token: String,
    pub expiration: String,
}

/// Requests embed tokens scoped to reports/datasets/identities.
pub struct TokenService {
    http: reqwest::Client,
    auth: AuthClient,
    api_base_url: String,
}

impl TokenService {
    pub fn new(http: reqwest::Client, auth: AuthClient, api_base_url: String) -> Self {
        Self {
            http,
            auth,
            api_base_url,
        }
    }

    pub async fn generate_token(
        &self,
        report_id: &str,
        dataset_ids: &[String],
        workspace_id: Option<&str>,
        identities: Vec<EffectiveIdentity>,
    ) -> Result<EmbedToken, EmbedError> {
        let body = GenerateTokenRequest {
            reports: vec![IdRef {
                id: report_id.to_string(),
            }],
            datasets: dataset_ids
                .iter()
                .map(|id| IdRef { id: id.clone() })
                .collect(),
            target_workspaces: workspace_id.map(|id| vec![IdRef { id: id.to_string() }]),
            identities,
        };

        let token = self.auth.access_token().await?;
        let url = format!("{}/GenerateToken", self.api_base_url.trim_end_matches('/'));

        let response = self
            .http
            .post(&url)
            .header(AUTHORIZATION, auth_header(&token.access_token))
            .header(CONTENT_TYPE, "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| EmbedError::transport("token generation", e))?;

        if !response.status().is_success() {
            return Err(EmbedError::upstream("token generation", response).await);
        }

        response
            .json::<EmbedToken>()
            .await
            .map_err(|e| EmbedError::transport("token generation", e))
    }
}
