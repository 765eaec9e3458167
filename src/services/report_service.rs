use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};

use crate::auth::{auth_header, AuthClient};
use crate::error::EmbedError;

/// The slice of a report descriptor the embed client needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportDetail {
    pub id: String,
    pub name: String,
    pub embed_url: String,
}

/// Raw report-in-group descriptor from the reporting API.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReportInGroup {
    id: String,
    name: String,
    embed_url: String,
    dataset_id: String,
}

/// Fetches report metadata from `GET /groups/{workspaceId}/reports/{reportId}`.
pub struct ReportService {
    http: reqwest::Client,
    auth: AuthClient,
    api_base_url: String,
}

impl ReportService {
    pub fn new(http: reqwest::Client, auth: AuthClient, api_base_url: String) -> Self {
        Self {
            http,
            auth,
            api_base_url,
        }
    }

    /// Returns the report detail plus its primary dataset id.
    ///
    /// Identifiers are only checked for presence; format validation is the
    /// remote API's job.
    pub async fn report_in_group(
        &self,
        workspace_id: &str,
        report_id: &str,
    ) -> Result<(ReportDetail, String), EmbedError> {
        if workspace_id.is_empty() {
            return Err(EmbedError::MissingParameter("workspace id"));
        }
        if report_id.is_empty() {
            return Err(EmbedError::MissingParameter("report id"));
        }

        let token = self.auth.access_token().await?;
        let url = format!(
            "{}/groups/{}/reports/{}",
            self.api_base_url.trim_end_matches('/'),
            workspace_id,
            report_id
        );

        let response = self
            .http
            .get(&url)
            .header(AUTHORIZATION, auth_header(&token.access_token))
            .header(CONTENT_TYPE, "application/json")
            .send()
            .await
            .map_err(|e| EmbedError::transport("report lookup", e))?;

        if !response.status().is_success() {
            return Err(EmbedError::upstream("report lookup", response).await);
        }

        let report: ReportInGroup = response
            .json()
            .await
            .map_err(|e| EmbedError::transport("report lookup", e))?;

        let detail = ReportDetail {
            id: report.id,
            name: report.name,
            embed_url: report.embed_url,
        };
        Ok((detail, report.dataset_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use serde_json::json;

    use crate::testing;

    fn service_against(base: &str) -> ReportService {
        let http = reqwest::Client::new();
        let auth = AuthClient::new(
            http.clone(),
            format!("{}/token", base),
            "client".into(),
            "secret".into(),
            "scope".into(),
        );
        ReportService::new(http, auth, base.to_string())
    }

    fn token_route() -> Router {
        Router::new().route(
            "/token",
            post(|| async { Json(json!({"access_token": "tok", "token_type": "Bearer", "expires_in": 3599})) }),
        )
    }

    #[tokio::test]
    async fn fetches_detail_and_dataset_id() {
        let app = token_route().route(
            "/groups/ws-1/reports/rpt-1",
            get(|| async {
                Json(json!({
                    "id": "rpt-1",
                    "name": "Sales",
                    "embedUrl": "https://app.powerbi.com/reportEmbed?reportId=rpt-1",
                    "datasetId": "ds-1"
                }))
            }),
        );
        let base = testing::serve(app).await;

        let (detail, dataset_id) = service_against(&base)
            .report_in_group("ws-1", "rpt-1")
            .await
            .unwrap();

        assert_eq!(detail.id, "rpt-1");
        assert_eq!(detail.name, "Sales");
        assert_eq!(
            detail.embed_url,
            "https://app.powerbi.com/reportEmbed?reportId=rpt-1"
        );
        assert_eq!(dataset_id, "ds-1");
    }

    #[tokio::test]
    async fn not_found_carries_status_and_request_id() {
        let app = token_route().route(
            "/groups/ws-1/reports/missing",
            get(|| async {
                (
                    StatusCode::NOT_FOUND,
                    [("requestid", "req-42")],
                    Json(json!({"error": {"code": "ItemNotFound"}})),
                )
            }),
        );
        let base = testing::serve(app).await;

        let err = service_against(&base)
            .report_in_group("ws-1", "missing")
            .await
            .unwrap_err();

        match err {
            EmbedError::Upstream {
                status,
                request_id,
                message,
            } => {
                assert_eq!(status, 404);
                assert_eq!(request_id.as_deref(), Some("req-42"));
                assert!(message.contains("req-42"), "message was: {}", message);
                assert!(message.contains("Not Found"), "message was: {}", message);
            }
            other => panic!("expected Upstream, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn empty_identifiers_fail_without_any_call() {
        let service = service_against("http://127.0.0.1:1");

        let err = service.report_in_group("", "rpt").await.unwrap_err();
        assert!(matches!(err, EmbedError::MissingParameter("workspace id")));

        let err = service.report_in_group("ws", "").await.unwrap_err();
        assert!(matches!(err, EmbedError::MissingParameter("report id")));
    }
}
