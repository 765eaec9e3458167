use serde::Serialize;
use sqlx::PgPool;

use crate::auth::AuthClient;
use crate::config::AppConfig;
use crate::error::EmbedError;
use crate::services::login_service::{LoginStore, PgLoginStore};
use crate::services::report_service::{ReportDetail, ReportService};
use crate::services::token_service::{EffectiveIdentity, EmbedToken, TokenService};

/// Response payload of the embed endpoint. Exactly one of the two shapes is
/// produced per call; `status` is always present.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum EmbedResult {
    #[serde(rename_all = "camelCase")]
    Success {
        access_token: String,
        embed_url: Vec<ReportDetail>,
        expiry: String,
        status: u16,
    },
    Failure {
        status: u16,
        error: String,
    },
}

impl EmbedResult {
    pub fn status(&self) -> u16 {
        match self {
            EmbedResult::Success { status, .. } | EmbedResult::Failure { status, .. } => *status,
        }
    }
}

/// Everything a successful chain produced, before response assembly.
pub struct EmbedParams {
    pub reports_detail: Vec<ReportDetail>,
    pub embed_token: EmbedToken,
}

/// Composes report metadata, the latest recorded login, and token issuance
/// into one embed response for the configured workspace/report pair.
pub struct EmbedService {
    reports: ReportService,
    tokens: TokenService,
    logins: Box<dyn LoginStore>,
    workspace_id: String,
    report_id: String,
    additional_dataset_id: Option<String>,
}

impl EmbedService {
    pub fn new(http: reqwest::Client, pool: PgPool, cfg: &AppConfig) -> Self {
        let auth = AuthClient::from_config(http.clone(), &cfg.auth);
        Self::with_parts(
            ReportService::new(http.clone(), auth.clone(), cfg.powerbi.api_base_url.clone()),
            TokenService::new(http, auth, cfg.powerbi.api_base_url.clone()),
            Box::new(PgLoginStore::new(pool)),
            cfg.powerbi.workspace_id.clone(),
            cfg.powerbi.report_id.clone(),
            cfg.powerbi.additional_dataset_id.clone(),
        )
    }

    pub fn with_parts(
        reports: ReportService,
        tokens: TokenService,
        logins: Box<dyn LoginStore>,
        workspace_id: String,
        report_id: String,
        additional_dataset_id: Option<String>,
    ) -> Self {
        Self {
            reports,
            tokens,
            logins,
            workspace_id,
            report_id,
            additional_dataset_id,
        }
    }

    /// The single inbound operation. Never faults: every failure along the
    /// chain is caught here and converted to the failure shape.
    pub async fn embed_info(&self) -> EmbedResult {
        let params = self
            .embed_params_for_single_report(
                &self.workspace_id,
                &self.report_id,
                self.additional_dataset_id.as_deref(),
            )
            .await;

        match params {
            Ok(params) => EmbedResult::Success {
                access_token: params.embed_token.token,
                embed_url: params.reports_detail,
                expiry: params.embed_token.expiration,
                status: 200,
            },
            Err(err) => {
                tracing::warn!(status = err.status_code(), error = %err, "embed chain failed");
                EmbedResult::Failure {
                    status: err.status_code(),
                    error: format!("Error while retrieving report embed details: {}", err),
                }
            }
        }
    }

    /// Embed params for a single report in a single workspace, with RLS
    /// scoped to the most recently logged-in user.
    ///
    /// Steps are causally dependent, hence strictly sequential: report
    /// metadata, then latest login, then identity, then token. No retries;
    /// the first failure ends the chain.
    pub async fn embed_params_for_single_report(
        &self,
        workspace_id: &str,
        report_id: &str,
        additional_dataset_id: Option<&str>,
    ) -> Result<EmbedParams, EmbedError> {
        let (detail, dataset_id) = self.reports.report_in_group(workspace_id, report_id).await?;

        let mut dataset_ids = vec![dataset_id];
        if let Some(extra) = additional_dataset_id {
            dataset_ids.push(extra.to_string());
        }

        let username = self.logins.latest_username().await?;
        let identities = vec![EffectiveIdentity::with_permissions_role(
            username,
            dataset_ids.clone(),
        )];

        let embed_token = self
            .tokens
            .generate_token(report_id, &dataset_ids, Some(workspace_id), identities)
            .await?;

        Ok(EmbedParams {
            reports_detail: vec![detail],
            embed_token,
        })
    }
}
