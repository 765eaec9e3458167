use thiserror::Error;

use crate::auth::AuthError;
use crate::services::login_service::LoginError;

/// Everything that can break the embed chain, caught exactly once at the
/// orchestrator boundary and mapped into the failure-shaped result.
#[derive(Debug, Error)]
pub enum EmbedError {
    /// The Auth Provider could not supply a bearer token.
    #[error("failed to acquire access token: {0}")]
    Auth(String),

    /// The reporting API answered with a non-success status.
    #[error("{message}")]
    Upstream {
        status: u16,
        request_id: Option<String>,
        message: String,
    },

    /// The login store connection or query failed (transient; retry at the
    /// request level).
    #[error("login store unavailable: {0}")]
    StoreUnavailable(String),

    /// The login store has no rows at all (not retryable without new logins).
    #[error("no login records found")]
    NoLogins,

    /// A required identifier was empty before any remote call was made.
    #[error("missing required parameter: {0}")]
    MissingParameter(&'static str),
}

impl EmbedError {
    pub fn status_code(&self) -> u16 {
        match self {
            EmbedError::Auth(_) => 401,
            EmbedError::Upstream { status, .. } => *status,
            EmbedError::StoreUnavailable(_) => 503,
            EmbedError::NoLogins => 404,
            EmbedError::MissingParameter(_) => 400,
        }
    }

    /// A reporting-API call that never produced a response (connect error,
    /// timeout, invalid body). Surfaces as a bad gateway.
    pub fn transport(context: &'static str, err: reqwest::Error) -> Self {
        EmbedError::Upstream {
            status: 502,
            request_id: None,
            message: format!("{} request failed: {}", context, err),
        }
    }

    /// Build the Upstream variant from a failed reporting-API response,
    /// consuming the body. The message carries the status text and the
    /// `requestid` header when present, for support diagnostics.
    pub async fn upstream(context: &'static str, response: reqwest::Response) -> Self {
        let status = response.status();
        let request_id = response
            .headers()
            .get("requestid")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.text().await.unwrap_or_default();
        tracing::warn!(
            context,
            status = status.as_u16(),
            request_id = request_id.as_deref().unwrap_or("-"),
            body = %body,
            "upstream call failed"
        );

        let mut message = format!(
            "{} returned {} {}",
            context,
            status.as_u16(),
            status.canonical_reason().unwrap_or("unknown status")
        );
        if let Some(id) = &request_id {
            message.push_str(&format!(", RequestId: {}", id));
        }

        EmbedError::Upstream {
            status: status.as_u16(),
            request_id,
            message,
        }
    }
}

impl From<AuthError> for EmbedError {
    fn from(err: AuthError) -> Self {
        EmbedError::Auth(err.to_string())
    }
}

impl From<LoginError> for EmbedError {
    fn from(err: LoginError) -> Self {
        match err {
            LoginError::NoLogins => EmbedError::NoLogins,
            LoginError::Store(e) => EmbedError::StoreUnavailable(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_the_taxonomy() {
        assert_eq!(EmbedError::Auth("nope".into()).status_code(), 401);
        assert_eq!(
            EmbedError::Upstream {
                status: 404,
                request_id: None,
                message: "report lookup returned 404 Not Found".into()
            }
            .status_code(),
            404
        );
        assert_eq!(EmbedError::StoreUnavailable("refused".into()).status_code(), 503);
        assert_eq!(EmbedError::NoLogins.status_code(), 404);
        assert_eq!(EmbedError::MissingParameter("workspace_id").status_code(), 400);
    }

    #[test]
    fn login_errors_convert_with_distinct_kinds() {
        assert!(matches!(EmbedError::from(LoginError::NoLogins), EmbedError::NoLogins));

        let unavailable = EmbedError::from(LoginError::Store(sqlx::Error::PoolClosed));
        assert!(matches!(unavailable, EmbedError::StoreUnavailable(_)));
        assert_eq!(unavailable.status_code(), 503);
    }
}
