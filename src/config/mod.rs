use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub powerbi: PowerBiConfig,
    pub auth: AuthConfig,
    pub database: DatabaseConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Reporting API settings: which workspace/report pair this gateway embeds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerBiConfig {
    pub api_base_url: String,
    pub workspace_id: String,
    pub report_id: String,
    /// Extra dataset to scope the embed token to, alongside the report's own.
    pub additional_dataset_id: Option<String>,
}

/// Azure AD client-credentials settings for the service principal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    pub authority_url: String,
    pub tenant_id: String,
    pub client_id: String,
    pub client_secret: String,
    pub scope: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub connect_timeout_secs: u64,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::defaults().with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        if let Ok(v) = env::var("SERVER_HOST") {
            self.server.host = v;
        }
        // EMBED_API_PORT wins over the generic PORT used by most deploy targets
        if let Some(v) = env::var("EMBED_API_PORT").ok().or_else(|| env::var("PORT").ok()) {
            self.server.port = v.parse().unwrap_or(self.server.port);
        }

        if let Ok(v) = env::var("POWERBI_API_URL") {
            self.powerbi.api_base_url = v;
        }
        if let Ok(v) = env::var("POWERBI_WORKSPACE_ID") {
            self.powerbi.workspace_id = v;
        }
        if let Ok(v) = env::var("POWERBI_REPORT_ID") {
            self.powerbi.report_id = v;
        }
        self.powerbi.additional_dataset_id =
            env::var("POWERBI_ADDITIONAL_DATASET_ID").ok().filter(|s| !s.is_empty());

        if let Ok(v) = env::var("AAD_AUTHORITY_URL") {
            self.auth.authority_url = v;
        }
        if let Ok(v) = env::var("AAD_TENANT_ID") {
            self.auth.tenant_id = v;
        }
        if let Ok(v) = env::var("AAD_CLIENT_ID") {
            self.auth.client_id = v;
        }
        if let Ok(v) = env::var("AAD_CLIENT_SECRET") {
            self.auth.client_secret = v;
        }
        if let Ok(v) = env::var("AAD_SCOPE") {
            self.auth.scope = v;
        }

        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = v;
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECT_TIMEOUT_SECS") {
            self.database.connect_timeout_secs =
                v.parse().unwrap_or(self.database.connect_timeout_secs);
        }

        self
    }

    fn defaults() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
            },
            powerbi: PowerBiConfig {
                api_base_url: "https://api.powerbi.com/v1.0/myorg".to_string(),
                workspace_id: String::new(),
                report_id: String::new(),
                additional_dataset_id: None,
            },
            auth: AuthConfig {
                authority_url: "https://login.microsoftonline.com".to_string(),
                tenant_id: String::new(),
                client_id: String::new(),
                client_secret: String::new(),
                scope: "https://analysis.windows.net/powerbi/api/.default".to_string(),
            },
            database: DatabaseConfig {
                url: String::new(),
                max_connections: 10,
                connect_timeout_secs: 30,
            },
        }
    }

    /// Names of required settings that are still empty. Logged at startup so
    /// a misconfigured deployment fails with something better than a 401 from
    /// the token endpoint.
    pub fn missing_settings(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.powerbi.workspace_id.is_empty() {
            missing.push("POWERBI_WORKSPACE_ID");
        }
        if self.powerbi.report_id.is_empty() {
            missing.push("POWERBI_REPORT_ID");
        }
        if self.auth.tenant_id.is_empty() {
            missing.push("AAD_TENANT_ID");
        }
        if self.auth.client_id.is_empty() {
            missing.push("AAD_CLIENT_ID");
        }
        if self.auth.client_secret.is_empty() {
            missing.push("AAD_CLIENT_SECRET");
        }
        if self.database.url.is_empty() {
            missing.push("DATABASE_URL");
        }
        missing
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}
