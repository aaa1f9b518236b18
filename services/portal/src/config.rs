use serde::Deserialize;

use lms_core::config::Config;
use lms_core::tracing::LogFormat;

/// Portal service configuration loaded from environment variables.
#[derive(Debug, Deserialize)]
pub struct PortalConfig {
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// HMAC secret for signing session tokens.
    pub jwt_secret: String,
    /// TCP port to listen on. Env var: `PORTAL_PORT`.
    #[serde(default = "default_port")]
    pub portal_port: u16,
    /// Bootstrap administrator, created on startup if absent.
    #[serde(default = "default_admin_email")]
    pub admin_email: String,
    #[serde(default = "default_admin_password")]
    pub admin_password: String,
    /// Base URL of the web client (e.g. "https://lms.example.com").
    #[serde(default = "default_public_url")]
    pub public_url: String,
    /// `json` (default) or `text`.
    #[serde(default)]
    pub log_format: LogFormat,
}

fn default_port() -> u16 {
    3110
}

fn default_admin_email() -> String {
    "admin@lms.com".to_owned()
}

fn default_admin_password() -> String {
    "admin123".to_owned()
}

fn default_public_url() -> String {
    "http://localhost:3000".to_owned()
}

impl Config for PortalConfig {}
