//! Application configuration management with security considerations.
//!
//! This module handles all configuration values required for the webhook service.
//! Per-store WhatsApp credentials are NOT configured here; they live in the
//! `store` table and are read through [`crate::repo::StoreRepo`].
//!
//! # Security Notes
//! - Sensitive fields are clearly marked and should never be logged
//! - Production environments should use secure secret management systems

use envconfig::Envconfig;
use std::sync::OnceLock;

/// Application configuration with security-aware field management.
#[derive(Envconfig, Clone)]
pub struct AppConfig {
    /// Environment name to deploy the app (NON-SENSITIVE)
    /// Values: "local", "dev", "staging", "prod"
    #[envconfig(default = "local")]
    pub env: String,

    /// Database host value (NON-SENSITIVE)
    /// Example: "sqlite:data/stores.db"
    pub db_host: String,

    /// 🔒 SENSITIVE: Database password to encrypt SQLite data (prod only)
    pub db_pass_encrypt: Option<String>,

    /// Host address for web server binding (NON-SENSITIVE)
    #[envconfig(default = "0.0.0.0")]
    pub web_server_host: String,

    /// Port for web server binding (NON-SENSITIVE)
    #[envconfig(default = "8080")]
    pub web_server_port: u16,

    /// Path to SSL private key file (SENSITIVE PATH)
    #[envconfig(default = "server.key")]
    pub private_key_path: String,

    /// Path to SSL certificate file (NON-SENSITIVE)
    #[envconfig(default = "server.crt")]
    pub certificate_path: String,

    /// Graph API base url (NON-SENSITIVE)
    #[envconfig(default = "https://graph.facebook.com")]
    pub whatsapp_graph_api_url: String,

    /// Graph API version used for every outbound call (NON-SENSITIVE)
    #[envconfig(default = "v18.0")]
    pub whatsapp_api_version: String,

    /// Language code sent with template messages (NON-SENSITIVE)
    #[envconfig(default = "en_US")]
    pub whatsapp_template_language: String,

    /// 🔒 SENSITIVE: Meta app secret used to check `X-Hub-Signature-256`.
    /// When unset, webhook payloads are accepted unsigned.
    pub whatsapp_app_secret: Option<String>,
}

/// Settings shared by every store's outbound client
#[derive(Debug, Clone, PartialEq)]
pub struct GraphApiSettings {
    pub base_url: String,
    pub api_version: String,
    pub template_language: String,
}

impl GraphApiSettings {
    /// Constructs the WhatsApp Business API endpoint for sending messages
    pub fn send_msg_endpoint(&self, phone_number_id: &str) -> String {
        format!(
            "{base}/{version}/{id}/messages",
            base = self.base_url.trim_end_matches('/'),
            version = self.api_version,
            id = phone_number_id
        )
    }
}

impl Default for GraphApiSettings {
    fn default() -> Self {
        Self {
            base_url: "https://graph.facebook.com".into(),
            api_version: "v18.0".into(),
            template_language: "en_US".into(),
        }
    }
}

impl AppConfig {
    /// Checks if running in production environment
    pub fn is_prod(&self) -> bool {
        self.env.to_lowercase() == "prod"
    }

    /// Outbound Graph API settings derived from the environment
    pub fn graph_api_settings(&self) -> GraphApiSettings {
        GraphApiSettings {
            base_url: self.whatsapp_graph_api_url.clone(),
            api_version: self.whatsapp_api_version.clone(),
            template_language: self.whatsapp_template_language.clone(),
        }
    }

    /// App secret, ignoring blank values
    pub fn app_secret(&self) -> Option<String> {
        self.whatsapp_app_secret
            .as_ref()
            .filter(|secret| !secret.trim().is_empty())
            .cloned()
    }
}

/// Global application configuration instance
///
/// Filled once by [`init_config`] before the web server starts.
pub static APP_CONFIG: OnceLock<AppConfig> = OnceLock::new();

/// Loads [`AppConfig`] from the environment into [`APP_CONFIG`]
pub fn init_config() -> anyhow::Result<()> {
    let app_config = AppConfig::init_from_env()?;

    APP_CONFIG
        .set(app_config)
        .map_err(|_| anyhow::anyhow!("app config was already initialized"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_with(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults_from_minimal_env() {
        let config =
            AppConfig::init_from_hashmap(&env_with(&[("DB_HOST", "sqlite::memory:")])).unwrap();

        assert!(!config.is_prod());
        assert_eq!(config.web_server_port, 8080);
        assert_eq!(config.graph_api_settings(), GraphApiSettings::default());
        assert!(config.app_secret().is_none());
    }

    #[test]
    fn test_blank_app_secret_is_ignored() {
        let config = AppConfig::init_from_hashmap(&env_with(&[
            ("DB_HOST", "sqlite::memory:"),
            ("WHATSAPP_APP_SECRET", "   "),
            ("ENV", "PROD"),
        ]))
        .unwrap();

        assert!(config.is_prod());
        assert!(config.app_secret().is_none());
    }

    #[test]
    fn test_send_msg_endpoint() {
        let settings = GraphApiSettings {
            base_url: "http://localhost:9000/".into(),
            ..GraphApiSettings::default()
        };

        assert_eq!(
            settings.send_msg_endpoint("1234"),
            "http://localhost:9000/v18.0/1234/messages"
        );
    }
}
