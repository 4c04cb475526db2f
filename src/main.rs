//! # Store WhatsApp Webhook
//!
//! Main entry point for the per-store WhatsApp Business webhook service.
//! Configures SSL, logging, the credential store and route handling.

#![recursion_limit = "256"]

pub mod config;
pub mod consts;
pub mod metric;
pub mod models;
pub mod repo;
pub mod utils;
pub mod webhook;

use anyhow::Context;
use logfire::config::MetricsOptions;
use ntex::web;
use openssl::ssl::{SslAcceptor, SslFiletype, SslMethod};
use webhook::whatsapp::conversation::AcknowledgingConversationManagerFactory;

#[ntex::main]
async fn main() -> anyhow::Result<()> {
    // Initialize configuration
    config::init_config()?;

    let app_config = config::APP_CONFIG
        .get()
        .context("failed to get app config")?;

    // Initialize logging and metrics, exported only when LOGFIRE_TOKEN is set
    let shutdown_handler = logfire::configure()
        .install_panic_handler()
        .with_metrics(Some(MetricsOptions::default()))
        .finish()?;

    // Initialize database connection pool
    let sqlite_repo = repo::sqlite::SqlxSqliteRepo {
        db_pool: utils::setup_sqlite_db_pool(app_config).await?,
    };
    sqlite_repo.ensure_schema().await?;

    let conversations = AcknowledgingConversationManagerFactory {
        http_client: utils::build_http_client()?,
        settings: app_config.graph_api_settings(),
    };

    configure_and_run_server(app_config, sqlite_repo, conversations).await?;

    shutdown_handler.shutdown()?;

    Ok(())
}

/// Configures SSL acceptor for production environments
fn setup_ssl_acceptor(
    app_config: &config::AppConfig,
) -> anyhow::Result<openssl::ssl::SslAcceptorBuilder> {
    let mut ssl_acceptor = SslAcceptor::mozilla_intermediate(SslMethod::tls_server())
        .map_err(|e| anyhow::anyhow!("Failed to create SSL acceptor: {}", e))?;

    ssl_acceptor
        .set_private_key_file(&app_config.private_key_path, SslFiletype::PEM)
        .map_err(|e| {
            anyhow::anyhow!(
                "Failed to load private key from {}: {}",
                app_config.private_key_path,
                e
            )
        })?;

    ssl_acceptor
        .set_certificate_file(&app_config.certificate_path, SslFiletype::PEM)
        .map_err(|e| {
            anyhow::anyhow!(
                "Failed to load certificate from {}: {}",
                app_config.certificate_path,
                e
            )
        })?;

    Ok(ssl_acceptor)
}

/// Creates application state from the provided services
fn create_app_state(
    sqlite_repo: repo::sqlite::SqlxSqliteRepo,
    conversations: AcknowledgingConversationManagerFactory,
    app_secret: Option<String>,
) -> webhook::AppState {
    webhook::AppState {
        repo: Box::new(sqlite_repo),
        conversations: Box::new(conversations),
        app_secret,
    }
}

/// Configures and starts the web server with appropriate SSL settings
async fn configure_and_run_server(
    app_config: &'static config::AppConfig,
    sqlite_repo: repo::sqlite::SqlxSqliteRepo,
    conversations: AcknowledgingConversationManagerFactory,
) -> anyhow::Result<()> {
    let server_addr = (
        app_config.web_server_host.as_str(),
        app_config.web_server_port,
    );

    if app_config.app_secret().is_none() {
        logfire::warn!("WHATSAPP_APP_SECRET is not set: webhook signatures are not verified");
    }

    let server = web::server(move || {
        web::App::new()
            .wrap(web::middleware::Logger::default())
            .wrap(web::middleware::Compress::default())
            .state(create_app_state(
                sqlite_repo.clone(),
                conversations.clone(),
                app_config.app_secret(),
            ))
            .configure(webhook::routes::whatsapp)
    });

    let bound_server = if app_config.is_prod() {
        let ssl_acceptor = setup_ssl_acceptor(app_config)?;
        server.bind_openssl(server_addr, ssl_acceptor)?
    } else {
        server.bind(server_addr)?
    };

    logfire::info!(
        "Listening on {host}:{port}",
        host = app_config.web_server_host.clone(),
        port = app_config.web_server_port.to_string()
    );

    bound_server
        .run()
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))
}
