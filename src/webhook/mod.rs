//! Webhook handlers for the WhatsApp Business API
//!
//! ## Modules
//!
//! - [`whatsapp`] - per-store webhook endpoints, outbound client and schemas
//! - [`errors`] - JSON error responses returned to the platform

pub mod errors;
pub mod routes;
pub mod whatsapp;

use crate::repo;

pub struct AppState {
    pub repo: repo::ImplStoreRepo,
    pub conversations: whatsapp::conversation::ImplConversationManagerFactory,
    /// 🔒 SENSITIVE: enables `X-Hub-Signature-256` checks when present
    pub app_secret: Option<String>,
}
