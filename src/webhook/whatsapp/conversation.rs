//! Conversation manager seam
//!
//! Dialogue logic lives behind [`ConversationManager`]; the webhook only
//! creates one per inbound message through a [`ConversationManagerFactory`],
//! initializes it, hands it the message and then uses its WhatsApp service to
//! send the read receipt.

use super::{client::WhatsAppMessageService, schemas::Message};
use crate::{config::GraphApiSettings, metric, models::store::Store};
use async_trait::async_trait;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ConversationManager: Send + Sync {
    /// Loads whatever the manager needs for its store. `false` aborts the webhook.
    async fn initialize(&mut self) -> bool;

    async fn process_message(&self, from: &str, message: &Message) -> anyhow::Result<()>;

    /// Outbound client of the store, once initialized
    fn whatsapp_service(&self) -> Option<WhatsAppMessageService>;
}

#[cfg_attr(test, mockall::automock)]
pub trait ConversationManagerFactory: Send + Sync {
    fn create(&self, store: &Store) -> Box<dyn ConversationManager>;
}

pub type ImplConversationManagerFactory = Box<dyn ConversationManagerFactory>;

/// Manager that only acknowledges messages: logs them and lets the webhook mark them read
pub struct AcknowledgingConversationManager {
    store: Store,
    http_client: reqwest::Client,
    settings: GraphApiSettings,
    service: Option<WhatsAppMessageService>,
}

#[async_trait]
impl ConversationManager for AcknowledgingConversationManager {
    async fn initialize(&mut self) -> bool {
        self.service = WhatsAppMessageService::from_store(
            &self.store,
            self.http_client.clone(),
            &self.settings,
        );
        self.service.is_some()
    }

    async fn process_message(&self, from: &str, message: &Message) -> anyhow::Result<()> {
        logfire::info!(
            "Acknowledged {msg_type} message {message_id} from {from} for store {store_id}",
            msg_type = message.msg_type.clone(),
            message_id = message.id.clone(),
            from = from.to_string(),
            store_id = self.store.id.clone()
        );
        metric::incr_webhook_event_statds("message_acknowledged");

        Ok(())
    }

    fn whatsapp_service(&self) -> Option<WhatsAppMessageService> {
        self.service.clone()
    }
}

#[derive(Clone)]
pub struct AcknowledgingConversationManagerFactory {
    pub http_client: reqwest::Client,
    pub settings: GraphApiSettings,
}

impl ConversationManagerFactory for AcknowledgingConversationManagerFactory {
    fn create(&self, store: &Store) -> Box<dyn ConversationManager> {
        Box::new(AcknowledgingConversationManager {
            store: store.clone(),
            http_client: self.http_client.clone(),
            settings: self.settings.clone(),
            service: None,
        })
    }
}
