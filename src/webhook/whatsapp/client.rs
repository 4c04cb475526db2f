//! # WhatsApp API Client
//!
//! Outbound side of a store's WhatsApp Business number. One method per message
//! kind; each builds its typed payload, issues a single POST to the Graph API
//! and reports success as a `bool` derived from the HTTP status. Failures are
//! logged here and never retried.

use super::schemas::{
    InteractiveContent, InteractiveSection, MediaType, OutgoingMessage, ReadReceipt,
};
use crate::{config::GraphApiSettings, metric, models::store::Store};
use anyhow::{Context, Result};

/// WhatsApp API client bound to one store's credentials
#[derive(Clone)]
pub struct WhatsAppMessageService {
    /// HTTP client for making API requests
    client: reqwest::Client,
    /// WhatsApp Business API endpoint for sending messages
    endpoint: String,
    /// Language code used for template messages
    template_language: String,
    /// Store the credentials belong to
    store_id: String,
    /// 🔒 SENSITIVE: store access token
    auth_token: String,
}

impl std::fmt::Debug for WhatsAppMessageService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WhatsAppMessageService")
            .field("endpoint", &self.endpoint)
            .field("store_id", &self.store_id)
            .finish_non_exhaustive()
    }
}

impl WhatsAppMessageService {
    /// Builds the client for a store
    ///
    /// Returns `None` when the store has no access token or phone number id.
    pub fn from_store(
        store: &Store,
        client: reqwest::Client,
        settings: &GraphApiSettings,
    ) -> Option<Self> {
        let Some((auth_token, phone_number_id)) = store.whatsapp_credentials() else {
            logfire::error!(
                "WhatsApp Business API not configured for store: {store_id}",
                store_id = store.id.clone()
            );
            return None;
        };

        Some(Self {
            client,
            endpoint: settings.send_msg_endpoint(phone_number_id),
            template_language: settings.template_language.clone(),
            store_id: store.id.clone(),
            auth_token: auth_token.to_string(),
        })
    }

    pub fn store_id(&self) -> &str {
        &self.store_id
    }

    /// Sends a text message
    ///
    /// # Arguments
    /// * `to` - Recipient's WhatsApp ID (phone number with country code)
    /// * `body` - Message text
    pub async fn send_text_message(&self, to: &str, body: &str) -> bool {
        let message = OutgoingMessage::text(to.to_string(), body.to_string());
        self.dispatch("text", &message).await
    }

    /// Sends an interactive message (buttons, lists, products)
    pub async fn send_interactive_message(&self, to: &str, interactive: InteractiveContent) -> bool {
        let message = OutgoingMessage::interactive(to.to_string(), interactive);
        self.dispatch("interactive", &message).await
    }

    /// Sends a pre-approved template message
    ///
    /// # Arguments
    /// * `to` - Recipient's WhatsApp ID
    /// * `template_name` - Name of the template registered in WhatsApp Manager
    /// * `params` - Body parameters, in the order the template expects them
    pub async fn send_template_message(
        &self,
        to: &str,
        template_name: &str,
        params: Vec<String>,
    ) -> bool {
        let message = OutgoingMessage::template(
            to.to_string(),
            template_name.to_string(),
            self.template_language.clone(),
            params,
        );
        self.dispatch("template", &message).await
    }

    /// Sends an image, audio, document or video from a public link
    pub async fn send_media_message(
        &self,
        to: &str,
        media_type: MediaType,
        media_url: &str,
        caption: Option<&str>,
    ) -> bool {
        let message = OutgoingMessage::media(
            to.to_string(),
            media_type,
            media_url.to_string(),
            caption.map(str::to_string),
        );
        self.dispatch(media_type.as_str(), &message).await
    }

    pub async fn send_location_message(
        &self,
        to: &str,
        latitude: f64,
        longitude: f64,
        name: Option<&str>,
        address: Option<&str>,
    ) -> bool {
        let message = OutgoingMessage::location(
            to.to_string(),
            latitude,
            longitude,
            name.map(str::to_string),
            address.map(str::to_string),
        );
        self.dispatch("location", &message).await
    }

    /// Sends a list message (catalogs, menus, etc.)
    pub async fn send_list_message(
        &self,
        to: &str,
        header_text: &str,
        body_text: &str,
        button_text: &str,
        sections: Vec<InteractiveSection>,
    ) -> bool {
        let interactive = InteractiveContent::list(
            header_text.to_string(),
            body_text.to_string(),
            button_text.to_string(),
            sections,
        );
        let message = OutgoingMessage::interactive(to.to_string(), interactive);
        self.dispatch("list", &message).await
    }

    /// Sends a single product from a catalog
    pub async fn send_product_message(
        &self,
        to: &str,
        catalog_id: &str,
        product_retailer_id: &str,
    ) -> bool {
        let interactive =
            InteractiveContent::product(catalog_id.to_string(), product_retailer_id.to_string());
        let message = OutgoingMessage::interactive(to.to_string(), interactive);
        self.dispatch("product", &message).await
    }

    /// Sends several catalog products, grouped in sections of 30
    pub async fn send_product_list_message(
        &self,
        to: &str,
        catalog_id: &str,
        product_retailer_ids: &[String],
        header_text: &str,
        body_text: &str,
    ) -> bool {
        let interactive = InteractiveContent::product_list(
            catalog_id.to_string(),
            product_retailer_ids,
            header_text.to_string(),
            body_text.to_string(),
        );
        let message = OutgoingMessage::interactive(to.to_string(), interactive);
        self.dispatch("product_list", &message).await
    }

    /// Marks an incoming message as read (blue ticks)
    pub async fn mark_message_as_read(&self, message_id: &str) -> bool {
        let receipt = ReadReceipt::new(message_id.to_string());
        self.dispatch("read_receipt", &receipt).await
    }

    /// Sends the payload and turns the outcome into a logged `bool`
    async fn dispatch<T: serde::Serialize>(&self, kind: &str, payload: &T) -> bool {
        let sent = match self.send_message(payload).await {
            Ok(()) => true,
            Err(e) => {
                logfire::error!(
                    "Failed to send WhatsApp {kind} message for store {store_id}: {error}",
                    kind = kind.to_string(),
                    store_id = self.store_id.clone(),
                    error = format!("{e:#}")
                );
                false
            }
        };

        metric::incr_outbound_message_statds(kind, sent);
        sent
    }

    /// Internal method to send any payload to WhatsApp API
    async fn send_message<T: serde::Serialize>(&self, payload: &T) -> Result<()> {
        tracing::debug!(store_id = %self.store_id, endpoint = %self.endpoint, "sending WhatsApp payload");

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.auth_token)
            .header("Content-Type", "application/json")
            .json(payload)
            .send()
            .await
            .context("Failed to send request to WhatsApp API")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read response body".to_string());

            anyhow::bail!("WhatsApp API returned error status {}: {}", status, body);
        }

        Ok(())
    }
}
