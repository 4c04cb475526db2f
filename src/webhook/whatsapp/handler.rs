//! # WhatsApp Webhook Handler
//!
//! Shape checks over the raw webhook body and the message flow through the
//! store's conversation manager.

use super::{
    conversation::ImplConversationManagerFactory,
    schemas::{Message, Status},
};
use crate::{consts, metric, models::store::Store, webhook::errors::WebhookError};
use serde_json::Value;

/// Result of handling one webhook delivery
#[derive(Debug, PartialEq, derive_more::Display)]
pub enum WebhookOutcome {
    /// A message was handed to the conversation manager
    #[display("message {message_id} processed")]
    MessageProcessed { message_id: String },
    /// Status update or any other event, acknowledged untouched
    #[display("non-message event acknowledged")]
    NonMessageEvent,
}

/// `entry[0].changes[0].value`, when the body is a WhatsApp Business Account event
fn first_change_value(payload: &Value) -> Option<&Value> {
    if payload.get("object")?.as_str()? != consts::WHATSAPP_BUSINESS_ACCOUNT_OBJECT {
        return None;
    }

    payload
        .get("entry")?
        .as_array()?
        .first()?
        .get("changes")?
        .as_array()?
        .first()?
        .get("value")
}

/// Extracts the first message of the first change
///
/// Returns `None` for anything not shaped like a message delivery: another
/// `object`, missing or empty `entry` / `changes` / `messages` arrays, or a
/// message without `from` and `id`.
pub fn extract_first_message(payload: &Value) -> Option<Message> {
    let message = first_change_value(payload)?
        .get("messages")?
        .as_array()?
        .first()?;

    serde_json::from_value(message.clone()).ok()
}

/// Status updates carried by the first change; malformed entries are skipped
pub fn extract_statuses(payload: &Value) -> Vec<Status> {
    first_change_value(payload)
        .and_then(|value| value.get("statuses"))
        .and_then(Value::as_array)
        .map(|statuses| {
            statuses
                .iter()
                .filter_map(|status| serde_json::from_value(status.clone()).ok())
                .collect()
        })
        .unwrap_or_default()
}

fn log_statuses(store: &Store, payload: &Value) {
    for status in extract_statuses(payload) {
        logfire::info!(
            "Message {message_id} is {delivery_status} for store {store_id}",
            message_id = status.id,
            delivery_status = status.status,
            store_id = store.id.clone()
        );
        metric::incr_webhook_event_statds("status");
    }
}

/// Main webhook processor
///
/// On a message: create the store's conversation manager, initialize it,
/// let it process the message, then mark the message as read. The read
/// receipt outcome does not change the result.
pub async fn process_webhook(
    store: &Store,
    payload: &Value,
    conversations: &ImplConversationManagerFactory,
) -> Result<WebhookOutcome, WebhookError> {
    let Some(message) = extract_first_message(payload) else {
        log_statuses(store, payload);
        metric::incr_webhook_event_statds("non_message");
        return Ok(WebhookOutcome::NonMessageEvent);
    };

    logfire::info!(
        "Received message from {from}",
        from = message.from.clone()
    );
    metric::incr_webhook_event_statds("message");

    let mut conversation_manager = conversations.create(store);
    if !conversation_manager.initialize().await {
        return Err(WebhookError::ConversationManagerUnavailable);
    }

    conversation_manager
        .process_message(&message.from, &message)
        .await?;

    if let Some(message_service) = conversation_manager.whatsapp_service() {
        message_service.mark_message_as_read(&message.id).await;
    }

    Ok(WebhookOutcome::MessageProcessed {
        message_id: message.id,
    })
}
