//! # WhatsApp Webhook Schemas
//!
//! Data structures for the parts of a WhatsApp Business API webhook this
//! service reads. The envelope (`object` / `entry` / `changes` / `value`) is
//! navigated on a raw [`serde_json::Value`] so that odd shapes can be
//! acknowledged instead of rejected; only the message and status objects
//! are typed.
//!
//! A message only needs `from` and `id`. Typed sub-objects that do not parse
//! are dropped instead of failing the whole message, and fields without a
//! type here are kept in [`Message::extra`].

use serde::{Deserialize, Deserializer, Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};

/// Message object
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct Message {
    /// Sender's WhatsApp ID (phone number)
    pub from: String,
    /// Message ID
    pub id: String,
    /// Unix timestamp of the message, as sent by WhatsApp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    /// Message type (text, image, interactive, order, ...)
    #[serde(rename = "type", default)]
    pub msg_type: String,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub text: Option<TextMessage>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub image: Option<MediaMessage>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub video: Option<MediaMessage>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub document: Option<MediaMessage>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub audio: Option<MediaMessage>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub sticker: Option<MediaMessage>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub location: Option<LocationMessage>,
    /// Reply to an interactive list, reply-button or flow message
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub interactive: Option<InteractiveReply>,
    /// Quick reply button from a template message
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub button: Option<ButtonReply>,
    /// Cart sent back from a product or product list message
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub order: Option<Order>,
    /// Reply or forward context
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub context: Option<Context>,
    /// Everything else WhatsApp sent (reaction, contacts, referral, errors, ...)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// `None` when the field is null or does not match `T`
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|value| serde_json::from_value(value).ok()))
}

impl Message {
    /// Text the user typed or picked, whatever the message type
    pub fn text_content(&self) -> Option<&str> {
        if let Some(text) = &self.text {
            return Some(&text.body);
        }

        if let Some(interactive) = &self.interactive {
            return interactive
                .button_reply
                .as_ref()
                .or(interactive.list_reply.as_ref())
                .map(|reply| reply.title.as_str());
        }

        if let Some(order) = &self.order {
            return order.text.as_deref();
        }

        self.button.as_ref().map(|button| button.text.as_str())
    }

    pub fn is_forwarded(&self) -> bool {
        self.context
            .as_ref()
            .is_some_and(|context| context.forwarded || context.frequently_forwarded)
    }
}

/// Text message content
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct TextMessage {
    pub body: String,
}

/// Media message content (image, video, document, audio, sticker)
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct MediaMessage {
    /// Media ID
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
}

/// Location message content
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct LocationMessage {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

/// Interactive reply: `button_reply`, `list_reply` or `nfm_reply` (flows)
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct InteractiveReply {
    #[serde(rename = "type", default)]
    pub reply_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub button_reply: Option<ReplySelection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub list_reply: Option<ReplySelection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nfm_reply: Option<FlowReply>,
}

/// Option picked by the user
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ReplySelection {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Answers submitted from a flow
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct FlowReply {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    /// JSON object encoded as a string
    pub response_json: String,
}

impl FlowReply {
    pub fn response(&self) -> serde_json::Result<Value> {
        serde_json::from_str(&self.response_json)
    }
}

/// Template quick reply button
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ButtonReply {
    #[serde(default)]
    pub payload: String,
    #[serde(default)]
    pub text: String,
}

/// Cart placed by the user
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct Order {
    #[serde(default)]
    pub catalog_id: String,
    /// Note typed along with the order
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default)]
    pub product_items: Vec<OrderItem>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct OrderItem {
    pub product_retailer_id: String,
    #[serde(default)]
    pub quantity: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
}

/// Context of a reply or a forwarded message
///
/// Replies carry the quoted message; forwards only carry the flags.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct Context {
    /// Sender of the message being replied to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    /// Message ID being referenced
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub forwarded: bool,
    #[serde(default)]
    pub frequently_forwarded: bool,
}

/// Status update for sent messages
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct Status {
    /// Message ID
    pub id: String,
    /// Status (sent, delivered, read, failed)
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient_id: Option<String>,
}
