//! # WhatsApp Outgoing Message Schemas
//!
//! Typed contracts for every payload sent to the Graph API `/messages` endpoint.
//! Each message kind owns its own content struct so a change in the platform
//! format stays local to one type.

use crate::consts;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Envelope shared by every outgoing message
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct OutgoingMessage {
    /// Messaging product, always "whatsapp"
    pub messaging_product: String,
    /// Always "individual"
    pub recipient_type: String,
    /// Recipient's WhatsApp ID (phone number)
    pub to: String,
    /// `type` tag plus the matching content object
    #[serde(flatten)]
    pub content: OutgoingContent,
}

impl OutgoingMessage {
    fn new(to: String, content: OutgoingContent) -> Self {
        Self {
            messaging_product: consts::MESSAGING_PRODUCT.to_string(),
            recipient_type: consts::RECIPIENT_TYPE_INDIVIDUAL.to_string(),
            to,
            content,
        }
    }

    /// Creates a plain text message, link previews disabled
    pub fn text(to: String, body: String) -> Self {
        Self::new(
            to,
            OutgoingContent::Text {
                text: TextContent {
                    preview_url: false,
                    body,
                },
            },
        )
    }

    pub fn interactive(to: String, interactive: InteractiveContent) -> Self {
        Self::new(to, OutgoingContent::Interactive { interactive })
    }

    /// Creates a template message
    ///
    /// Every param becomes a `text` parameter of a single `body` component, in order.
    /// No params means no components at all.
    pub fn template(to: String, name: String, language_code: String, params: Vec<String>) -> Self {
        let components = if params.is_empty() {
            vec![]
        } else {
            vec![TemplateComponent {
                component_type: "body".to_string(),
                parameters: params.into_iter().map(TemplateParameter::text).collect(),
            }]
        };

        Self::new(
            to,
            OutgoingContent::Template {
                template: TemplateContent {
                    name,
                    language: TemplateLanguage {
                        code: language_code,
                    },
                    components,
                },
            },
        )
    }

    /// Creates a media message from a public link
    ///
    /// The caption is dropped for audio, which WhatsApp does not caption.
    pub fn media(to: String, media_type: MediaType, link: String, caption: Option<String>) -> Self {
        let media = MediaContent {
            link,
            caption: caption
                .filter(|c| !c.is_empty())
                .filter(|_| media_type.supports_caption()),
        };

        let content = match media_type {
            MediaType::Image => OutgoingContent::Image { image: media },
            MediaType::Audio => OutgoingContent::Audio { audio: media },
            MediaType::Document => OutgoingContent::Document { document: media },
            MediaType::Video => OutgoingContent::Video { video: media },
        };

        Self::new(to, content)
    }

    pub fn location(
        to: String,
        latitude: f64,
        longitude: f64,
        name: Option<String>,
        address: Option<String>,
    ) -> Self {
        Self::new(
            to,
            OutgoingContent::Location {
                location: LocationContent {
                    latitude,
                    longitude,
                    name: name.filter(|n| !n.is_empty()),
                    address: address.filter(|a| !a.is_empty()),
                },
            },
        )
    }
}

/// Message content keyed by its `type`
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutgoingContent {
    Text { text: TextContent },
    Interactive { interactive: InteractiveContent },
    Template { template: TemplateContent },
    Image { image: MediaContent },
    Audio { audio: MediaContent },
    Document { document: MediaContent },
    Video { video: MediaContent },
    Location { location: LocationContent },
}

/// Text content for outgoing messages
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TextContent {
    pub preview_url: bool,
    pub body: String,
}

/// Media kinds that can be sent by link
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Image,
    Audio,
    Document,
    Video,
}

impl MediaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Image => "image",
            MediaType::Audio => "audio",
            MediaType::Document => "document",
            MediaType::Video => "video",
        }
    }

    pub fn supports_caption(&self) -> bool {
        !matches!(self, MediaType::Audio)
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MediaContent {
    pub link: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct LocationContent {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TemplateContent {
    pub name: String,
    pub language: TemplateLanguage,
    pub components: Vec<TemplateComponent>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TemplateLanguage {
    pub code: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TemplateComponent {
    #[serde(rename = "type")]
    pub component_type: String,
    pub parameters: Vec<TemplateParameter>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TemplateParameter {
    #[serde(rename = "type")]
    pub parameter_type: String,
    pub text: String,
}

impl TemplateParameter {
    pub fn text(text: String) -> Self {
        Self {
            parameter_type: "text".to_string(),
            text,
        }
    }
}

/// Interactive content, keyed by the interactive `type`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InteractiveContent {
    List {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        header: Option<InteractiveHeader>,
        body: InteractiveBody,
        action: ListAction,
    },
    Button {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        header: Option<InteractiveHeader>,
        body: InteractiveBody,
        action: ButtonAction,
    },
    Product {
        body: InteractiveBody,
        action: ProductAction,
    },
    ProductList {
        header: InteractiveHeader,
        body: InteractiveBody,
        action: ProductListAction,
    },
    Flow {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        header: Option<InteractiveHeader>,
        body: InteractiveBody,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        footer: Option<InteractiveFooter>,
        action: FlowAction,
    },
    CtaUrl {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        header: Option<InteractiveHeader>,
        body: InteractiveBody,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        footer: Option<InteractiveFooter>,
        action: CtaUrlAction,
    },
}

impl InteractiveContent {
    /// Creates a list message with a text header
    pub fn list(
        header: String,
        body: String,
        button_text: String,
        sections: Vec<InteractiveSection>,
    ) -> Self {
        Self::List {
            header: Some(InteractiveHeader::text(header)),
            body: InteractiveBody { text: body },
            action: ListAction {
                button: button_text,
                sections,
            },
        }
    }

    /// Creates a reply-buttons message, `(id, title)` per button
    pub fn buttons(body: String, buttons: Vec<(String, String)>) -> Self {
        Self::Button {
            header: None,
            body: InteractiveBody { text: body },
            action: ButtonAction {
                buttons: buttons
                    .into_iter()
                    .map(|(id, title)| ReplyButton {
                        button_type: "reply".to_string(),
                        reply: ReplyButtonContent { id, title },
                    })
                    .collect(),
            },
        }
    }

    /// Creates a single product message from a catalog
    pub fn product(catalog_id: String, product_retailer_id: String) -> Self {
        Self::Product {
            body: InteractiveBody {
                text: consts::PRODUCT_MESSAGE_BODY.to_string(),
            },
            action: ProductAction {
                catalog_id,
                product_retailer_id,
            },
        }
    }

    /// Creates a multi-product message, see [`product_sections`]
    pub fn product_list(
        catalog_id: String,
        product_retailer_ids: &[String],
        header: String,
        body: String,
    ) -> Self {
        Self::ProductList {
            header: InteractiveHeader::text(header),
            body: InteractiveBody { text: body },
            action: ProductListAction {
                catalog_id,
                sections: product_sections(product_retailer_ids),
            },
        }
    }

    /// Creates a flow message
    ///
    /// With a `screen` the flow opens there (`navigate`), passing `data` to it;
    /// without one the first screen is fetched from the flow endpoint
    /// (`data_exchange`).
    pub fn flow(
        body: String,
        flow_id: String,
        flow_token: String,
        flow_cta: String,
        screen: Option<String>,
        data: Option<Value>,
    ) -> Self {
        let (flow_action, flow_action_payload) = match screen {
            Some(screen) => ("navigate", Some(FlowActionPayload { screen, data })),
            None => ("data_exchange", None),
        };

        Self::Flow {
            header: None,
            body: InteractiveBody { text: body },
            footer: None,
            action: FlowAction {
                name: "flow".to_string(),
                parameters: FlowParameters {
                    flow_message_version: consts::FLOW_MESSAGE_VERSION.to_string(),
                    flow_token,
                    flow_id,
                    flow_cta,
                    flow_action: flow_action.to_string(),
                    flow_action_payload,
                },
            },
        }
    }

    /// Creates a call-to-action button opening `url`
    pub fn cta_url(body: String, display_text: String, url: String) -> Self {
        Self::CtaUrl {
            header: None,
            body: InteractiveBody { text: body },
            footer: None,
            action: CtaUrlAction {
                name: "cta_url".to_string(),
                parameters: CtaUrlParameters { display_text, url },
            },
        }
    }
}

/// Splits product ids into sections of at most [`consts::PRODUCTS_PER_SECTION`]
///
/// Titles carry the 1-based range of the section, e.g. "Products 31 - 45".
pub fn product_sections(product_retailer_ids: &[String]) -> Vec<ProductSection> {
    product_retailer_ids
        .chunks(consts::PRODUCTS_PER_SECTION)
        .enumerate()
        .map(|(chunk_idx, chunk)| {
            let start = chunk_idx * consts::PRODUCTS_PER_SECTION;
            ProductSection {
                title: format!("Products {} - {}", start + 1, start + chunk.len()),
                product_items: chunk
                    .iter()
                    .map(|id| ProductItem {
                        product_retailer_id: id.clone(),
                    })
                    .collect(),
            }
        })
        .collect()
}

/// Interactive message header
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InteractiveHeader {
    /// Header type (e.g., "text")
    #[serde(rename = "type")]
    pub header_type: String,
    pub text: String,
}

impl InteractiveHeader {
    pub fn text(text: String) -> Self {
        Self {
            header_type: "text".to_string(),
            text,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InteractiveBody {
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InteractiveFooter {
    pub text: String,
}

/// List action (button and sections)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ListAction {
    /// Text of the button opening the list
    pub button: String,
    pub sections: Vec<InteractiveSection>,
}

/// List section containing rows
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InteractiveSection {
    pub title: String,
    pub rows: Vec<InteractiveRow>,
}

/// Interactive row (list item)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InteractiveRow {
    /// Unique row ID, sent back in the `list_reply`
    pub id: String,
    /// Row title (displayed to user)
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl InteractiveRow {
    pub fn new(id: String, title: String, description: Option<String>) -> Self {
        Self {
            id,
            title,
            description: description.filter(|d| !d.is_empty()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ButtonAction {
    pub buttons: Vec<ReplyButton>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReplyButton {
    /// Always "reply"
    #[serde(rename = "type")]
    pub button_type: String,
    pub reply: ReplyButtonContent,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReplyButtonContent {
    pub id: String,
    pub title: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductAction {
    pub catalog_id: String,
    pub product_retailer_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductListAction {
    pub catalog_id: String,
    pub sections: Vec<ProductSection>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductSection {
    pub title: String,
    pub product_items: Vec<ProductItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductItem {
    pub product_retailer_id: String,
}

/// Flow action, `name` is always "flow"
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FlowAction {
    pub name: String,
    pub parameters: FlowParameters,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FlowParameters {
    pub flow_message_version: String,
    /// Echoed back in the `nfm_reply` of the answer
    pub flow_token: String,
    pub flow_id: String,
    /// Text of the button opening the flow
    pub flow_cta: String,
    /// "navigate" or "data_exchange"
    pub flow_action: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flow_action_payload: Option<FlowActionPayload>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FlowActionPayload {
    pub screen: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// Call-to-action URL button, `name` is always "cta_url"
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CtaUrlAction {
    pub name: String,
    pub parameters: CtaUrlParameters,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CtaUrlParameters {
    pub display_text: String,
    pub url: String,
}

/// Marks an incoming message as read
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ReadReceipt {
    pub messaging_product: String,
    /// Always "read"
    pub status: String,
    pub message_id: String,
}

impl ReadReceipt {
    pub fn new(message_id: String) -> Self {
        Self {
            messaging_product: consts::MESSAGING_PRODUCT.to_string(),
            status: "read".to_string(),
            message_id,
        }
    }
}
