//! # WhatsApp Message Schemas
//!
//! - `incoming`: messages and statuses received through the webhook
//! - `outgoing`: payloads sent to the Graph API, one typed contract per message kind

pub mod incoming;
pub mod outgoing;

// Re-export commonly used types
pub use incoming::*;
pub use outgoing::*;
