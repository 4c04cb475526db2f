//! WhatsApp webhook integration module
//!
//! ## Submodules
//!
//! - [`routes`] - HTTP endpoint handlers (GET verification, POST delivery)
//! - [`handler`] - shape checks and the message flow
//! - [`conversation`] - conversation manager seam and its default implementation
//! - [`client`] - outbound message client, one method per message kind
//! - [`schemas`] - incoming and outgoing payloads
//! - [`security`] - verify-token and signature checks

pub mod client;
pub mod conversation;
pub mod handler;
pub mod routes;
pub mod schemas;
pub mod security;

// Re-export commonly used items for convenience
pub use routes::{receive, verify};
