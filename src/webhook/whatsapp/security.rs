//! Security utilities for WhatsApp webhook requests
//!
//! - Verify-token comparison for the subscription handshake (GET)
//! - Optional `X-Hub-Signature-256` check for deliveries (POST), enabled when
//!   an app secret is configured
//!
//! Meta signs the raw body with HMAC-SHA256 keyed by the app secret and sends
//! `sha256=<hex signature>`. The signature MUST be computed over the raw
//! bytes, not re-serialized JSON.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// Compares a received verify token with the store's secret in constant time
pub fn verify_token_matches(received: Option<&str>, expected: Option<&str>) -> bool {
    match (received, expected) {
        (Some(received), Some(expected)) => received.as_bytes().ct_eq(expected.as_bytes()).into(),
        _ => false,
    }
}

/// Hex HMAC-SHA256 of `payload`, prefixed as in the `X-Hub-Signature-256` header
pub fn sign_payload(payload: &[u8], app_secret: &str) -> anyhow::Result<String> {
    let mut mac = HmacSha256::new_from_slice(app_secret.as_bytes())
        .map_err(|e| anyhow::anyhow!("invalid HMAC key: {e}"))?;
    mac.update(payload);

    Ok(format!("sha256={}", hex::encode(mac.finalize().into_bytes())))
}

/// Verifies the `X-Hub-Signature-256` header against the raw request body
///
/// A missing header, a header without the `sha256=` prefix or a non-hex
/// signature are all rejected.
pub fn verify_signature(signature_header: Option<&str>, payload: &[u8], app_secret: &str) -> bool {
    let Some(signature_header) = signature_header else {
        logfire::warn!("Missing X-Hub-Signature-256 header");
        return false;
    };

    let Some(signature_hex) = signature_header.strip_prefix("sha256=") else {
        logfire::warn!("Invalid signature header format: expected 'sha256=' prefix");
        return false;
    };

    let expected_signature = match hex::decode(signature_hex) {
        Ok(sig) => sig,
        Err(e) => {
            logfire::warn!(
                "Failed to decode signature hex: {error}",
                error = e.to_string()
            );
            return false;
        }
    };

    let mut mac = match HmacSha256::new_from_slice(app_secret.as_bytes()) {
        Ok(m) => m,
        Err(e) => {
            logfire::error!(
                "Failed to create HMAC instance: {error}",
                error = e.to_string()
            );
            return false;
        }
    };
    mac.update(payload);
    let computed_signature = mac.finalize().into_bytes();

    let is_valid: bool = computed_signature.ct_eq(&expected_signature[..]).into();
    if !is_valid {
        logfire::warn!("Webhook signature verification failed: signatures do not match");
    }

    is_valid
}
