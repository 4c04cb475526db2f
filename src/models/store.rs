use serde::{Deserialize, Serialize};

/// A tenant owning its own WhatsApp Business credentials.
///
/// Rows are managed by the store administration system; this service only reads them.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, sqlx::FromRow)]
pub struct Store {
    pub id: String,
    pub whatsapp_access_token: Option<String>,
    pub whatsapp_phone_number_id: Option<String>,
    pub whatsapp_webhook_secret: Option<String>,
}

impl Store {
    /// Access token and phone number id, if both are configured
    pub fn whatsapp_credentials(&self) -> Option<(&str, &str)> {
        let token = non_empty(self.whatsapp_access_token.as_deref())?;
        let phone_number_id = non_empty(self.whatsapp_phone_number_id.as_deref())?;

        Some((token, phone_number_id))
    }

    /// Webhook verification secret, if configured
    pub fn webhook_secret(&self) -> Option<&str> {
        non_empty(self.whatsapp_webhook_secret.as_deref())
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whatsapp_credentials_need_token_and_phone() {
        let mut store = Store {
            id: "store-1".into(),
            whatsapp_access_token: Some("token".into()),
            whatsapp_phone_number_id: None,
            whatsapp_webhook_secret: None,
        };
        assert!(store.whatsapp_credentials().is_none());

        store.whatsapp_phone_number_id = Some("".into());
        assert!(store.whatsapp_credentials().is_none());

        store.whatsapp_phone_number_id = Some("1234".into());
        assert_eq!(store.whatsapp_credentials(), Some(("token", "1234")));
    }

    #[test]
    fn test_empty_webhook_secret_is_not_configured() {
        let mut store = Store {
            whatsapp_webhook_secret: Some(String::new()),
            ..Store::default()
        };
        assert!(store.webhook_secret().is_none());

        store.whatsapp_webhook_secret = Some(" ".into());
        assert_eq!(store.webhook_secret(), Some(" "));
    }

    #[test]
    fn test_whitespace_credentials_are_configured() {
        let store = Store {
            id: "store-1".into(),
            whatsapp_access_token: Some(" ".into()),
            whatsapp_phone_number_id: Some("1234".into()),
            whatsapp_webhook_secret: None,
        };
        assert_eq!(store.whatsapp_credentials(), Some((" ", "1234")));
    }
}
