pub const QUERY_CREATE_STORE_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS store (
    id TEXT PRIMARY KEY NOT NULL,
    whatsapp_access_token TEXT,
    whatsapp_phone_number_id TEXT,
    whatsapp_webhook_secret TEXT
);
"#;

pub const QUERY_GET_STORE_BY_ID: &str = r#"
SELECT
    id,whatsapp_access_token,whatsapp_phone_number_id,whatsapp_webhook_secret
FROM store
WHERE id=$1;
"#;
