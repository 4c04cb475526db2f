pub const MESSAGING_PRODUCT: &str = "whatsapp";
pub const RECIPIENT_TYPE_INDIVIDUAL: &str = "individual";
pub const WHATSAPP_BUSINESS_ACCOUNT_OBJECT: &str = "whatsapp_business_account";
pub const WEBHOOK_SUBSCRIBE_MODE: &str = "subscribe";
pub const SIGNATURE_HEADER: &str = "X-Hub-Signature-256";

/// WhatsApp rejects product list sections holding more items than this
pub const PRODUCTS_PER_SECTION: usize = 30;
pub const PRODUCT_MESSAGE_BODY: &str = "Check out this product";

/// Flow JSON version sent with flow messages
pub const FLOW_MESSAGE_VERSION: &str = "3";
