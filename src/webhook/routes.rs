use ntex::web;

/// Configures webhook routes for the WhatsApp Business API.
///
/// These routes are public endpoints; the store id in the path selects the
/// credentials used to authenticate the platform.
///
/// # Routes
/// - `GET /api/webhooks/whatsapp/message/{store_id}` - subscription handshake
/// - `POST /api/webhooks/whatsapp/message/{store_id}` - event delivery
pub fn whatsapp(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/webhooks/whatsapp/message")
            .service((super::whatsapp::verify, super::whatsapp::receive)),
    );
}
