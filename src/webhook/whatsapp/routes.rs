//! WhatsApp webhook endpoint handlers
//!
//! Both endpoints are scoped per store: the `{store_id}` path segment selects
//! the credentials used to verify the subscription and to answer messages.
//!
//! # Security
//!
//! When an app secret is configured, the POST endpoint rejects bodies whose
//! `X-Hub-Signature-256` does not match before doing anything else.

use super::{handler, security};
use crate::{
    consts, metric,
    webhook::{AppState, errors::WebhookError},
};
use ntex::{util::Bytes, web};
use serde::Deserialize;

/// Query parameters for webhook verification
///
/// All of them are optional: a request missing any of them simply fails verification.
#[derive(Debug, Deserialize)]
pub struct VerifyQuery {
    /// The mode parameter, should be "subscribe"
    #[serde(rename = "hub.mode")]
    pub mode: Option<String>,
    /// The verification token from WhatsApp
    #[serde(rename = "hub.verify_token")]
    pub verify_token: Option<String>,
    /// The challenge string to echo back
    #[serde(rename = "hub.challenge")]
    pub challenge: Option<String>,
}

/// Webhook verification endpoint (GET)
///
/// # Returns
/// - 200 with the challenge as plain text if verification succeeds
/// - 403 if mode or token are wrong, or the store has no webhook secret
/// - 404 if the store does not exist
#[web::get("/{store_id}")]
pub async fn verify(
    path: web::types::Path<String>,
    query: web::types::Query<VerifyQuery>,
    app_state: web::types::State<AppState>,
) -> Result<impl web::Responder, web::Error> {
    let store_id = path.into_inner();
    let query = query.into_inner();

    let store = app_state
        .repo
        .get_store_by_id(&store_id)
        .await
        .map_err(WebhookError::from)?
        .ok_or(WebhookError::StoreNotFound)?;

    let mode_is_subscribe = query.mode.as_deref() == Some(consts::WEBHOOK_SUBSCRIBE_MODE);
    if !mode_is_subscribe
        || !security::verify_token_matches(query.verify_token.as_deref(), store.webhook_secret())
    {
        metric::incr_webhook_event_statds("verification_failed");
        return Err(WebhookError::VerificationFailed.into());
    }

    logfire::info!("Webhook verified for store {store_id}", store_id = store_id);
    metric::incr_webhook_event_statds("verified");

    Ok(web::HttpResponse::Ok()
        .content_type("text/plain")
        .body(query.challenge.unwrap_or_default()))
}

/// Webhook receiver endpoint (POST)
///
/// Anything that is not a message delivery (status updates, other objects,
/// partial bodies) is acknowledged with `{"success": true}`.
///
/// # Returns
/// - 200 `{"success": true}` once handled
/// - 403 on a bad signature (only with an app secret configured)
/// - 404 if the store does not exist
/// - 500 if the body is not JSON, the conversation manager can't start or fails
#[web::post("/{store_id}")]
pub async fn receive(
    req: web::HttpRequest,
    path: web::types::Path<String>,
    body: Bytes,
    app_state: web::types::State<AppState>,
) -> Result<impl web::Responder, web::Error> {
    let store_id = path.into_inner();

    if let Some(app_secret) = &app_state.app_secret {
        let signature = req
            .headers()
            .get(consts::SIGNATURE_HEADER)
            .and_then(|value| value.to_str().ok());

        if !security::verify_signature(signature, &body, app_secret) {
            return Err(WebhookError::InvalidSignature.into());
        }
    }

    let payload: serde_json::Value = serde_json::from_slice(&body).map_err(|e| {
        WebhookError::InternalServerError(format!("webhook body is not valid JSON: {e}"))
    })?;

    let store = app_state
        .repo
        .get_store_by_id(&store_id)
        .await
        .map_err(WebhookError::from)?
        .ok_or(WebhookError::StoreNotFound)?;

    logfire::info!(
        "Received webhook for store {store_id}: {payload}",
        store_id = store_id,
        payload = payload.to_string()
    );

    let outcome = handler::process_webhook(&store, &payload, &app_state.conversations).await?;
    logfire::info!(
        "Webhook for store {store_id}: {outcome}",
        store_id = store.id.clone(),
        outcome = outcome.to_string()
    );

    Ok(web::HttpResponse::Ok().json(&serde_json::json!({
        "success": true
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::GraphApiSettings,
        models::store::Store,
        repo::MockStoreRepo,
        webhook::{
            routes,
            whatsapp::conversation::{
                AcknowledgingConversationManagerFactory, ConversationManager,
                ImplConversationManagerFactory, MockConversationManager,
                MockConversationManagerFactory,
            },
        },
    };
    use mockall::predicate::*;
    use ntex::{http, web::test};
    use serde_json::json;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{body_json, method, path},
    };

    const WEBHOOK_URL: &str = "/api/webhooks/whatsapp/message/store-1";

    fn test_store() -> Store {
        Store {
            id: "store-1".into(),
            whatsapp_access_token: Some("EAAG-token".into()),
            whatsapp_phone_number_id: Some("1099".into()),
            whatsapp_webhook_secret: Some("hook-secret".into()),
        }
    }

    fn repo_with(store: Option<Store>) -> MockStoreRepo {
        let mut repo = MockStoreRepo::new();
        repo.expect_get_store_by_id()
            .with(eq("store-1"))
            .returning(move |_| Ok(store.clone()));
        repo
    }

    fn factory_never_called() -> ImplConversationManagerFactory {
        let mut factory = MockConversationManagerFactory::new();
        factory.expect_create().never();
        Box::new(factory)
    }

    fn message_body() -> serde_json::Value {
        json!({
            "object": "whatsapp_business_account",
            "entry": [{
                "id": "WABA_ID",
                "changes": [{
                    "field": "messages",
                    "value": {
                        "messaging_product": "whatsapp",
                        "metadata": {"display_phone_number": "15550001111", "phone_number_id": "1099"},
                        "messages": [{
                            "from": "5215512345678",
                            "id": "wamid.in",
                            "timestamp": "1717000000",
                            "type": "text",
                            "text": {"body": "hola"}
                        }]
                    }
                }]
            }]
        })
    }

    async fn call(
        repo: MockStoreRepo,
        conversations: ImplConversationManagerFactory,
        app_secret: Option<String>,
        req: ntex::http::Request,
    ) -> (http::StatusCode, Bytes) {
        let app = test::init_service(
            web::App::new()
                .state(AppState {
                    repo: Box::new(repo),
                    conversations,
                    app_secret,
                })
                .configure(routes::whatsapp),
        )
        .await;

        let resp = test::call_service(&app, req).await;
        let status = resp.status();
        (status, test::read_body(resp).await)
    }

    fn json_body(bytes: &Bytes) -> serde_json::Value {
        serde_json::from_slice(bytes).unwrap()
    }

    #[test]
    fn test_verify_query_deserialization() {
        let json = r#"{"hub.mode":"subscribe","hub.verify_token":"test123","hub.challenge":"challenge123"}"#;
        let query: VerifyQuery = serde_json::from_str(json).unwrap();
        assert_eq!(query.mode.as_deref(), Some("subscribe"));
        assert_eq!(query.verify_token.as_deref(), Some("test123"));
        assert_eq!(query.challenge.as_deref(), Some("challenge123"));

        let query: VerifyQuery = serde_json::from_str("{}").unwrap();
        assert!(query.mode.is_none() && query.challenge.is_none());
    }

    #[ntex::test]
    async fn test_verify_echoes_challenge() {
        let req = test::TestRequest::with_uri(&format!(
            "{WEBHOOK_URL}?hub.mode=subscribe&hub.verify_token=hook-secret&hub.challenge=1158201444"
        ))
        .to_request();

        let (status, body) = call(repo_with(Some(test_store())), factory_never_called(), None, req).await;

        assert_eq!(status, http::StatusCode::OK);
        assert_eq!(body, Bytes::from_static(b"1158201444"));
    }

    #[ntex::test]
    async fn test_verify_wrong_token() {
        let req = test::TestRequest::with_uri(&format!(
            "{WEBHOOK_URL}?hub.mode=subscribe&hub.verify_token=nope&hub.challenge=1158201444"
        ))
        .to_request();

        let (status, body) = call(repo_with(Some(test_store())), factory_never_called(), None, req).await;

        assert_eq!(status, http::StatusCode::FORBIDDEN);
        assert_eq!(json_body(&body), json!({"error": "Verification failed"}));
    }

    #[ntex::test]
    async fn test_verify_wrong_mode() {
        let req = test::TestRequest::with_uri(&format!(
            "{WEBHOOK_URL}?hub.mode=unsubscribe&hub.verify_token=hook-secret&hub.challenge=1"
        ))
        .to_request();

        let (status, _) = call(repo_with(Some(test_store())), factory_never_called(), None, req).await;

        assert_eq!(status, http::StatusCode::FORBIDDEN);
    }

    #[ntex::test]
    async fn test_verify_missing_params_and_secret() {
        let store = Store {
            whatsapp_webhook_secret: None,
            ..test_store()
        };
        let req = test::TestRequest::with_uri(&format!("{WEBHOOK_URL}?hub.mode=subscribe")).to_request();

        let (status, _) = call(repo_with(Some(store)), factory_never_called(), None, req).await;

        assert_eq!(status, http::StatusCode::FORBIDDEN);
    }

    #[ntex::test]
    async fn test_verify_unknown_store() {
        let req = test::TestRequest::with_uri(&format!(
            "{WEBHOOK_URL}?hub.mode=subscribe&hub.verify_token=hook-secret&hub.challenge=1"
        ))
        .to_request();

        let (status, body) = call(repo_with(None), factory_never_called(), None, req).await;

        assert_eq!(status, http::StatusCode::NOT_FOUND);
        assert_eq!(json_body(&body), json!({"error": "Store not found"}));
    }

    #[ntex::test]
    async fn test_verify_repository_error() {
        let mut repo = MockStoreRepo::new();
        repo.expect_get_store_by_id()
            .returning(|_| Err(anyhow::anyhow!("database is locked")));
        let req = test::TestRequest::with_uri(&format!(
            "{WEBHOOK_URL}?hub.mode=subscribe&hub.verify_token=hook-secret&hub.challenge=1"
        ))
        .to_request();

        let (status, body) = call(repo, factory_never_called(), None, req).await;

        assert_eq!(status, http::StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json_body(&body), json!({"error": "Internal server error"}));
    }

    #[ntex::test]
    async fn test_receive_status_update_is_acknowledged() {
        let req = test::TestRequest::post()
            .uri(WEBHOOK_URL)
            .set_json(&json!({
                "object": "whatsapp_business_account",
                "entry": [{"changes": [{"field": "messages", "value": {"statuses": [
                    {"id": "wamid.out", "status": "read", "recipient_id": "5215512345678"}
                ]}}]}]
            }))
            .to_request();

        let (status, body) = call(repo_with(Some(test_store())), factory_never_called(), None, req).await;

        assert_eq!(status, http::StatusCode::OK);
        assert_eq!(json_body(&body), json!({"success": true}));
    }

    #[ntex::test]
    async fn test_receive_partial_bodies_are_acknowledged() {
        let bodies = [
            json!({}),
            json!({"object": "page", "entry": []}),
            json!({"object": "whatsapp_business_account", "entry": [{"changes": []}]}),
            json!({"object": "whatsapp_business_account", "entry": [{"changes": [{"value": {"messages": []}}]}]}),
        ];

        for body in bodies {
            let req = test::TestRequest::post()
                .uri(WEBHOOK_URL)
                .set_json(&body)
                .to_request();

            let (status, _) =
                call(repo_with(Some(test_store())), factory_never_called(), None, req).await;

            assert_eq!(status, http::StatusCode::OK, "body: {body}");
        }
    }

    #[ntex::test]
    async fn test_receive_unknown_store() {
        let req = test::TestRequest::post()
            .uri(WEBHOOK_URL)
            .set_json(&message_body())
            .to_request();

        let (status, body) = call(repo_with(None), factory_never_called(), None, req).await;

        assert_eq!(status, http::StatusCode::NOT_FOUND);
        assert_eq!(json_body(&body), json!({"error": "Store not found"}));
    }

    #[ntex::test]
    async fn test_receive_invalid_json() {
        let req = test::TestRequest::post()
            .uri(WEBHOOK_URL)
            .header("content-type", "application/json")
            .set_payload("{not json")
            .to_request();

        let (status, body) = call(MockStoreRepo::new(), factory_never_called(), None, req).await;

        assert_eq!(status, http::StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json_body(&body), json!({"error": "Internal server error"}));
    }

    #[ntex::test]
    async fn test_receive_initialize_failure() {
        let mut manager = MockConversationManager::new();
        manager.expect_initialize().returning(|| false);

        let mut factory = MockConversationManagerFactory::new();
        factory
            .expect_create()
            .times(1)
            .return_once(move |_| Box::new(manager) as Box<dyn ConversationManager>);

        let req = test::TestRequest::post()
            .uri(WEBHOOK_URL)
            .set_json(&message_body())
            .to_request();

        let (status, body) = call(repo_with(Some(test_store())), Box::new(factory), None, req).await;

        assert_eq!(status, http::StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            json_body(&body),
            json!({"error": "Failed to initialize conversation manager"})
        );
    }

    #[ntex::test]
    async fn test_receive_message_marks_it_read() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v18.0/1099/messages"))
            .and(body_json(json!({
                "messaging_product": "whatsapp",
                "status": "read",
                "message_id": "wamid.in"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
            .expect(1)
            .mount(&server)
            .await;

        let conversations = AcknowledgingConversationManagerFactory {
            http_client: reqwest::Client::new(),
            settings: GraphApiSettings {
                base_url: server.uri(),
                ..GraphApiSettings::default()
            },
        };
        let req = test::TestRequest::post()
            .uri(WEBHOOK_URL)
            .set_json(&message_body())
            .to_request();

        let (status, body) = call(
            repo_with(Some(test_store())),
            Box::new(conversations),
            None,
            req,
        )
        .await;

        assert_eq!(status, http::StatusCode::OK);
        assert_eq!(json_body(&body), json!({"success": true}));
    }

    #[ntex::test]
    async fn test_receive_read_receipt_failure_is_ignored() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let conversations = AcknowledgingConversationManagerFactory {
            http_client: reqwest::Client::new(),
            settings: GraphApiSettings {
                base_url: server.uri(),
                ..GraphApiSettings::default()
            },
        };
        let req = test::TestRequest::post()
            .uri(WEBHOOK_URL)
            .set_json(&message_body())
            .to_request();

        let (status, _) = call(
            repo_with(Some(test_store())),
            Box::new(conversations),
            None,
            req,
        )
        .await;

        assert_eq!(status, http::StatusCode::OK);
    }

    #[ntex::test]
    async fn test_receive_rejects_unsigned_body_when_secret_configured() {
        let req = test::TestRequest::post()
            .uri(WEBHOOK_URL)
            .set_json(&message_body())
            .to_request();

        let (status, body) = call(
            MockStoreRepo::new(),
            factory_never_called(),
            Some("app_secret".into()),
            req,
        )
        .await;

        assert_eq!(status, http::StatusCode::FORBIDDEN);
        assert_eq!(json_body(&body), json!({"error": "Invalid signature"}));
    }

    #[ntex::test]
    async fn test_receive_accepts_signed_body() {
        let payload = json!({"object": "whatsapp_business_account", "entry": []}).to_string();
        let signature = security::sign_payload(payload.as_bytes(), "app_secret").unwrap();
        let req = test::TestRequest::post()
            .uri(WEBHOOK_URL)
            .header("content-type", "application/json")
            .header(consts::SIGNATURE_HEADER, signature.as_str())
            .set_payload(payload)
            .to_request();

        let (status, _) = call(
            repo_with(Some(test_store())),
            factory_never_called(),
            Some("app_secret".into()),
            req,
        )
        .await;

        assert_eq!(status, http::StatusCode::OK);
    }
}
