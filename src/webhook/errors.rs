use derive_more::{Display, Error};
use ntex::{http, web};
use serde_json::json;

/// Errors answered to the messaging platform as `{"error": "<message>"}`
#[derive(Debug, Display, Error)]
pub enum WebhookError {
    #[display("Store not found")]
    StoreNotFound,
    #[display("Verification failed")]
    VerificationFailed,
    #[display("Invalid signature")]
    InvalidSignature,
    #[display("Failed to initialize conversation manager")]
    ConversationManagerUnavailable,
    /// Detail is logged, never returned
    #[display("Internal server error")]
    InternalServerError(#[error(not(source))] String),
}

impl WebhookError {
    fn get_error_message(&self) -> String {
        match self {
            WebhookError::InternalServerError(msg) => format!("[InternalServerError] {msg}"),
            other => format!("[{other:?}]"),
        }
    }
}

impl web::error::WebResponseError for WebhookError {
    fn error_response(&self, _: &web::HttpRequest) -> web::HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            logfire::error!("{error}", error = self.get_error_message());
        } else {
            logfire::warn!("{error}", error = self.get_error_message());
        }

        web::HttpResponse::build(status).json(&json!({ "error": self.to_string() }))
    }

    fn status_code(&self) -> http::StatusCode {
        match *self {
            WebhookError::StoreNotFound => http::StatusCode::NOT_FOUND,
            WebhookError::VerificationFailed | WebhookError::InvalidSignature => {
                http::StatusCode::FORBIDDEN
            }
            WebhookError::ConversationManagerUnavailable
            | WebhookError::InternalServerError(_) => http::StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<anyhow::Error> for WebhookError {
    fn from(err: anyhow::Error) -> Self {
        WebhookError::InternalServerError(format!("{err:#}"))
    }
}
