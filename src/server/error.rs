use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::{backend::CompletionError, chat::ChatError};

/// Every handler returns `Result<T, ServerError>`. Internal detail is logged
/// and never sent to the caller.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("unauthorized")]
    Unauthorized,

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("completion endpoint rate limited")]
    UpstreamRateLimited,

    #[error("completion endpoint unavailable")]
    UpstreamUnavailable,

    #[error("completion failed: {0}")]
    UpstreamFailure(CompletionError),

    #[error("internal error: {0:?}")]
    Internal(eyre::Report),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ServerError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
            ServerError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
            ServerError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
            ServerError::UpstreamRateLimited => (
                StatusCode::TOO_MANY_REQUESTS,
                "Rate limit exceeded. Please try again in a moment.".to_string(),
            ),
            ServerError::UpstreamUnavailable => (
                StatusCode::PAYMENT_REQUIRED,
                "AI service temporarily unavailable. Please try again later.".to_string(),
            ),
            ServerError::UpstreamFailure(err) => {
                log::error!("Completion request failed: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to get a response. Please try again.".to_string(),
                )
            }
            ServerError::Internal(err) => {
                log::error!("Internal server error: {:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl From<ChatError> for ServerError {
    fn from(err: ChatError) -> Self {
        match err {
            ChatError::EmptyMessage | ChatError::MessageTooLarge(_) => {
                ServerError::BadRequest(err.to_string())
            }
            ChatError::ConversationNotFound => ServerError::NotFound(err.to_string()),
            ChatError::Completion(CompletionError::RateLimited) => ServerError::UpstreamRateLimited,
            ChatError::Completion(CompletionError::Unavailable) => ServerError::UpstreamUnavailable,
            ChatError::Completion(err) => ServerError::UpstreamFailure(err),
        }
    }
}

impl From<eyre::Report> for ServerError {
    fn from(err: eyre::Report) -> Self {
        ServerError::Internal(err)
    }
}
