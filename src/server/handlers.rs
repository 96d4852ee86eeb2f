//! Request handlers.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use super::{AppState, SESSION_HEADER};
use crate::chat::ChatReply;
use crate::error::ChatError;

/// Body of `POST /api/chat`.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Option<String>,
}

/// Successful reply.
#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub reply: String,
}

/// Generic failure.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// The statement was rejected by the store.
#[derive(Debug, Serialize, Deserialize)]
pub struct ExecutionErrorResponse {
    pub error: String,
    pub details: String,
    pub code: String,
    pub sql: String,
    pub reply: String,
}

/// Failures reported before or outside statement execution.
#[derive(Debug)]
enum ApiError {
    NoMessage,
    InvalidJson,
    Internal,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::NoMessage => (
                StatusCode::BAD_REQUEST,
                "No message provided in request body",
            ),
            Self::InvalidJson => (StatusCode::BAD_REQUEST, "Invalid JSON in request body"),
            Self::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to process chat message",
            ),
        };
        (
            status,
            Json(ErrorResponse {
                error: message.to_string(),
            }),
        )
            .into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        debug!(error = %rejection, "Rejected chat request body");
        match rejection {
            // A body that parses but has the wrong shape, or no JSON content
            // type, carries no usable message.
            JsonRejection::JsonDataError(_) | JsonRejection::MissingJsonContentType(_) => {
                Self::NoMessage
            }
            _ => Self::InvalidJson,
        }
    }
}

/// `POST /api/chat`
pub async fn chat(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<ChatRequest>, JsonRejection>,
) -> Response {
    match handle_chat(state, headers, body).await {
        Ok(response) => response,
        Err(e) => e.into_response(),
    }
}

async fn handle_chat(
    state: AppState,
    headers: HeaderMap,
    body: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(request) = body?;
    let message = request
        .message
        .filter(|m| !m.trim().is_empty())
        .ok_or(ApiError::NoMessage)?;

    let session_id = headers
        .get(SESSION_HEADER)
        .and_then(|value| value.to_str().ok());
    debug!(message_len = message.len(), session_id, "Received chat message");

    match state.handle_message(session_id, &message).await {
        Ok(ChatReply::ExecutionFailed { error, reply }) => Ok((
            StatusCode::BAD_REQUEST,
            Json(ExecutionErrorResponse {
                error: "Failed to execute SQL query".to_string(),
                details: error.message,
                code: error.code,
                sql: error.sql,
                reply,
            }),
        )
            .into_response()),
        Ok(reply) => Ok(Json(ChatResponse {
            reply: reply.text().to_string(),
        })
        .into_response()),
        Err(ChatError::InvalidRequest(_)) => Err(ApiError::NoMessage),
        Err(e) => {
            error!(error = %e, category = e.category(), "Failed to process chat message");
            Err(ApiError::Internal)
        }
    }
}
