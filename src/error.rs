use std::collections::BTreeMap;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Two 400 shapes exist on purpose: request-shape problems come back as a
/// per-field map, business-rule rejections as a single `error` message.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Fields(BTreeMap<String, Vec<String>>),
    Unauthorized(String),
    NotFound(String),
    Internal(String),
}

impl ApiError {
    fn error_body(message: String) -> Json<ErrorResponse> {
        Json(ErrorResponse { error: message })
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(e: sqlx::Error) -> Self {
        ApiError::Internal(format!("db error: {e}"))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, ApiError::error_body(msg)).into_response()
            }
            ApiError::Fields(map) => (StatusCode::BAD_REQUEST, Json(map)).into_response(),
            ApiError::Unauthorized(msg) => {
                (StatusCode::UNAUTHORIZED, ApiError::error_body(msg)).into_response()
            }
            ApiError::NotFound(msg) => {
                (StatusCode::NOT_FOUND, ApiError::error_body(msg)).into_response()
            }
            ApiError::Internal(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, ApiError::error_body(msg)).into_response()
            }
        }
    }
}
