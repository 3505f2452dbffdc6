//! API-wide error type. Every handler returns `Result<_, AppError>`; the
//! `IntoResponse` impl is the single place that maps an error kind onto an
//! HTTP status and the `{"error":{"message","type"}}` body shape.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

#[derive(Debug)]
pub enum AppError {
    NotFound(String),
    Validation(String),
    Conflict(String),
    ConnectionFailure(String),
    Internal(String),
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppError::NotFound(m) => write!(f, "not found: {m}"),
            AppError::Validation(m) => write!(f, "validation error: {m}"),
            AppError::Conflict(m) => write!(f, "conflict: {m}"),
            AppError::ConnectionFailure(m) => write!(f, "connection failure: {m}"),
            AppError::Internal(m) => write!(f, "internal error: {m}"),
        }
    }
}

impl std::error::Error for AppError {}

impl From<anyhow::Error> for AppError {
    fn from(e: anyhow::Error) -> Self {
        AppError::Internal(e.to_string())
    }
}

impl From<dq_connectors::ConnectorError> for AppError {
    fn from(e: dq_connectors::ConnectorError) -> Self {
        AppError::ConnectionFailure(e.to_string())
    }
}

impl From<dq_checks::ExecutionError> for AppError {
    fn from(e: dq_checks::ExecutionError) -> Self {
        AppError::Internal(e.to_string())
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    message: String,
    #[serde(rename = "type")]
    kind: &'static str,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, kind, message) = match &self {
            AppError::NotFound(m) => (StatusCode::NOT_FOUND, "not_found", m.clone()),
            AppError::Validation(m) => (StatusCode::UNPROCESSABLE_ENTITY, "validation", m.clone()),
            AppError::Conflict(m) => (StatusCode::CONFLICT, "conflict", m.clone()),
            AppError::ConnectionFailure(m) => (StatusCode::BAD_GATEWAY, "connection_failure", m.clone()),
            AppError::Internal(m) => (StatusCode::INTERNAL_SERVER_ERROR, "internal", m.clone()),
        };
        (status, Json(ErrorBody { error: ErrorDetail { message, kind } })).into_response()
    }
}
