use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::fmt;

use crate::price::PriceError;
use crate::trips::LedgerError;

/// Application error types
#[derive(Debug)]
pub enum AppError {
    /// Request failed validation
    InvalidInput(String),
    /// Trip entry does not exist
    NotFound(String),
    /// Gas price could not be resolved
    Price(PriceError),
    /// Database error
    DatabaseError(String),
    /// Internal server error
    InternalError(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            Self::NotFound(msg) => write!(f, "Not found: {}", msg),
            Self::Price(err) => write!(f, "{}", err),
            Self::DatabaseError(msg) => write!(f, "Database error: {}", msg),
            Self::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidInput(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Price(err) => match err {
                PriceError::UnsupportedRegion(_) => StatusCode::BAD_REQUEST,
                PriceError::UpstreamUnavailable(_) => StatusCode::BAD_GATEWAY,
                PriceError::UpstreamDataInvalid(_) => StatusCode::INTERNAL_SERVER_ERROR,
                PriceError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }

        let body = Json(json!({
            "error": {
                "message": self.to_string(),
                "type": error_type_name(&self),
            }
        }));

        (status, body).into_response()
    }
}

fn error_type_name(error: &AppError) -> &'static str {
    match error {
        AppError::InvalidInput(_) => "invalid_input",
        AppError::NotFound(_) => "not_found",
        AppError::Price(err) => err.kind(),
        AppError::DatabaseError(_) => "database_error",
        AppError::InternalError(_) => "internal_error",
    }
}

impl From<PriceError> for AppError {
    fn from(err: PriceError) -> Self {
        Self::Price(err)
    }
}

impl From<LedgerError> for AppError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::NotFound(id) => Self::NotFound(format!("Entry {} not found", id)),
            LedgerError::InvalidMonth(_) => Self::InvalidInput(err.to_string()),
            LedgerError::Corrupt(msg) => Self::InternalError(msg),
            LedgerError::Database(e) => Self::DatabaseError(e.to_string()),
        }
    }
}
