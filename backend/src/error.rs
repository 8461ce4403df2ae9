//! Error type shared by every handler.
//!
//! Handlers return `Result<_, AppError>` from their inner function and turn the error
//! into a JSON `ErrorBody` at the edge with [`AppError::to_response`].

use actix_web::error::BlockingError;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use common::responses::ErrorBody;
use log::error;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    /// Missing or malformed request fields. Fixable by the caller.
    #[error("{0}")]
    InvalidPayload(String),

    /// Upload extension or export format the pipeline does not handle.
    #[error("{0}")]
    UnsupportedFormat(String),

    /// Referenced batch or record does not exist.
    #[error("{0} not found")]
    NotFound(String),

    #[error("database error: {0}")]
    Persistence(#[from] rusqlite::Error),

    #[error("{0}")]
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidPayload(_) | AppError::UnsupportedFormat(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Persistence(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn public_message(&self) -> String {
        match self {
            AppError::Persistence(_) => "Failed to access the data store".to_string(),
            AppError::Internal(_) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }

    /// Builds the JSON error response. `expose_details` only affects 5xx errors.
    pub fn to_response(&self, expose_details: bool) -> HttpResponse {
        let status = self.status();
        if status.is_server_error() {
            error!("{}", self);
        }
        let details = (expose_details && status.is_server_error()).then(|| self.to_string());
        HttpResponse::build(status).json(ErrorBody {
            error: self.public_message(),
            details,
        })
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        self.status()
    }

    fn error_response(&self) -> HttpResponse {
        self.to_response(false)
    }
}

impl From<BlockingError> for AppError {
    fn from(e: BlockingError) -> Self {
        AppError::Internal(format!("blocking task failed: {}", e))
    }
}

impl From<rust_xlsxwriter::XlsxError> for AppError {
    fn from(e: rust_xlsxwriter::XlsxError) -> Self {
        AppError::Internal(format!("spreadsheet writer: {}", e))
    }
}
