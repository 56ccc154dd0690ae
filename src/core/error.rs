use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::modules::storage::StoreError;
use crate::shared::types::ApiResponse;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Storage(#[from] StoreError),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("Template error: {0}")]
    Template(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    /// A batch upload stopped at `part`; the `stored` parts before it remain persisted.
    #[error("batch aborted at part {part} ({filename}) after storing {stored} file(s): {source}")]
    BatchAborted {
        part: usize,
        filename: String,
        stored: usize,
        #[source]
        source: Box<AppError>,
    },
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Storage(StoreError::NotFound(_)) => StatusCode::BAD_REQUEST,
            AppError::Storage(StoreError::Unavailable(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Validation(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::Template(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::BatchAborted { source, .. } => source.status_code(),
        }
    }

    fn public_message(&self) -> String {
        match self {
            AppError::Storage(StoreError::NotFound(id)) => format!("File {} not found", id),
            AppError::Storage(StoreError::Unavailable(_)) => {
                "Storage is unavailable, try again later".to_string()
            }
            AppError::Validation(msg)
            | AppError::BadRequest(msg)
            | AppError::PayloadTooLarge(msg) => msg.clone(),
            AppError::Template(_) | AppError::Internal(_) => "Internal server error".to_string(),
            AppError::BatchAborted {
                part,
                filename,
                stored,
                source,
            } => format!(
                "Batch upload aborted at part {} ({}); {} file(s) stored before it: {}",
                part,
                filename,
                stored,
                source.public_message()
            ),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("{}: {:?}", status, self);
        }

        let message = self.public_message();
        let errors = match self {
            AppError::Validation(ref msg) => Some(vec![msg.clone()]),
            _ => None,
        };

        let body = Json(ApiResponse::<()>::error(Some(message.clone()), errors));

        let mut response = (status, body).into_response();
        response.extensions_mut().insert(ErrorMessage(message));
        response
    }
}

/// Public message of an [`AppError`], attached to its response so the HTML
/// error page can show it without parsing the JSON body.
#[derive(Debug, Clone)]
pub struct ErrorMessage(pub String);

pub type Result<T> = std::result::Result<T, AppError>;
