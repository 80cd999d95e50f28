use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

use crate::store::StoreError;
use crate::structs::api::MessageBody;

pub const CONTACT_NOT_FOUND_MESSAGE: &str = "Contact not found";
pub const CONTACT_ID_REQUIRED_MESSAGE: &str = "Contact ID is required";

/// Failure of an API handler. Every variant renders as `{"message": ...}`;
/// store details are logged and never sent to the client.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("{}", CONTACT_NOT_FOUND_MESSAGE)]
    NotFound,

    #[error("{message}")]
    Store {
        message: &'static str,
        #[source]
        source: StoreError,
    },
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::Validation(message.into())
    }

    /// Adapter for `map_err` that attaches the client-facing message.
    pub fn store(message: &'static str) -> impl FnOnce(StoreError) -> ApiError {
        move |source| ApiError::Store { message, source }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Store { message, source } => {
                tracing::error!(error = %source, "{}", message);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (status, Json(MessageBody::new(self.to_string()))).into_response()
    }
}
