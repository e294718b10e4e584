use actix_web::{
    error::JsonPayloadError, http::StatusCode, HttpResponse, ResponseError,
};
use rust_bert::RustBertError;

use crate::model::ErrorResponse;

/// Failures raised while turning text into vectors.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("model error: {0}")]
    Model(#[from] RustBertError),

    #[error("provider returned {actual} embeddings for {expected} inputs")]
    CountMismatch { expected: usize, actual: usize },

    #[error("inference task failed: {0}")]
    Task(String),
}

/// Everything the `/embed` endpoint can answer with besides a success.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("request body is not valid JSON: {0}")]
    InvalidJson(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("request body exceeds {limit} bytes")]
    PayloadTooLarge { limit: usize },

    #[error(transparent)]
    Provider(#[from] ProviderError),
}

impl ApiError {
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::InvalidJson(_) => "invalid_json",
            ApiError::InvalidRequest(_) => "invalid_request",
            ApiError::PayloadTooLarge { .. } => "payload_too_large",
            ApiError::Provider(_) => "provider_error",
        }
    }

    /// Maps actix's JSON extractor failures onto the client error variants.
    pub fn from_json_payload(err: JsonPayloadError, limit: usize) -> Self {
        match err {
            JsonPayloadError::Overflow { .. } | JsonPayloadError::OverflowKnownLength { .. } => {
                ApiError::PayloadTooLarge { limit }
            }
            JsonPayloadError::Deserialize(err) if err.is_data() => {
                ApiError::InvalidRequest(err.to_string())
            }
            JsonPayloadError::Deserialize(err) => ApiError::InvalidJson(err.to_string()),
            other => ApiError::InvalidRequest(other.to_string()),
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidJson(_) | ApiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Provider(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if self.status_code().is_server_error() {
            tracing::error!(error = %self, "embed request failed");
        }
        HttpResponse::build(self.status_code()).json(ErrorResponse {
            error: self.kind().to_owned(),
            message: self.to_string(),
        })
    }
}
