use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use price_inference::InferenceError;
use thiserror::Error;

use crate::models::ApiResponse;

#[derive(Debug, Error)]
pub enum ApiError {
    /// The body parsed but a field is out of range, or the body did not parse.
    #[error("{0}")]
    Validation(String),

    #[error("inference failed: {0}")]
    Inference(#[from] InferenceError),

    #[error("blocking pool unavailable")]
    Blocking(#[from] actix_web::error::BlockingError),
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Inference(_) | ApiError::Blocking(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            ApiError::Validation(msg) => log::warn!("Rejected request: {}", msg),
            other => log::error!("{}", other),
        }
        HttpResponse::build(self.status_code()).json(ApiResponse::<()>::error(&self.to_string()))
    }
}
