use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CustomError {
    #[error("{0}")]
    ValidationError(String),

    #[error("{0}")]
    BadRequestError(String),

    #[error("{0}")]
    DeliveryError(String),

    #[error("{0}")]
    PersistenceError(String),

    #[error("{0}")]
    NotFoundError(String),
}

impl CustomError {
    fn error_code(&self) -> &'static str {
        match *self {
            CustomError::ValidationError(..) => "VALIDATION_ERROR",
            CustomError::BadRequestError(..) => "BAD_REQUEST_ERROR",
            CustomError::DeliveryError(..) => "DELIVERY_ERROR",
            CustomError::PersistenceError(..) => "PERSISTENCE_ERROR",
            CustomError::NotFoundError(..) => "NOT_FOUND_ERROR",
        }
    }

    /// Plain-text rendering, used by the endpoints that answer with text bodies
    pub fn text_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .content_type("text/plain; charset=utf-8")
            .body(self.to_string())
    }
}

/// Name reported in every error envelope
pub fn service_name() -> String {
    std::env::var("SERVICE_NAME").unwrap_or_else(|_| "Unknown".to_string())
}

impl ResponseError for CustomError {
    fn status_code(&self) -> StatusCode {
        match *self {
            CustomError::ValidationError(..) => StatusCode::BAD_REQUEST,
            CustomError::BadRequestError(..) => StatusCode::BAD_REQUEST,
            CustomError::DeliveryError(..) => StatusCode::INTERNAL_SERVER_ERROR,
            CustomError::PersistenceError(..) => StatusCode::INTERNAL_SERVER_ERROR,
            CustomError::NotFoundError(..) => StatusCode::NOT_FOUND,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let error_message = json!({
            "success": false,
            "message": self.to_string(),
            "httpStatusCode": self.status_code().as_u16(),
            "error": self.error_code(),
            "service": service_name(),
        });

        HttpResponse::build(self.status_code()).json(error_message)
    }
}
