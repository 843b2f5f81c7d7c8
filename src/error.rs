use actix_web::{HttpResponse, http::StatusCode};
use thiserror::Error;

use crate::dto::ErrorDto;

/// Request failures, split into user-correctable input problems and system
/// failures. Input errors come back as 400 so the operator can fix the
/// submission; everything else is a 500 and only resubmitting will help.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    InvalidInput(String),
    #[error("failed to load whisper model: {0}")]
    ModelLoad(String),
    #[error("transcription failed: {0}")]
    Inference(String),
    #[error("transcript output failed: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    pub fn is_user_error(&self) -> bool {
        matches!(self, AppError::InvalidInput(_))
    }
}

impl actix_web::ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        if self.is_user_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorDto {
            error: self.to_string(),
        })
    }
}
