use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum AppError {
    DatabaseError(String),
    Duplicate(String),
    NotFound(String),
    InvalidRequest(String),
    Unauthorized(String),
    Forbidden(String),
    Unavailable(String),
    Internal(String),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// Message exposed to the client. Backend details stay in the log.
    pub fn public_message(&self) -> String {
        match self {
            AppError::DatabaseError(_) | AppError::Internal(_) => {
                "Internal server error".to_string()
            }
            AppError::Duplicate(msg)
            | AppError::NotFound(msg)
            | AppError::InvalidRequest(msg)
            | AppError::Unauthorized(msg)
            | AppError::Forbidden(msg)
            | AppError::Unavailable(msg) => msg.clone(),
        }
    }

    /// Replaces the message of a `Duplicate` error, leaves other variants untouched.
    pub fn on_duplicate(self, message: impl FnOnce() -> String) -> Self {
        match self {
            AppError::Duplicate(_) => AppError::Duplicate(message()),
            other => other,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::DatabaseError(msg) => write!(f, "Database error: {}", msg),
            AppError::Duplicate(msg) => write!(f, "Duplicate: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::InvalidRequest(msg) => write!(f, "Invalid request: {}", msg),
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            AppError::Unavailable(msg) => write!(f, "Service unavailable: {}", msg),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidRequest(_) | AppError::Duplicate(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::DatabaseError(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        if self.status_code().is_server_error() {
            log::error!("❌ {}", self);
        }

        HttpResponse::build(self.status_code()).json(serde_json::json!({
            "success": false,
            "message": self.public_message()
        }))
    }
}

impl From<mongodb::error::Error> for AppError {
    fn from(err: mongodb::error::Error) -> Self {
        AppError::DatabaseError(err.to_string())
    }
}

impl From<mongodb::bson::ser::Error> for AppError {
    fn from(err: mongodb::bson::ser::Error) -> Self {
        AppError::Internal(format!("Failed to serialize document: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_variants_to_status_codes() {
        assert_eq!(AppError::Duplicate("x".into()).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::NotFound("x".into()).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::Unauthorized("x".into()).status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            AppError::DatabaseError("x".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn hides_backend_details_from_clients() {
        let err = AppError::DatabaseError("connection refused at 10.0.0.3".into());
        assert_eq!(err.public_message(), "Internal server error");
    }

    #[test]
    fn on_duplicate_only_rewrites_duplicates() {
        let dup = AppError::Duplicate("E11000".into()).on_duplicate(|| "Email taken".into());
        assert_eq!(dup, AppError::Duplicate("Email taken".into()));

        let other = AppError::NotFound("user".into()).on_duplicate(|| "Email taken".into());
        assert_eq!(other, AppError::NotFound("user".into()));
    }
}
