use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    // Business outcomes. Expected, surfaced to the caller with a stable
    // machine code so the front end can render a specific recovery action.
    #[error("Insufficient balance")]
    InsufficientBalance,

    #[error("Promo code not found")]
    PromoCodeNotFound,

    #[error("Promo code already redeemed")]
    PromoAlreadyRedeemed,

    #[error("Promo code expired")]
    PromoCodeExpired,

    #[error("Promo code has no uses left")]
    PromoCodeExhausted,

    // Infrastructure and request failures.
    #[error("Database error: {0}")]
    DatabaseError(#[from] sea_orm::DbErr),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Auth error: {0}")]
    AuthError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("External API error: {0}")]
    ExternalApiError(String),

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("Internal server error: {0}")]
    InternalError(String),

    #[error("HTTP request error: {0}")]
    ReqwestError(#[from] reqwest::Error),

    #[error("JSON serialization/deserialization error: {0}")]
    SerdeJsonError(#[from] serde_json::Error),
}

impl AppError {
    /// Stable machine-readable code rendered in the error envelope.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::InsufficientBalance => "INSUFFICIENT_BALANCE",
            AppError::PromoCodeNotFound => "CODE_NOT_FOUND",
            AppError::PromoAlreadyRedeemed => "ALREADY_REDEEMED",
            AppError::PromoCodeExpired => "CODE_EXPIRED",
            AppError::PromoCodeExhausted => "CODE_EXHAUSTED",
            AppError::DatabaseError(_) => "DATABASE_ERROR",
            AppError::ValidationError(_) => "VALIDATION_ERROR",
            AppError::AuthError(_) => "AUTH_ERROR",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::ExternalApiError(_) => "EXTERNAL_API_ERROR",
            AppError::ConfigError(_) => "CONFIG_ERROR",
            AppError::InternalError(_)
            | AppError::ReqwestError(_)
            | AppError::SerdeJsonError(_) => "INTERNAL_ERROR",
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> actix_web::http::StatusCode {
        use actix_web::http::StatusCode;
        match self {
            AppError::InsufficientBalance | AppError::PromoAlreadyRedeemed => StatusCode::CONFLICT,
            AppError::PromoCodeNotFound => StatusCode::NOT_FOUND,
            AppError::PromoCodeExpired | AppError::PromoCodeExhausted => StatusCode::GONE,
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::AuthError(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::ExternalApiError(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        use actix_web::http::StatusCode;

        let (status_code, message) = match self {
            // Business outcomes are not server errors; log at debug only.
            AppError::InsufficientBalance => {
                log::debug!("Deduct refused: insufficient balance");
                (StatusCode::CONFLICT, self.to_string())
            }
            AppError::PromoCodeNotFound => (StatusCode::NOT_FOUND, self.to_string()),
            AppError::PromoAlreadyRedeemed => (StatusCode::CONFLICT, self.to_string()),
            AppError::PromoCodeExpired | AppError::PromoCodeExhausted => {
                (StatusCode::GONE, self.to_string())
            }
            AppError::ValidationError(msg) => {
                log::warn!("Validation error: {msg}");
                (StatusCode::BAD_REQUEST, msg.clone())
            }
            AppError::AuthError(msg) => {
                log::warn!("Authentication error: {msg}");
                (StatusCode::UNAUTHORIZED, msg.clone())
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::ExternalApiError(msg) => {
                log::error!("External API error: {msg}");
                (StatusCode::BAD_GATEWAY, msg.clone())
            }
            AppError::DatabaseError(err) => {
                log::error!("Database error: {err}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Database error".to_string(),
                )
            }
            _ => {
                log::error!("Internal error: {self}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        HttpResponse::build(status_code).json(json!({
            "success": false,
            "error": {
                "code": self.code(),
                "message": message
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;

    #[test]
    fn business_outcomes_have_distinct_codes() {
        let outcomes = [
            AppError::InsufficientBalance,
            AppError::PromoCodeNotFound,
            AppError::PromoAlreadyRedeemed,
            AppError::PromoCodeExpired,
            AppError::PromoCodeExhausted,
        ];
        let mut codes: Vec<&str> = outcomes.iter().map(|e| e.code()).collect();
        codes.sort();
        codes.dedup();
        assert_eq!(codes.len(), outcomes.len());
    }

    #[test]
    fn already_redeemed_and_expired_map_to_different_statuses() {
        assert_eq!(
            AppError::PromoAlreadyRedeemed.status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(AppError::PromoCodeExpired.status_code(), StatusCode::GONE);
        assert_eq!(
            AppError::PromoCodeNotFound.status_code(),
            StatusCode::NOT_FOUND
        );
    }
}
