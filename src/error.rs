use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use thiserror::Error;

use crate::handlers::shared::ApiResponse;
use crate::services::validation::ValidationRule;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{message}")]
    Validation {
        rule: ValidationRule,
        message: String,
    },

    #[error("Invalid transition: {0}")]
    InvalidTransition(String),

    #[error("Not allowed: {0}")]
    InvalidActor(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Insufficient balance: {requested} day(s) requested, {remaining} remaining")]
    InsufficientBalance { requested: f64, remaining: f64 },

    #[error("Approval step not found at level {0}")]
    StepNotFound(i32),

    #[error("Database error: {0}")]
    Database(sqlx::Error),

    #[error("Internal server error{}", .0.as_ref().map_or("".to_string(), |s| format!(": {}", s)))]
    Internal(Option<String>),
}

impl AppError {
    /// Short machine-readable kind, surfaced in the response envelope.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Validation { rule, .. } => rule.as_str(),
            AppError::InvalidTransition(_) => "invalid_transition",
            AppError::InvalidActor(_) => "invalid_actor",
            AppError::NotFound(_) => "not_found",
            AppError::InsufficientBalance { .. } => "insufficient_balance",
            AppError::StepNotFound(_) => "step_not_found",
            AppError::Database(_) => "database",
            AppError::Internal(_) => "internal",
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        AppError::Internal(Some(message.into()))
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation { .. } => StatusCode::BAD_REQUEST,
            AppError::InvalidTransition(_) => StatusCode::CONFLICT,
            AppError::InvalidActor(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InsufficientBalance { .. } => StatusCode::CONFLICT,
            AppError::StepNotFound(_) => StatusCode::CONFLICT,
            AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status_code = self.status_code();

        if status_code.is_server_error() {
            log::error!("Request failed with status {}: {}", status_code, self);
        }

        let response_body = ApiResponse::<()>::error(self.kind(), &self.to_string());

        HttpResponse::build(status_code).json(response_body)
    }
}

impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> Self {
        log::error!("Database error: {}", error);
        AppError::Database(error)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        // Repositories return anyhow::Result; unwrap the sqlx error when that is
        // what it actually holds so the status mapping stays accurate.
        if error.is::<sqlx::Error>() {
            match error.downcast::<sqlx::Error>() {
                Ok(sqlx_err) => return AppError::Database(sqlx_err),
                Err(original_error) => {
                    return AppError::Internal(Some(original_error.to_string()));
                }
            }
        }

        log::error!("Unhandled error: {}", error);
        AppError::Internal(Some(error.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::validation::ValidationRule;
    use pretty_assertions::assert_eq;

    #[test]
    fn validation_errors_surface_the_rule_as_kind() {
        let err = AppError::Validation {
            rule: ValidationRule::Balance,
            message: "Insufficient balance: 2 day(s) requested, 1 remaining".to_string(),
        };

        assert_eq!(err.kind(), "balance");
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn lifecycle_conflicts_map_to_conflict_status() {
        let transition = AppError::InvalidTransition("already approved".to_string());
        let balance = AppError::InsufficientBalance {
            requested: 3.0,
            remaining: 1.0,
        };

        assert_eq!(transition.status_code(), StatusCode::CONFLICT);
        assert_eq!(transition.kind(), "invalid_transition");
        assert_eq!(balance.status_code(), StatusCode::CONFLICT);
        assert_eq!(balance.kind(), "insufficient_balance");
    }

    #[test]
    fn actor_and_lookup_errors_keep_their_http_mapping() {
        assert_eq!(
            AppError::InvalidActor("not the owner".to_string()).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AppError::NotFound("request".to_string()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(AppError::StepNotFound(2).status_code(), StatusCode::CONFLICT);
    }

    #[test]
    fn anyhow_wrapped_sqlx_errors_become_database_errors() {
        let err: AppError = anyhow::Error::from(sqlx::Error::RowNotFound).into();
        assert_eq!(err.kind(), "database");
    }
}
