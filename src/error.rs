//!
//! # Custom Error Handling
//!
//! This module defines the custom error type `AppError` used throughout the application.
//! Every layer (credentials, identity gate, stores, services, routes) returns it, so a
//! failure travels to the HTTP boundary through `?` without being reshaped.
//!
//! `AppError` implements `actix_web::error::ResponseError` to convert application errors
//! into HTTP responses with a `{"error": "..."}` JSON body. Server-side failures are
//! logged in full and reported to the client with an opaque message.

use actix_web::{http::header, http::StatusCode, HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;
use validator::ValidationErrors;

/// Message returned for every rejected bearer credential, whatever the cause.
pub const UNAUTHENTICATED_MESSAGE: &str = "Could not validate credentials";

/// Message returned when a task id does not exist or belongs to someone else.
pub const TASK_NOT_FOUND_MESSAGE: &str = "Task not found";

/// Represents all possible errors that can occur within the application.
#[derive(Debug, Error)]
pub enum AppError {
    /// The caller's bearer credential is missing, malformed, expired, or names an
    /// unknown user (HTTP 401). The detail is logged, never returned.
    #[error("Unauthenticated: {0}")]
    Unauthorized(String),
    /// Email/password pair did not match an account (HTTP 401).
    #[error("Incorrect email or password")]
    InvalidCredentials,
    /// The account exists but its active flag is false (HTTP 403).
    #[error("Account is disabled")]
    AccountDisabled,
    /// Malformed request that is not a field validation failure (HTTP 400).
    #[error("Bad Request: {0}")]
    BadRequest(String),
    /// The task does not exist or is not owned by the caller (HTTP 404).
    /// Both cases are deliberately indistinguishable.
    #[error("Task not found")]
    NotFoundOrForbidden,
    /// The resource already exists, e.g. a duplicate email at registration (HTTP 409).
    #[error("Conflict: {0}")]
    Conflict(String),
    /// Input failed validation (HTTP 422).
    #[error("Validation Error: {0}")]
    ValidationError(String),
    /// Database failure (HTTP 500).
    #[error("Database Error: {0}")]
    DatabaseError(String),
    /// Any other unexpected server-side failure (HTTP 500).
    #[error("Internal Server Error: {0}")]
    InternalServerError(String),
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthorized(_) | AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AppError::AccountDisabled => StatusCode::FORBIDDEN,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFoundOrForbidden => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::ValidationError(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::DatabaseError(_) | AppError::InternalServerError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let mut builder = HttpResponse::build(self.status_code());
        let message = match self {
            AppError::Unauthorized(detail) => {
                log::warn!("rejected credential: {}", detail);
                builder.insert_header((header::WWW_AUTHENTICATE, "Bearer"));
                UNAUTHENTICATED_MESSAGE.to_string()
            }
            AppError::InvalidCredentials => {
                builder.insert_header((header::WWW_AUTHENTICATE, "Bearer"));
                self.to_string()
            }
            AppError::AccountDisabled | AppError::NotFoundOrForbidden => self.to_string(),
            AppError::BadRequest(msg) | AppError::Conflict(msg) | AppError::ValidationError(msg) => {
                msg.clone()
            }
            // Storage and internal failures never leak their detail to the client.
            AppError::DatabaseError(_) | AppError::InternalServerError(_) => {
                log::error!("{}", self);
                "Internal server error".to_string()
            }
        };
        builder.json(json!({ "error": message }))
    }
}

/// Unique constraint on `users.email`, named in the initial migration.
pub const USERS_EMAIL_CONSTRAINT: &str = "users_email_key";

/// Converts `sqlx::Error` into `AppError`.
///
/// A duplicate email becomes `Conflict`; everything else, other unique
/// violations included, is an opaque `DatabaseError`.
impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> AppError {
        match &error {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                unique_violation(db_err.constraint(), error.to_string())
            }
            _ => AppError::DatabaseError(error.to_string()),
        }
    }
}

fn unique_violation(constraint: Option<&str>, detail: String) -> AppError {
    match constraint {
        Some(USERS_EMAIL_CONSTRAINT) => AppError::Conflict("Email already registered".into()),
        _ => AppError::DatabaseError(detail),
    }
}

impl From<sqlx::migrate::MigrateError> for AppError {
    fn from(error: sqlx::migrate::MigrateError) -> AppError {
        AppError::DatabaseError(error.to_string())
    }
}

/// Converts `validator::ValidationErrors` into `AppError::ValidationError`.
///
/// The detailed validation messages are preserved.
impl From<ValidationErrors> for AppError {
    fn from(error: ValidationErrors) -> AppError {
        AppError::ValidationError(error.to_string())
    }
}

/// Converts `jsonwebtoken::errors::Error` into `AppError::Unauthorized`.
impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(error: jsonwebtoken::errors::Error) -> AppError {
        AppError::Unauthorized(format!("Invalid token: {:?}", error.kind()))
    }
}

/// Converts `bcrypt::BcryptError` into `AppError::InternalServerError`.
impl From<bcrypt::BcryptError> for AppError {
    fn from(error: bcrypt::BcryptError) -> AppError {
        AppError::InternalServerError(format!("Password hashing failed: {}", error))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    async fn body_json(error: AppError) -> serde_json::Value {
        let body = to_bytes(error.error_response().into_body()).await.unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[test]
    fn test_error_responses() {
        assert_eq!(AppError::Unauthorized("Invalid token".into()).error_response().status(), 401);
        assert_eq!(AppError::InvalidCredentials.error_response().status(), 401);
        assert_eq!(AppError::AccountDisabled.error_response().status(), 403);
        assert_eq!(AppError::BadRequest("Invalid input".into()).error_response().status(), 400);
        assert_eq!(AppError::NotFoundOrForbidden.error_response().status(), 404);
        assert_eq!(AppError::Conflict("dup".into()).error_response().status(), 409);
        assert_eq!(AppError::ValidationError("bad".into()).error_response().status(), 422);
        assert_eq!(AppError::DatabaseError("boom".into()).error_response().status(), 500);
        assert_eq!(
            AppError::InternalServerError("Server error".into()).error_response().status(),
            500
        );
    }

    #[actix_rt::test]
    async fn test_unauthorized_body_is_uniform() {
        let expired = body_json(AppError::Unauthorized("ExpiredSignature".into())).await;
        let missing = body_json(AppError::Unauthorized("Missing token".into())).await;
        assert_eq!(expired, missing);
        assert_eq!(expired["error"], UNAUTHENTICATED_MESSAGE);

        let response = AppError::Unauthorized("x".into()).error_response();
        assert_eq!(
            response.headers().get(header::WWW_AUTHENTICATE).unwrap(),
            "Bearer"
        );
    }

    #[test]
    fn test_only_the_email_constraint_is_a_conflict() {
        assert!(matches!(
            unique_violation(Some(USERS_EMAIL_CONSTRAINT), "dup".into()),
            AppError::Conflict(message) if message == "Email already registered"
        ));
        assert!(matches!(
            unique_violation(Some("todos_pkey"), "dup".into()),
            AppError::DatabaseError(detail) if detail == "dup"
        ));
        assert!(matches!(
            unique_violation(None, "dup".into()),
            AppError::DatabaseError(_)
        ));
        assert!(matches!(
            AppError::from(sqlx::Error::RowNotFound),
            AppError::DatabaseError(_)
        ));
    }

    #[actix_rt::test]
    async fn test_internal_errors_are_opaque() {
        let json = body_json(AppError::DatabaseError("relation \"todos\" does not exist".into())).await;
        assert_eq!(json["error"], "Internal server error");
    }

    #[actix_rt::test]
    async fn test_not_found_body() {
        let json = body_json(AppError::NotFoundOrForbidden).await;
        assert_eq!(json["error"], TASK_NOT_FOUND_MESSAGE);
    }
}
