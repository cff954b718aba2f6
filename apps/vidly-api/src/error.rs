//! Error types for HTTP handlers.
//!
//! [`ApiError`] is what a client sees: a status code and a JSON body
//! `{ "code": "...", "message": "..." }`. Every lower-layer error converts
//! into it with `?`.
//!
//! ## Mapping
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  ValidationError                      → 400 VALIDATION_ERROR           │
//! │  RentalError::InvalidReference        → 400 "Invalid {entity}."        │
//! │  RentalError::OutOfStock              → 400 "Movie not in stock."      │
//! │  RentalError::NotFound                → 400 (message set by handler)   │
//! │  RentalError::DuplicateRental         → 400                            │
//! │  RentalError::TransactionFailed       → 500, cause logged only         │
//! │  ReconcileError (either variant)      → 500, phase in message          │
//! │  AccountError::EmailTaken             → 400 "User already registered." │
//! │  DbError::NotFound                    → 404                            │
//! │  DbError constraint violations        → 400                            │
//! │  any other DbError                    → 500                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;

use vidly_core::ValidationError;
use vidly_db::{AccountError, DbError, ReconcileError, RentalError};

/// Body message for any failed unit of work. The cause is only logged.
const TRANSACTION_FAILED: &str = "System Error, Transaction.";

/// Application error type for handlers.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        ApiError {
            status,
            code,
            message: message.into(),
        }
    }

    /// 400 Bad Request.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "BAD_REQUEST", message)
    }

    /// 401 Unauthorized.
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", message)
    }

    /// 403 Forbidden.
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, "FORBIDDEN", message)
    }

    /// 404 Not Found.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "NOT_FOUND", message)
    }

    /// 404 for a path id that is not a UUID.
    pub fn invalid_id() -> Self {
        Self::new(StatusCode::NOT_FOUND, "INVALID_ID", "Invalid ID.")
    }

    /// 404 using the "{entity} with the given ID was not found." wording.
    pub fn missing(entity: &str) -> Self {
        Self::not_found(format!("The {entity} with the given ID was not found."))
    }

    /// 500 Internal Server Error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_SERVER_ERROR", message)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn code(&self) -> &'static str {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

/// Error response body (JSON).
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(
                status = %self.status,
                code = %self.code,
                message = %self.message,
                "Internal server error"
            );
        }

        let body = ErrorResponse {
            code: self.code.to_string(),
            message: self.message,
        };

        (self.status, Json(body)).into_response()
    }
}

// =============================================================================
// Conversions
// =============================================================================

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", err.to_string())
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, .. } => ApiError::missing(&entity.to_lowercase()),
            DbError::UniqueViolation { .. }
            | DbError::ForeignKeyViolation { .. }
            | DbError::CheckViolation { .. } => Self::new(StatusCode::BAD_REQUEST, "CONSTRAINT_VIOLATION", err.to_string()),
            other => {
                tracing::error!(error = %other, "Database error");
                ApiError::internal("Internal server error.")
            }
        }
    }
}

impl From<RentalError> for ApiError {
    fn from(err: RentalError) -> Self {
        match err {
            RentalError::InvalidReference { entity, .. } => {
                Self::new(StatusCode::BAD_REQUEST, "INVALID_REFERENCE", format!("Invalid {entity}."))
            }
            RentalError::OutOfStock { .. } => Self::new(StatusCode::BAD_REQUEST, "OUT_OF_STOCK", "Movie not in stock."),
            RentalError::NotFound(_) => Self::new(StatusCode::BAD_REQUEST, "RENTAL_NOT_FOUND", err.to_string()),
            RentalError::DuplicateRental { .. } => {
                Self::new(StatusCode::BAD_REQUEST, "DUPLICATE_RENTAL", "You already rent this movie.")
            }
            RentalError::TransactionFailed(reason) => {
                tracing::error!(reason = %reason, "Rental transaction failed");
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "TRANSACTION_FAILED", TRANSACTION_FAILED)
            }
        }
    }
}

impl From<ReconcileError> for ApiError {
    fn from(err: ReconcileError) -> Self {
        match err {
            ReconcileError::PartialFailure { .. } => {
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "PARTIAL_FAILURE", err.to_string())
            }
            ReconcileError::TransactionFailed { phase, reason } => {
                tracing::error!(phase = %phase, reason = %reason, "Reconcile transaction failed");
                Self::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "TRANSACTION_FAILED",
                    format!("{TRANSACTION_FAILED} Phase: {phase}."),
                )
            }
        }
    }
}

impl From<AccountError> for ApiError {
    fn from(err: AccountError) -> Self {
        match err {
            AccountError::EmailTaken(_) => ApiError::bad_request("User already registered."),
            AccountError::Hashing(reason) => {
                tracing::error!(reason = %reason, "Password hashing failed");
                ApiError::internal(TRANSACTION_FAILED)
            }
            AccountError::Db(db) => db.into(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
