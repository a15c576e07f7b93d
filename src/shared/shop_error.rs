// src/shared/shop_error.rs

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use thiserror::Error;
use tracing::error;

use super::shared_structs::GenericResponse;

/// SQLSTATE reported by PostgreSQL when a serializable transaction loses a race.
const SERIALIZATION_FAILURE: &str = "40001";
/// SQLSTATE reported by PostgreSQL when it breaks a deadlock.
const DEADLOCK_DETECTED: &str = "40P01";

/// Every failure a cart, invoice or catalog operation can report.
///
/// Each variant maps to a distinct status and `code` so clients can tell
/// "nothing to do" (`NotFound`, `EmptyCart`) from "try again" (`Conflict`)
/// from "fix your request" (`InvalidInput`).
#[derive(Debug, Error)]
pub enum ShopError {
    /// Product, cart line or invoice is absent, or belongs to someone else.
    #[error("{0}")]
    NotFound(String),

    /// Malformed quantity, missing fields, unparsable body or path.
    #[error("{0}")]
    InvalidInput(String),

    /// Checkout was attempted on a cart without lines.
    #[error("The cart is empty. Add items before generating an invoice.")]
    EmptyCart,

    /// A transactional write lost a race; the caller should retry.
    #[error("{0}")]
    Conflict(String),

    /// Missing or invalid caller identity.
    #[error("{0}")]
    Unauthorized(String),

    /// The server is wired up wrongly (missing state, bad setup).
    #[error("internal error: {0}")]
    Internal(String),

    /// Unexpected failure of the persistence layer.
    #[error("database error: {0}")]
    Database(#[source] sqlx::Error),
}

impl ShopError {
    pub fn code(&self) -> &'static str {
        match self {
            ShopError::NotFound(_) => "not_found",
            ShopError::InvalidInput(_) => "invalid_input",
            ShopError::EmptyCart => "empty_cart",
            ShopError::Conflict(_) => "conflict",
            ShopError::Unauthorized(_) => "unauthorized",
            ShopError::Internal(_) | ShopError::Database(_) => "internal_error",
        }
    }
}

impl From<sqlx::Error> for ShopError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            let code = db_err.code();
            if matches!(code.as_deref(), Some(SERIALIZATION_FAILURE) | Some(DEADLOCK_DETECTED)) {
                return ShopError::Conflict(
                    "Concurrent update of the same cart. Please retry.".to_string(),
                );
            }
        }
        ShopError::Database(err)
    }
}

impl ResponseError for ShopError {
    fn status_code(&self) -> StatusCode {
        match self {
            ShopError::NotFound(_) => StatusCode::NOT_FOUND,
            ShopError::InvalidInput(_) | ShopError::EmptyCart => StatusCode::BAD_REQUEST,
            ShopError::Conflict(_) => StatusCode::CONFLICT,
            ShopError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ShopError::Internal(_) | ShopError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        // Internal details never reach the client.
        let message = match self {
            ShopError::Database(err) => {
                error!(error = %err, "database failure while serving request");
                "Internal server error".to_string()
            }
            ShopError::Internal(detail) => {
                error!(detail = %detail, "internal failure while serving request");
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };
        HttpResponse::build(self.status_code()).json(GenericResponse::error(self.code(), message))
    }
}
