//!
//! # Custom Error Handling
//!
//! Two error types live here:
//!
//! - `AppError` is returned by request handlers. It implements
//!   `actix_web::error::ResponseError` so handlers can use `?` and still produce a
//!   JSON error body with the right status code. `From` conversions exist for the
//!   MongoDB driver, BSON serialization and `validator`. Token and password
//!   failures are mapped where they happen, in `auth::token` and `auth::password`.
//! - `StartupError` covers everything that can go wrong before the listener is
//!   bound: configuration, connecting to the database and its liveness check.
//!   The binary treats every variant as fatal.

use actix_web::{error::ResponseError, HttpResponse};
use mongodb::error::{ErrorKind, WriteFailure};
use serde_json::json;
use std::fmt;
use std::time::Duration;
use validator::ValidationErrors;

/// MongoDB server error code for a unique index violation.
const DUPLICATE_KEY_CODE: i32 = 11000;

/// Represents all possible errors that can occur while serving a request.
///
/// Each variant carries a message that ends up in the `error` field of the
/// JSON response body.
#[derive(Debug)]
pub enum AppError {
    /// Authentication failed or is missing (HTTP 401).
    Unauthorized(String),
    /// Malformed or invalid request (HTTP 400).
    BadRequest(String),
    /// Requested resource was not found (HTTP 404).
    NotFound(String),
    /// Unexpected server-side error (HTTP 500).
    InternalServerError(String),
    /// Error from the MongoDB driver (HTTP 500).
    /// The detail is logged; clients only see a generic message.
    DatabaseError(String),
    /// Input validation failed (HTTP 422 Unprocessable Entity).
    ValidationError(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            AppError::InternalServerError(msg) => write!(f, "Internal Server Error: {}", msg),
            AppError::DatabaseError(msg) => write!(f, "Database Error: {}", msg),
            AppError::ValidationError(msg) => write!(f, "Validation Error: {}", msg),
        }
    }
}

/// Converts `AppError` variants into `HttpResponse` objects.
impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        match self {
            AppError::Unauthorized(msg) => HttpResponse::Unauthorized().json(json!({
                "error": msg
            })),
            AppError::BadRequest(msg) => HttpResponse::BadRequest().json(json!({
                "error": msg
            })),
            AppError::NotFound(msg) => HttpResponse::NotFound().json(json!({
                "error": msg
            })),
            AppError::InternalServerError(msg) => {
                log::error!("Internal server error: {}", msg);
                HttpResponse::InternalServerError().json(json!({
                    "error": msg
                }))
            }
            AppError::DatabaseError(msg) => {
                log::error!("Database error: {}", msg);
                HttpResponse::InternalServerError().json(json!({
                    "error": "Database error"
                }))
            }
            AppError::ValidationError(msg) => HttpResponse::UnprocessableEntity().json(json!({
                "error": msg
            })),
        }
    }
}

/// Converts driver errors into `AppError`.
///
/// A unique index violation becomes `AppError::BadRequest`; everything else is
/// an `AppError::DatabaseError`.
impl From<mongodb::error::Error> for AppError {
    fn from(error: mongodb::error::Error) -> AppError {
        if is_duplicate_key(&error) {
            AppError::BadRequest("Resource already exists".into())
        } else {
            AppError::DatabaseError(error.to_string())
        }
    }
}

fn is_duplicate_key(error: &mongodb::error::Error) -> bool {
    matches!(
        error.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(write_error))
            if write_error.code == DUPLICATE_KEY_CODE
    )
}

impl From<bson::ser::Error> for AppError {
    fn from(error: bson::ser::Error) -> AppError {
        AppError::InternalServerError(format!("Failed to encode document: {}", error))
    }
}

/// Converts `validator::ValidationErrors` into `AppError::ValidationError`.
impl From<ValidationErrors> for AppError {
    fn from(error: ValidationErrors) -> AppError {
        AppError::ValidationError(error.to_string())
    }
}

/// Errors raised while bootstrapping the process. All of them are fatal.
#[derive(Debug)]
pub enum StartupError {
    /// A required setting is missing or a value does not parse.
    Config(String),
    /// The connection string was rejected or the client could not be built.
    Connect(String),
    /// The liveness check against the cluster failed.
    Ping(String),
    /// A bounded step did not finish inside its time budget.
    Timeout { stage: &'static str, after: Duration },
    /// Index creation failed.
    Index(String),
}

impl fmt::Display for StartupError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            StartupError::Config(msg) => write!(f, "Configuration error: {}", msg),
            StartupError::Connect(msg) => write!(f, "Failed to connect to MongoDB: {}", msg),
            StartupError::Ping(msg) => write!(f, "Failed to ping MongoDB: {}", msg),
            StartupError::Timeout { stage, after } => {
                write!(f, "MongoDB {} timed out after {:?}", stage, after)
            }
            StartupError::Index(msg) => write!(f, "Failed to create indexes: {}", msg),
        }
    }
}

impl std::error::Error for StartupError {}
