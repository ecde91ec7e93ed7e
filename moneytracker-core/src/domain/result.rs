//! Result and error types for the core library

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Message shown at the boundary for every authentication failure
pub const UNAUTHORIZED_MESSAGE: &str = "Invalid username or password";

/// Core library error type
///
/// `UnknownIdentity` and `BadSecret` stay distinct here so tests can tell
/// them apart; callers crossing the process boundary must go through
/// [`Error::kind`] and [`Error::public_message`], which merge them.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Username already exists: {0}")]
    DuplicateIdentity(String),

    #[error("Unknown identity")]
    UnknownIdentity,

    #[error("Secret does not match")]
    BadSecret,

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Hashing error: {0}")]
    Hashing(String),
}

impl Error {
    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a persistence error
    pub fn persistence(msg: impl Into<String>) -> Self {
        Self::Persistence(msg.into())
    }

    /// Classify the error into the signal a dispatcher should surface
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidInput(_) => ErrorKind::ClientError,
            Error::DuplicateIdentity(_) => ErrorKind::Conflict,
            Error::UnknownIdentity | Error::BadSecret => ErrorKind::Unauthorized,
            Error::Persistence(_) | Error::Hashing(_) => ErrorKind::ServerError,
        }
    }

    /// Message safe to show outside the process
    pub fn public_message(&self) -> String {
        match self.kind() {
            ErrorKind::ClientError => self.to_string(),
            ErrorKind::Conflict => "Username already exists".to_string(),
            ErrorKind::Unauthorized => UNAUTHORIZED_MESSAGE.to_string(),
            ErrorKind::ServerError => "Internal server error".to_string(),
        }
    }
}

impl From<duckdb::Error> for Error {
    fn from(e: duckdb::Error) -> Self {
        Self::Persistence(e.to_string())
    }
}

impl From<r2d2::Error> for Error {
    fn from(e: r2d2::Error) -> Self {
        Self::Persistence(format!("connection pool: {}", e))
    }
}

/// Externally visible failure classes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    ClientError,
    Conflict,
    Unauthorized,
    ServerError,
}

/// Core library result type
pub type Result<T> = std::result::Result<T, Error>;

/// Operation result with optional context (for JSON output)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationResult<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<HashMap<String, serde_json::Value>>,
}

impl<T> OperationResult<T> {
    /// Create a successful result
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            error_kind: None,
            context: None,
        }
    }

    /// Create a successful result with context
    pub fn ok_with_context(data: T, context: HashMap<String, serde_json::Value>) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            error_kind: None,
            context: Some(context),
        }
    }

    /// Create a failed result
    pub fn fail(error: impl Into<String>, kind: ErrorKind) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
            error_kind: Some(kind),
            context: None,
        }
    }
}

impl<T> From<Result<T>> for OperationResult<T> {
    fn from(result: Result<T>) -> Self {
        match result {
            Ok(data) => Self::ok(data),
            Err(e) => Self::fail(e.public_message(), e.kind()),
        }
    }
}
