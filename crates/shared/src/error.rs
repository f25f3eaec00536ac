use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const CONNECTION_FAILED_MESSAGE: &str =
    "Failed to connect to the server. Make sure the backend is running.";
pub const INVALID_CSV_MESSAGE: &str = "Please select a valid CSV file";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Bad local input; nothing was sent.
    Validation,
    /// Transport failure before a response was received.
    Connection,
    /// The service answered but reported failure.
    Service,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ClientError {
    pub kind: ErrorKind,
    pub message: String,
}

impl ClientError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    pub fn connection() -> Self {
        Self::new(ErrorKind::Connection, CONNECTION_FAILED_MESSAGE)
    }

    pub fn service(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Service, message)
    }

    pub fn invalid_csv() -> Self {
        Self::validation(INVALID_CSV_MESSAGE)
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

pub type ApiResult<T> = Result<T, ClientError>;
