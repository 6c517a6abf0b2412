//! Session errors.

use thiserror::Error;

pub type SessionResult<T> = Result<T, SessionError>;

#[derive(Debug, Error)]
pub enum SessionError {
    /// Rejected before any I/O (null or invalid wallet name).
    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    /// Filesystem failure, passed through untouched.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("wallet backend: {0}")]
    Backend(String),

    #[error("auth: {0}")]
    Auth(String),

    #[error("runtime: {0}")]
    Runtime(String),
}

impl SessionError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidOperation(msg.into())
    }

    pub fn is_invalid_operation(&self) -> bool {
        matches!(self, Self::InvalidOperation(_))
    }
}
