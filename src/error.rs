//! Error type shared by every backend
//!
//! Errors fall into three caller-visible kinds (see [`ErrorKind`]): the
//! backend could not be reached, the requested action is not supported, or
//! the backend answered with something we could not understand.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, RemoteError>;

/// Coarse classification callers can branch on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Server unreachable, non-2xx reply, or adb failure
    Connectivity,
    /// Unknown button, direction or orientation; raised before any I/O
    UnsupportedAction,
    /// Server reachable but the reply had an unexpected shape
    Protocol,
}

#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("cannot reach automation server at {url}: {detail}")]
    Connection { url: String, detail: String },

    #[error("{method} {url} returned HTTP {status}: {body}")]
    Status {
        method: String,
        url: String,
        status: u16,
        body: String,
    },

    #[error("adb {command} failed: {detail}")]
    Shell { command: String, detail: String },

    #[error("could not find {name}; checked:\n{checked}")]
    BinaryNotFound { name: String, checked: String },

    #[error("{0}")]
    Unsupported(String),

    #[error("unexpected response from {context}: {detail}")]
    Protocol { context: String, detail: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl RemoteError {
    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::Unsupported(message.into())
    }

    pub fn protocol(context: impl Into<String>, detail: impl ToString) -> Self {
        Self::Protocol {
            context: context.into(),
            detail: detail.to_string(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Connection { .. }
            | Self::Status { .. }
            | Self::Shell { .. }
            | Self::BinaryNotFound { .. }
            | Self::Io(_) => ErrorKind::Connectivity,
            Self::Unsupported(_) => ErrorKind::UnsupportedAction,
            Self::Protocol { .. } => ErrorKind::Protocol,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        let err = RemoteError::unsupported("Button \"POWER\" is not supported");
        assert_eq!(err.kind(), ErrorKind::UnsupportedAction);
        assert_eq!(err.to_string(), "Button \"POWER\" is not supported");

        let err = RemoteError::protocol("GET /status", "missing value");
        assert_eq!(err.kind(), ErrorKind::Protocol);

        let err = RemoteError::Status {
            method: "POST".into(),
            url: "http://localhost:8100/session".into(),
            status: 500,
            body: "boom".into(),
        };
        assert_eq!(err.kind(), ErrorKind::Connectivity);
        assert!(err.to_string().contains("HTTP 500"));
    }
}
