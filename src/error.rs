use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Unreachable backend, non-2xx status, or a body that isn't the expected JSON.
    Transport,
    /// Well-formed response whose body carries an `error` field.
    Application,
}

/// Uniform failure shape for every backend call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ApiError {
    pub kind: ErrorKind,
    pub message: String,
    /// Set when the backend answered a non-2xx status with a JSON body that
    /// had no `error` field.
    pub status: Option<u16>,
}

impl ApiError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Transport,
            message: message.into(),
            status: None,
        }
    }

    pub fn http_status(status: StatusCode) -> Self {
        Self {
            kind: ErrorKind::Transport,
            message: format!("HTTP {}", status),
            status: Some(status.as_u16()),
        }
    }

    pub fn application(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Application,
            message: message.into(),
            status: None,
        }
    }

    /// The backend's own wording, if the backend produced this error.
    pub fn backend_message(&self) -> Option<&str> {
        match self.kind {
            ErrorKind::Application => Some(self.message.as_str()),
            ErrorKind::Transport => None,
        }
    }

    /// False for failures where no usable reply came back at all: connection
    /// errors and bodies that could not be parsed.
    pub fn backend_responded(&self) -> bool {
        self.kind == ErrorKind::Application || self.status.is_some()
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::transport(format!("Connection error: {}", err))
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::transport(format!("Parse error: {}", err))
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
