// Client-side error taxonomy shared by the gateway, session store and CLI
use thiserror::Error;

/// Every fallible client operation resolves to one of these classes.
///
/// `Validation` never reaches the network; `Auth` means the backend rejected
/// the credential and the session has already been cleared by the time the
/// caller sees the error; `Request` covers every other backend or transport
/// failure and leaves both session and task cache intact.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("{0}")]
    Validation(String),

    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("request failed: {message}")]
    Request {
        status: Option<u16>,
        message: String,
    },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("session storage error: {0}")]
    Storage(String),
}

impl ClientError {
    pub fn validation(message: impl Into<String>) -> Self {
        ClientError::Validation(message.into())
    }

    pub fn request(status: Option<u16>, message: impl Into<String>) -> Self {
        ClientError::Request {
            status,
            message: message.into(),
        }
    }

    /// HTTP status associated with the failure, when one exists.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Auth(_) => Some(401),
            ClientError::Request { status, .. } => *status,
            _ => None,
        }
    }

    pub fn is_auth(&self) -> bool {
        matches!(self, ClientError::Auth(_))
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, ClientError::Validation(_))
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        ClientError::Request {
            status: err.status().map(|s| s.as_u16()),
            message: err.to_string(),
        }
    }
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        ClientError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Storage(err.to_string())
    }
}

pub type ClientResult<T> = Result<T, ClientError>;
