use thiserror::Error;

use crate::protocol::ServerErrorBody;

/// Every way a request issued by the client can fail.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    /// The request was dispatched but no response came back (network failure, timeout).
    #[error("transport error: {message}")]
    Transport { message: String },

    /// A response arrived with a non-success status.
    #[error("server error {status}")]
    Server { status: u16, body: ServerErrorBody },

    /// A response arrived but its payload did not have the expected shape.
    #[error("unexpected response shape: {0}")]
    DataShape(String),

    /// A field needed to build the request was absent; nothing was sent.
    #[error("missing {0}")]
    MissingResource(String),

    /// The request could not be constructed.
    #[error("request setup failed: {0}")]
    RequestSetup(String),
}

impl FetchError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    pub fn server(status: u16, raw_body: impl Into<String>) -> Self {
        Self::Server {
            status,
            body: ServerErrorBody::parse(raw_body),
        }
    }
}
