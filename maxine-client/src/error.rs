//! Failure causes of a discovery call

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// Registry reachable but answered with something other than 200
    #[error("registry returned status {status}")]
    NotFound { status: u16 },

    #[error("HTTP transport error: {0}")]
    Http(String),

    #[error("socket error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed response: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("connection closed before a response line was read")]
    EmptyResponse,

    #[error("could not resolve {0}")]
    NoAddress(String),

    #[error("client has been closed")]
    Closed,
}

impl DiscoveryError {
    /// True when the registry answered but had no node to hand out
    pub fn is_not_found(&self) -> bool {
        matches!(self, DiscoveryError::NotFound { .. })
    }
}

impl From<ureq::Error> for DiscoveryError {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::Status(status, _) => DiscoveryError::NotFound { status },
            ureq::Error::Transport(t) => DiscoveryError::Http(t.to_string()),
        }
    }
}
