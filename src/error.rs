//! Error types shared across the request, routing and dispatch layers

use thiserror::Error;

/// A request that cannot be turned into a [`crate::http::Request`]
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RequestError {
    #[error("invalid request: unsupported method {0:?}")]
    InvalidMethod(String),

    #[error("invalid request: body exceeds {limit} bytes")]
    BodyTooLarge { limit: u64 },

    #[error("invalid request: failed to read body: {0}")]
    Body(String),
}

impl RequestError {
    /// Status code to answer with when this error reaches the dispatcher
    ///
    /// `malformed_status` is the configured code for structurally invalid
    /// requests.
    pub const fn status_code(&self, malformed_status: u16) -> u16 {
        match self {
            Self::BodyTooLarge { .. } => 413,
            Self::InvalidMethod(_) | Self::Body(_) => malformed_status,
        }
    }
}

/// Failure while building a route table or reversing a route
#[derive(Debug, Error)]
pub enum RouteError {
    #[error("invalid route pattern {pattern:?}: {source}")]
    InvalidRegex {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("invalid placeholder {placeholder:?} in route {pattern:?}")]
    InvalidPlaceholder { pattern: String, placeholder: String },

    #[error("cannot reverse route {pattern:?}: {reason}")]
    Reverse { pattern: String, reason: String },
}
