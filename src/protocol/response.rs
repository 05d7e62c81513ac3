//! Response definitions
//!
//! Represents responses to clients. The `Display` output of a [`Response`]
//! is exactly what goes on the wire, minus the stream transport's newline.

use std::fmt;

use super::ParseError;

/// Message sent when a datagram reply would not fit in one packet
pub const RESPONSE_TOO_LARGE: &str = "Response too large";

/// Message sent when the store faulted while serving a request
pub const INTERNAL_FAILURE: &str = "Exception occurred while processing request";

/// Response outcome classes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// The command took effect or found its key
    Success,

    /// GET or DELETE on an absent key
    Failure,

    /// Malformed request, oversize reply, or internal fault
    Error,
}

/// A response to send to client
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    PutSuccess,
    GetSuccess(String),
    GetFailure,
    DeleteSuccess,
    DeleteFailure,
    Error(String),
}

impl Response {
    /// Create an ERROR response with the given message
    pub fn error(message: impl Into<String>) -> Self {
        Response::Error(message.into())
    }

    /// ERROR response replacing a datagram reply that does not fit
    pub fn too_large() -> Self {
        Self::error(RESPONSE_TOO_LARGE)
    }

    /// ERROR response for a fault caught at the dispatch boundary
    pub fn internal_failure() -> Self {
        Self::error(INTERNAL_FAILURE)
    }

    /// Get the outcome class
    pub fn status(&self) -> Status {
        match self {
            Response::PutSuccess | Response::GetSuccess(_) | Response::DeleteSuccess => {
                Status::Success
            }
            Response::GetFailure | Response::DeleteFailure => Status::Failure,
            Response::Error(_) => Status::Error,
        }
    }

    /// Render the wire text
    pub fn encode(&self) -> String {
        self.to_string()
    }
}

impl From<ParseError> for Response {
    fn from(err: ParseError) -> Self {
        Response::Error(err.to_string())
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Response::PutSuccess => f.write_str("PUT_SUCCESS"),
            Response::GetSuccess(value) => write!(f, "GET_SUCCESS: {}", value),
            Response::GetFailure => f.write_str("GET_FAILURE: Key not found"),
            Response::DeleteSuccess => f.write_str("DELETE_SUCCESS"),
            Response::DeleteFailure => f.write_str("DELETE_FAILURE: Key not found"),
            Response::Error(message) => write!(f, "ERROR: {}", message),
        }
    }
}
