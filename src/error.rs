//! Error types for DualKV
//!
//! Provides a unified error type for server, client, and setup operations.
//! Malformed requests are not errors at this level; they are reported to the
//! peer as `ERROR:` responses (see [`crate::protocol::ParseError`]).

use thiserror::Error;

/// Result type alias using KvError
pub type Result<T> = std::result::Result<T, KvError>;

/// Unified error type for DualKV operations
#[derive(Debug, Error)]
pub enum KvError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Network Errors
    // -------------------------------------------------------------------------
    #[error("Network error: {0}")]
    Network(String),

    #[error("Connection closed by peer")]
    ConnectionClosed,

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),

    // -------------------------------------------------------------------------
    // Logging Errors
    // -------------------------------------------------------------------------
    #[error("Logging error: {0}")]
    Logging(String),
}
