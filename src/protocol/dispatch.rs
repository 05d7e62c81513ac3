//! Dispatcher
//!
//! Applies parsed commands to the store and builds responses.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use crate::store::KvEngine;

use super::{parse_command, Command, Response, Status};

/// Executes requests against a shared store
///
/// Cloning is cheap; every clone talks to the same store.
pub struct Dispatcher<E: KvEngine> {
    engine: Arc<E>,
}

impl<E: KvEngine> Clone for Dispatcher<E> {
    fn clone(&self) -> Self {
        Self {
            engine: Arc::clone(&self.engine),
        }
    }
}

impl<E: KvEngine> Dispatcher<E> {
    /// Create a dispatcher over the given store
    pub fn new(engine: Arc<E>) -> Self {
        Self { engine }
    }

    /// The store requests are applied to
    pub fn engine(&self) -> &Arc<E> {
        &self.engine
    }

    /// Parse and execute one request line from `peer`
    ///
    /// Never fails: malformed input and store faults become `ERROR:` responses.
    pub fn handle_line(&self, line: &str, peer: &str) -> Response {
        let response = match parse_command(line) {
            Ok(command) => self.execute(command, peer),
            Err(e) => {
                tracing::warn!("Rejected request from {}: {}", peer, e);
                Response::from(e)
            }
        };

        if response.status() != Status::Error {
            tracing::debug!("Request {:?} from {} -> {}", line.trim(), peer, response);
        }
        response
    }

    /// Execute a validated command and return a response
    ///
    /// A panic raised while touching the store is contained here so that
    /// the transport loop keeps serving.
    pub fn execute(&self, command: Command, peer: &str) -> Response {
        let command_type = command.command_type();
        match panic::catch_unwind(AssertUnwindSafe(|| self.apply(command))) {
            Ok(response) => response,
            Err(cause) => {
                let reason = cause
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| cause.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());
                tracing::error!(
                    "Error handling {} request from {}: {}",
                    command_type,
                    peer,
                    reason
                );
                Response::internal_failure()
            }
        }
    }

    fn apply(&self, command: Command) -> Response {
        match command {
            Command::Put { key, value } => {
                // Overwrites are still reported as a plain success
                let _previous = self.engine.put(key, value);
                Response::PutSuccess
            }
            Command::Get { key } => match self.engine.get(&key) {
                Some(value) => Response::GetSuccess(value),
                None => Response::GetFailure,
            },
            Command::Delete { key } => match self.engine.delete(&key) {
                Some(_) => Response::DeleteSuccess,
                None => Response::DeleteFailure,
            },
        }
    }
}
