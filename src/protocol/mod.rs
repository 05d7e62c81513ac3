//! Protocol Module
//!
//! Defines the text protocol shared by both transports.
//!
//! ## Request Format
//! ```text
//! COMMAND SP KEY [SP VALUE]
//! ```
//! `COMMAND` is matched case-insensitively.
//!
//! ### Commands
//! - PUT    - key and value, value runs to the end of the line
//! - GET    - key
//! - DELETE - key
//!
//! ## Responses
//! - `PUT_SUCCESS`
//! - `GET_SUCCESS: <value>` / `GET_FAILURE: Key not found`
//! - `DELETE_SUCCESS` / `DELETE_FAILURE: Key not found`
//! - `ERROR: <message>`

mod command;
mod response;
mod codec;
mod dispatch;

pub use command::{parse_command, Command, CommandType, ParseError};
pub use response::{Response, Status, INTERNAL_FAILURE, RESPONSE_TOO_LARGE};
pub use codec::{decode_text, encode_datagram, read_line, write_line, write_response, LINE_DELIMITER};
pub use dispatch::Dispatcher;
