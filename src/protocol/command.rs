//! Command definitions
//!
//! Parses request lines into validated commands.

use std::fmt;

use thiserror::Error;

/// Most fields a request line is split into; the last one keeps the rest of the line
const MAX_FIELDS: usize = 3;

/// Command types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandType {
    Put,
    Get,
    Delete,
}

impl CommandType {
    /// Look up a command by its upper-cased name
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "PUT" => Some(CommandType::Put),
            "GET" => Some(CommandType::Get),
            "DELETE" => Some(CommandType::Delete),
            _ => None,
        }
    }

    /// Wire name of the command
    pub fn name(&self) -> &'static str {
        match self {
            CommandType::Put => "PUT",
            CommandType::Get => "GET",
            CommandType::Delete => "DELETE",
        }
    }

    /// Number of fields, including the name, a well-formed request carries
    pub fn arity(&self) -> usize {
        match self {
            CommandType::Put => 3,
            CommandType::Get | CommandType::Delete => 2,
        }
    }
}

impl fmt::Display for CommandType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A parsed command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Put a key-value pair
    Put { key: String, value: String },

    /// Get a value by key
    Get { key: String },

    /// Delete a key
    Delete { key: String },
}

impl Command {
    /// Get the command type
    pub fn command_type(&self) -> CommandType {
        match self {
            Command::Put { .. } => CommandType::Put,
            Command::Get { .. } => CommandType::Get,
            Command::Delete { .. } => CommandType::Delete,
        }
    }

    /// Key the command operates on
    pub fn key(&self) -> &str {
        match self {
            Command::Put { key, .. } | Command::Get { key } | Command::Delete { key } => key,
        }
    }
}

/// Why a request line could not be turned into a [`Command`]
///
/// The `Display` text is the message carried by the `ERROR:` response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Empty request")]
    EmptyRequest,

    #[error("Invalid {0} command")]
    InvalidArity(CommandType),

    #[error("Unknown command")]
    UnknownCommand,
}

/// Parse one request line.
///
/// Surrounding control characters and spaces (including a trailing `\r\n`)
/// are ignored and the command name is matched case-insensitively. Fields
/// are separated by ASCII whitespace only; other Unicode spaces are part of
/// a field. A `PUT` value is everything after the whitespace following the
/// key, so it may contain spaces.
pub fn parse_command(line: &str) -> Result<Command, ParseError> {
    let line = line.trim_matches(|c: char| c <= ' ');
    if line.is_empty() {
        return Err(ParseError::EmptyRequest);
    }

    let fields = split_fields(line);
    let name = fields[0].to_uppercase();
    let command_type = CommandType::from_name(&name).ok_or(ParseError::UnknownCommand)?;

    if fields.len() != command_type.arity() {
        return Err(ParseError::InvalidArity(command_type));
    }

    let key = fields[1].to_string();
    let command = match command_type {
        CommandType::Put => Command::Put {
            key,
            value: fields[2].to_string(),
        },
        CommandType::Get => Command::Get { key },
        CommandType::Delete => Command::Delete { key },
    };

    Ok(command)
}

/// Split a trimmed, non-empty line on whitespace runs into at most
/// `MAX_FIELDS` fields.
fn split_fields(line: &str) -> Vec<&str> {
    let mut fields = Vec::with_capacity(MAX_FIELDS);
    let mut rest = line;

    while fields.len() < MAX_FIELDS - 1 {
        match rest.find(is_separator) {
            Some(end) => {
                fields.push(&rest[..end]);
                rest = rest[end..].trim_start_matches(is_separator);
            }
            None => break,
        }
    }

    if !rest.is_empty() {
        fields.push(rest);
    }

    fields
}

/// Space, tab, newline, vertical tab, form feed, carriage return
fn is_separator(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\x0B' | '\x0C' | '\r')
}
