//! Protocol codec
//!
//! Framing helpers for the text protocol.
//!
//! ## Wire Format
//!
//! ### Stream (TCP)
//! ```text
//! ┌──────────────────────────────┬──────┐
//! │      Request / Response      │ '\n' │
//! └──────────────────────────────┴──────┘
//! ```
//! Delimiter-framed, no length limit.
//!
//! ### Datagram (UDP)
//! ```text
//! ┌─────────────────────────────────────┐
//! │  Request / Response (<= 1024 bytes) │
//! └─────────────────────────────────────┘
//! ```
//! The whole payload is one message; no terminator is needed.

use std::borrow::Cow;
use std::io::{BufRead, Write};

use crate::error::Result;
use super::Response;

/// Line terminator used by the stream transport
pub const LINE_DELIMITER: u8 = b'\n';

// =============================================================================
// Payload decoding
// =============================================================================

/// Decode raw request bytes as text
///
/// Invalid UTF-8 sequences are replaced rather than rejected, so a garbled
/// request still gets an `ERROR:` reply from the parser.
pub fn decode_text(bytes: &[u8]) -> Cow<'_, str> {
    String::from_utf8_lossy(bytes)
}

/// Encode a response for a datagram of at most `max_size` bytes
///
/// Replies that would not fit are replaced by the too-large error.
pub fn encode_datagram(response: &Response, max_size: usize) -> Vec<u8> {
    let bytes = response.encode().into_bytes();
    if bytes.len() > max_size {
        return Response::too_large().encode().into_bytes();
    }
    bytes
}

// =============================================================================
// Stream-based I/O helpers
// =============================================================================

/// Read one newline-terminated line from a stream
///
/// Returns `None` at end of stream. A final line without a terminator is
/// still returned. The terminator itself is stripped.
pub fn read_line<R: BufRead>(reader: &mut R, buf: &mut Vec<u8>) -> Result<Option<String>> {
    buf.clear();
    let n = reader.read_until(LINE_DELIMITER, buf)?;
    if n == 0 {
        return Ok(None);
    }

    if buf.last() == Some(&LINE_DELIMITER) {
        buf.pop();
    }
    Ok(Some(decode_text(buf).into_owned()))
}

/// Write one line followed by the delimiter, then flush
pub fn write_line<W: Write>(writer: &mut W, line: &str) -> Result<()> {
    writer.write_all(line.as_bytes())?;
    writer.write_all(&[LINE_DELIMITER])?;
    writer.flush()?;
    Ok(())
}

/// Write a response to a stream
pub fn write_response<W: Write>(writer: &mut W, response: &Response) -> Result<()> {
    write_line(writer, &response.encode())
}
