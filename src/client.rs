//! Client
//!
//! Blocking clients for both transports. Each request gets at most one
//! response; a response that does not arrive within the receive timeout is
//! reported as `None` and the request is not retried.

use std::io::{BufReader, BufWriter, ErrorKind};
use std::net::{SocketAddr, TcpStream, ToSocketAddrs, UdpSocket};
use std::time::Duration;

use crate::config::{Transport, DEFAULT_MAX_DATAGRAM_SIZE};
use crate::error::{KvError, Result};
use crate::protocol::{decode_text, read_line, write_line};

/// How long a client waits for each response
pub const DEFAULT_RESPONSE_TIMEOUT: Duration = Duration::from_secs(5);

/// Something that can send a request line and wait for its response
pub trait KvClient {
    /// Send `request` and wait for the response line
    ///
    /// Returns `Ok(None)` when the response timed out.
    fn request(&mut self, request: &str) -> Result<Option<String>>;
}

/// Connect a client for `transport`
pub fn connect(
    transport: Transport,
    addr: impl ToSocketAddrs,
    timeout: Duration,
) -> Result<Box<dyn KvClient>> {
    match transport {
        Transport::Tcp => Ok(Box::new(TcpClient::connect(addr, timeout)?)),
        Transport::Udp => Ok(Box::new(UdpClient::connect(addr, timeout)?)),
    }
}

// =============================================================================
// TCP
// =============================================================================

/// Client holding one TCP session
pub struct TcpClient {
    reader: BufReader<TcpStream>,
    writer: BufWriter<TcpStream>,
    buf: Vec<u8>,
}

impl TcpClient {
    /// Connect to the server at the given address
    pub fn connect(addr: impl ToSocketAddrs, timeout: Duration) -> Result<Self> {
        let reader_stream = TcpStream::connect(addr)?;
        reader_stream.set_read_timeout(Some(timeout))?;
        reader_stream.set_nodelay(true)?;
        let writer_stream = reader_stream.try_clone()?;

        Ok(Self {
            reader: BufReader::new(reader_stream),
            writer: BufWriter::new(writer_stream),
            buf: Vec::new(),
        })
    }

    /// Change how long each response is waited for
    pub fn set_timeout(&self, timeout: Duration) -> Result<()> {
        self.reader.get_ref().set_read_timeout(Some(timeout))?;
        Ok(())
    }
}

impl KvClient for TcpClient {
    fn request(&mut self, request: &str) -> Result<Option<String>> {
        write_line(&mut self.writer, request)?;

        match read_line(&mut self.reader, &mut self.buf) {
            Ok(Some(line)) => Ok(Some(line.trim_end_matches('\r').to_string())),
            Ok(None) => Err(KvError::ConnectionClosed),
            Err(KvError::Io(ref e)) if is_timeout(e.kind()) => {
                tracing::warn!("Server response timed out for request: {}", request);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}

// =============================================================================
// UDP
// =============================================================================

/// Client sending one datagram per request
pub struct UdpClient {
    socket: UdpSocket,
    server: SocketAddr,
    buf: Vec<u8>,
}

impl UdpClient {
    /// Bind an ephemeral local socket aimed at `addr`
    ///
    /// There is no handshake to tell which resolved address answers, so an
    /// IPv4 address is preferred; servers bind `0.0.0.0` by default.
    pub fn connect(addr: impl ToSocketAddrs, timeout: Duration) -> Result<Self> {
        let candidates: Vec<SocketAddr> = addr.to_socket_addrs()?.collect();
        let server = candidates
            .iter()
            .find(|candidate| candidate.is_ipv4())
            .or_else(|| candidates.first())
            .copied()
            .ok_or_else(|| KvError::Network("address resolved to nothing".to_string()))?;

        let local: SocketAddr = if server.is_ipv4() {
            ([0, 0, 0, 0], 0).into()
        } else {
            (std::net::Ipv6Addr::UNSPECIFIED, 0).into()
        };
        let socket = UdpSocket::bind(local)?;
        socket.set_read_timeout(Some(timeout))?;

        Ok(Self {
            socket,
            server,
            buf: vec![0u8; DEFAULT_MAX_DATAGRAM_SIZE],
        })
    }

    /// Address requests are sent to
    pub fn server_addr(&self) -> SocketAddr {
        self.server
    }
}

impl KvClient for UdpClient {
    fn request(&mut self, request: &str) -> Result<Option<String>> {
        self.socket.send_to(request.as_bytes(), self.server)?;

        loop {
            match self.socket.recv_from(&mut self.buf) {
                Ok((len, from)) if from == self.server => {
                    return Ok(Some(decode_text(&self.buf[..len]).into_owned()));
                }
                Ok((_, from)) => {
                    tracing::debug!("Ignoring datagram from unexpected peer {}", from);
                }
                Err(e) if is_timeout(e.kind()) => {
                    tracing::warn!("Server response timed out for request: {}", request);
                    return Ok(None);
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}

/// WouldBlock on Unix, TimedOut on Windows
fn is_timeout(kind: ErrorKind) -> bool {
    matches!(kind, ErrorKind::WouldBlock | ErrorKind::TimedOut)
}
