//! UDP Server
//!
//! One datagram in, one datagram out. No sessions.

use std::io::ErrorKind;
use std::net::{SocketAddr, UdpSocket};

use crate::config::{Config, Transport};
use crate::error::{KvError, Result};
use crate::logging::LogSink;
use crate::protocol::{decode_text, encode_datagram, Dispatcher};
use crate::store::KvEngine;

use super::server::ShutdownHandle;

/// Datagram transport server
pub struct UdpServer<E: KvEngine> {
    socket: UdpSocket,
    local_addr: SocketAddr,
    dispatcher: Dispatcher<E>,
    max_datagram_size: usize,
    shutdown: ShutdownHandle,
}

impl<E: KvEngine> UdpServer<E> {
    /// Bind to `config.listen_addr`
    pub fn bind(config: &Config, dispatcher: Dispatcher<E>, log: Option<LogSink>) -> Result<Self> {
        let socket = UdpSocket::bind(config.listen_addr.as_str()).map_err(|e| {
            KvError::Network(format!("failed to bind UDP {}: {}", config.listen_addr, e))
        })?;
        Self::from_socket(socket, config, dispatcher, log)
    }

    /// Serve on an already bound socket
    pub fn from_socket(
        socket: UdpSocket,
        config: &Config,
        dispatcher: Dispatcher<E>,
        log: Option<LogSink>,
    ) -> Result<Self> {
        if config.max_datagram_size == 0 {
            return Err(KvError::Config("max_datagram_size must be positive".to_string()));
        }
        let local_addr = socket.local_addr()?;

        Ok(Self {
            socket,
            local_addr,
            dispatcher,
            max_datagram_size: config.max_datagram_size,
            shutdown: ShutdownHandle::new(Transport::Udp, local_addr, log),
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        self.shutdown.clone()
    }

    /// Start the server (blocking)
    ///
    /// Returns after shutdown, or with the error that broke the socket.
    /// Shutdown has run by the time this returns either way.
    pub fn run(self) -> Result<()> {
        tracing::info!("UDP server running on {}", self.local_addr);

        let result = self.receive_loop();
        if let Err(e) = &result {
            tracing::error!("UDP server error: {}", e);
        }

        self.shutdown.shutdown();
        result
    }

    fn receive_loop(&self) -> Result<()> {
        // One spare byte tells a full-size request from a truncated one
        let mut buf = vec![0u8; self.max_datagram_size + 1];

        while !self.shutdown.is_shutdown() {
            let (len, peer) = match self.socket.recv_from(&mut buf) {
                Ok(received) => received,
                Err(e) if is_per_packet(e.kind()) => {
                    tracing::debug!("Ignoring receive error: {}", e);
                    continue;
                }
                Err(e) => {
                    if self.shutdown.is_shutdown() {
                        break;
                    }
                    return Err(e.into());
                }
            };

            if self.shutdown.is_shutdown() {
                break;
            }

            if len > self.max_datagram_size {
                tracing::warn!(
                    "Dropping request from {}: larger than {} bytes",
                    peer,
                    self.max_datagram_size
                );
                continue;
            }

            self.answer(&buf[..len], peer);
        }

        Ok(())
    }

    /// Dispatch one request and reply to its sender
    fn answer(&self, payload: &[u8], peer: SocketAddr) {
        let request = decode_text(payload);
        tracing::info!("Received request from {}: {}", peer, request.trim());

        let response = self.dispatcher.handle_line(&request, &peer.to_string());
        let reply = encode_datagram(&response, self.max_datagram_size);

        match self.socket.send_to(&reply, peer) {
            Ok(_) => tracing::info!("Sent response to {}: {}", peer, decode_text(&reply)),
            Err(e) => tracing::warn!("Failed to send response to {}: {}", peer, e),
        }
    }
}

/// Receive errors that concern one packet (or ICMP feedback about an
/// earlier reply) rather than the socket
fn is_per_packet(kind: ErrorKind) -> bool {
    matches!(
        kind,
        ErrorKind::ConnectionReset | ErrorKind::ConnectionRefused | ErrorKind::Interrupted
    )
}
