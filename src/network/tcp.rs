//! TCP Server
//!
//! Accepts connections and serves each session to completion before
//! accepting the next one.

use std::io::ErrorKind;
use std::net::{SocketAddr, TcpListener, TcpStream};

use crate::config::{Config, Transport};
use crate::error::{KvError, Result};
use crate::logging::LogSink;
use crate::protocol::Dispatcher;
use crate::store::KvEngine;

use super::connection::Connection;
use super::server::ShutdownHandle;

/// Stream transport server
pub struct TcpServer<E: KvEngine> {
    listener: TcpListener,
    local_addr: SocketAddr,
    dispatcher: Dispatcher<E>,
    read_timeout_ms: u64,
    write_timeout_ms: u64,
    shutdown: ShutdownHandle,
}

impl<E: KvEngine> TcpServer<E> {
    /// Bind and listen on `config.listen_addr`
    pub fn bind(config: &Config, dispatcher: Dispatcher<E>, log: Option<LogSink>) -> Result<Self> {
        let listener = TcpListener::bind(config.listen_addr.as_str()).map_err(|e| {
            KvError::Network(format!("failed to bind TCP {}: {}", config.listen_addr, e))
        })?;
        Self::from_listener(listener, config, dispatcher, log)
    }

    /// Serve on an already bound listener
    pub fn from_listener(
        listener: TcpListener,
        config: &Config,
        dispatcher: Dispatcher<E>,
        log: Option<LogSink>,
    ) -> Result<Self> {
        let local_addr = listener.local_addr()?;

        Ok(Self {
            listener,
            local_addr,
            dispatcher,
            read_timeout_ms: config.read_timeout_ms,
            write_timeout_ms: config.write_timeout_ms,
            shutdown: ShutdownHandle::new(Transport::Tcp, local_addr, log),
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
    /// Returns after shutdown, or with the error that stopped the listener.
    /// Shutdown has run by the time this returns either way.
    pub fn run(self) -> Result<()> {
        tracing::info!("TCP server running on {}", self.local_addr);

        let result = self.accept_loop();
        if let Err(e) = &result {
            tracing::error!("TCP server error: {}", e);
        }

        self.shutdown.shutdown();
        result
    }

    fn accept_loop(&self) -> Result<()> {
        while !self.shutdown.is_shutdown() {
            match self.listener.accept() {
                Ok((stream, peer)) => {
                    if self.shutdown.is_shutdown() {
                        break;
                    }
                    tracing::info!("Connection established with {}", peer);
                    self.serve(stream, peer);
                }
                Err(e) if is_per_connection(e.kind()) => {
                    tracing::warn!("Failed to accept connection: {}", e);
                }
                Err(e) => {
                    if self.shutdown.is_shutdown() {
                        break;
                    }
                    return Err(e.into());
                }
            }
        }

        Ok(())
    }

    /// Run one session; its failures never reach the accept loop
    fn serve(&self, stream: TcpStream, peer: SocketAddr) {
        // Registered so that shutdown can cut an idle session short
        match self.shutdown.begin_session(&stream) {
            Ok(true) => {}
            Ok(false) => return,
            Err(e) => {
                tracing::warn!("Failed to set up connection with {}: {}", peer, e);
                return;
            }
        }

        self.run_session(stream, peer);
        self.shutdown.end_session();
        tracing::info!("Connection with {} closed", peer);
    }

    fn run_session(&self, stream: TcpStream, peer: SocketAddr) {
        let mut connection = match Connection::new(stream, self.dispatcher.clone()) {
            Ok(connection) => connection,
            Err(e) => {
                tracing::warn!("Failed to set up connection with {}: {}", peer, e);
                return;
            }
        };

        if let Err(e) = connection.set_timeouts(self.read_timeout_ms, self.write_timeout_ms) {
            tracing::warn!("Failed to set timeouts for {}: {}", peer, e);
            return;
        }

        if let Err(e) = connection.handle() {
            tracing::error!("Client handling error for {}: {}", peer, e);
        }
    }
}

/// Accept errors caused by a single peer rather than the listener
fn is_per_connection(kind: ErrorKind) -> bool {
    matches!(
        kind,
        ErrorKind::ConnectionAborted | ErrorKind::ConnectionReset | ErrorKind::Interrupted
    )
}
