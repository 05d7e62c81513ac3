//! Server
//!
//! Transport selection and shutdown signalling.

use std::net::{
    IpAddr, Ipv4Addr, Ipv6Addr, Shutdown, SocketAddr, TcpListener, TcpStream, UdpSocket,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use crate::config::{Config, Transport};
use crate::error::Result;
use crate::logging::LogSink;
use crate::protocol::Dispatcher;
use crate::store::KvEngine;

use super::tcp::TcpServer;
use super::udp::UdpServer;

/// How long a wake-up connection may take before we give up on it
const WAKE_TIMEOUT: Duration = Duration::from_secs(1);

/// A bound server for either transport
pub enum Server<E: KvEngine> {
    Tcp(TcpServer<E>),
    Udp(UdpServer<E>),
}

impl<E: KvEngine> Server<E> {
    /// Bind the transport named by `config.transport`
    ///
    /// `log` is closed when the server shuts down.
    pub fn bind(config: &Config, engine: Arc<E>, log: Option<LogSink>) -> Result<Self> {
        let dispatcher = Dispatcher::new(engine);
        match config.transport {
            Transport::Tcp => Ok(Server::Tcp(TcpServer::bind(config, dispatcher, log)?)),
            Transport::Udp => Ok(Server::Udp(UdpServer::bind(config, dispatcher, log)?)),
        }
    }

    /// Serve on a listener bound elsewhere (e.g. inherited from a supervisor)
    ///
    /// Only the timeout settings of `config` are used.
    pub fn from_tcp_listener(
        listener: TcpListener,
        config: &Config,
        engine: Arc<E>,
        log: Option<LogSink>,
    ) -> Result<Self> {
        let dispatcher = Dispatcher::new(engine);
        Ok(Server::Tcp(TcpServer::from_listener(listener, config, dispatcher, log)?))
    }

    /// Serve on a datagram socket bound elsewhere
    ///
    /// Only `config.max_datagram_size` is used.
    pub fn from_udp_socket(
        socket: UdpSocket,
        config: &Config,
        engine: Arc<E>,
        log: Option<LogSink>,
    ) -> Result<Self> {
        let dispatcher = Dispatcher::new(engine);
        Ok(Server::Udp(UdpServer::from_socket(socket, config, dispatcher, log)?))
    }

    /// Serve requests until shutdown or a fatal socket error (blocking)
    pub fn run(self) -> Result<()> {
        match self {
            Server::Tcp(server) => server.run(),
            Server::Udp(server) => server.run(),
        }
    }

    /// Handle that stops this server from any thread
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        match self {
            Server::Tcp(server) => server.shutdown_handle(),
            Server::Udp(server) => server.shutdown_handle(),
        }
    }

    /// Address the socket is bound to
    pub fn local_addr(&self) -> SocketAddr {
        match self {
            Server::Tcp(server) => server.local_addr(),
            Server::Udp(server) => server.local_addr(),
        }
    }

    /// Transport this server speaks
    pub fn transport(&self) -> Transport {
        match self {
            Server::Tcp(_) => Transport::Tcp,
            Server::Udp(_) => Transport::Udp,
        }
    }
}

// =============================================================================
// Shutdown
// =============================================================================

/// Stops a running server
///
/// A blocked `accept`/`recv_from` cannot be interrupted by closing the
/// socket from another thread, so shutdown sets a flag and then pokes the
/// bound address. The serving loop sees the flag when it wakes, returns,
/// and drops the socket. A TCP session in progress is cut off by shutting
/// down its stream, which ends the session's blocked read with EOF.
#[derive(Debug, Clone)]
pub struct ShutdownHandle {
    inner: Arc<ShutdownState>,
}

#[derive(Debug)]
struct ShutdownState {
    stopped: AtomicBool,
    transport: Transport,
    addr: SocketAddr,
    log: Option<LogSink>,
    /// Stream of the TCP session being served, if any
    session: Mutex<Option<TcpStream>>,
}

impl ShutdownHandle {
    pub(crate) fn new(transport: Transport, addr: SocketAddr, log: Option<LogSink>) -> Self {
        Self {
            inner: Arc::new(ShutdownState {
                stopped: AtomicBool::new(false),
                transport,
                addr,
                log,
                session: Mutex::new(None),
            }),
        }
    }

    /// Check if shutdown has been requested
    pub fn is_shutdown(&self) -> bool {
        self.inner.stopped.load(Ordering::SeqCst)
    }

    /// Stop the server and close its log sink
    ///
    /// Idempotent; only the first call has any effect.
    pub fn shutdown(&self) {
        if self.inner.stopped.swap(true, Ordering::SeqCst) {
            return;
        }

        tracing::info!(
            "{} server on {} shutting down",
            self.inner.transport,
            self.inner.addr
        );

        if let Some(stream) = self.inner.session.lock().take() {
            if let Err(e) = stream.shutdown(Shutdown::Both) {
                tracing::debug!("Closing active session failed: {}", e);
            }
        }

        // The loop may already be gone (fatal error), so a failed wake is fine
        if let Err(e) = self.wake() {
            tracing::debug!("Wake-up of {} failed: {}", self.inner.addr, e);
        }

        if let Some(log) = &self.inner.log {
            log.close();
        }
    }

    /// Register the stream of the session about to be served
    ///
    /// Returns `false` if shutdown has already begun, in which case the
    /// session must not be served.
    pub(crate) fn begin_session(&self, stream: &TcpStream) -> std::io::Result<bool> {
        let mut session = self.inner.session.lock();
        // Checked under the lock: `shutdown` sets the flag before taking it
        if self.is_shutdown() {
            return Ok(false);
        }
        *session = Some(stream.try_clone()?);
        Ok(true)
    }

    /// Forget the stream registered by `begin_session`
    pub(crate) fn end_session(&self) {
        self.inner.session.lock().take();
    }

    fn wake(&self) -> std::io::Result<()> {
        let target = reachable_addr(self.inner.addr);
        match self.inner.transport {
            Transport::Tcp => {
                TcpStream::connect_timeout(&target, WAKE_TIMEOUT)?;
            }
            Transport::Udp => {
                let local = SocketAddr::new(unspecified_like(target.ip()), 0);
                UdpSocket::bind(local)?.send_to(&[], target)?;
            }
        }
        Ok(())
    }
}

/// Map a wildcard bind address to the loopback address of the same family
fn reachable_addr(addr: SocketAddr) -> SocketAddr {
    match addr.ip() {
        IpAddr::V4(ip) if ip.is_unspecified() => {
            SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), addr.port())
        }
        IpAddr::V6(ip) if ip.is_unspecified() => {
            SocketAddr::new(IpAddr::V6(Ipv6Addr::LOCALHOST), addr.port())
        }
        _ => addr,
    }
}

fn unspecified_like(ip: IpAddr) -> IpAddr {
    match ip {
        IpAddr::V4(_) => IpAddr::V4(Ipv4Addr::UNSPECIFIED),
        IpAddr::V6(_) => IpAddr::V6(Ipv6Addr::UNSPECIFIED),
    }
}
