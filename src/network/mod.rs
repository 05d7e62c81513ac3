//! Network Module
//!
//! TCP and UDP servers sharing one store.
//!
//! ## Architecture
//! - One control loop per server, on the thread that calls `run`
//! - TCP sessions are served one at a time on that loop
//! - Every UDP datagram is handled independently
//! - Requests routed through the Dispatcher

mod server;
mod connection;
mod tcp;
mod udp;

pub use server::{Server, ShutdownHandle};
pub use connection::Connection;
pub use tcp::TcpServer;
pub use udp::UdpServer;
