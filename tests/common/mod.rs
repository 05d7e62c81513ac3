//! Shared helpers for the network tests
//!
//! Spawns real servers on `127.0.0.1:0` and provides the demonstration
//! traffic the reference clients send.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use dualkv::logging::LogSink;
use dualkv::{Config, MemStore, Result, Server, ShutdownHandle, Transport};

// =============================================================================
// Server Fixture
// =============================================================================

/// A server running on a background thread
pub struct TestServer {
    pub addr: SocketAddr,
    pub engine: Arc<MemStore>,
    handle: ShutdownHandle,
    thread: Option<JoinHandle<Result<()>>>,
}

impl TestServer {
    pub fn start(transport: Transport) -> Self {
        Self::start_with(transport, Arc::new(MemStore::new()), None)
    }

    pub fn start_with(transport: Transport, engine: Arc<MemStore>, log: Option<LogSink>) -> Self {
        let config = Config::builder()
            .listen_addr("127.0.0.1:0")
            .transport(transport)
            .build();
        let server = Server::bind(&config, Arc::clone(&engine), log).unwrap();
        let addr = server.local_addr();
        let handle = server.shutdown_handle();
        let thread = thread::spawn(move || server.run());

        Self {
            addr,
            engine,
            handle,
            thread: Some(thread),
        }
    }

    pub fn handle(&self) -> ShutdownHandle {
        self.handle.clone()
    }

    /// Shut down and wait for the serving loop to return
    pub fn stop(mut self) -> Result<()> {
        self.handle.shutdown();
        self.thread.take().unwrap().join().unwrap()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.shutdown();
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

// =============================================================================
// Demonstration Traffic
// =============================================================================

/// Keys the TCP demo client stores before its operation batch
pub const TCP_PREPOPULATE: [(&str, &str); 5] = [
    ("apple", "100"),
    ("banana", "200"),
    ("cherry", "300"),
    ("mango", "400"),
    ("orange", "500"),
];

/// Keys the TCP demo client adds in its operation batch
pub const TCP_EXTRA_PUTS: [(&str, &str); 5] = [
    ("kiwi", "600"),
    ("grape", "700"),
    ("watermelon", "800"),
    ("strawberry", "900"),
    ("blueberry", "1000"),
];

/// Keys the UDP demo client stores before its operation batch
pub const UDP_PREPOPULATE: [(&str, &str); 5] = [
    ("lion", "101"),
    ("tiger", "202"),
    ("elephant", "303"),
    ("giraffe", "404"),
    ("zebra", "505"),
];

/// Keys the UDP demo client adds in its operation batch
pub const UDP_EXTRA_PUTS: [(&str, &str); 5] = [
    ("kangaroo", "606"),
    ("panda", "707"),
    ("cheetah", "808"),
    ("dolphin", "909"),
    ("penguin", "1010"),
];

/// Pre-population followed by the 15-operation batch (5 PUT, 5 GET,
/// 5 DELETE), paired with the responses a fresh server must give.
pub fn demo_traffic(
    prepopulate: &[(&str, &str)],
    extra_puts: &[(&str, &str)],
) -> Vec<(String, String)> {
    let mut traffic = Vec::new();

    for (key, value) in prepopulate.iter().chain(extra_puts) {
        traffic.push((format!("PUT {} {}", key, value), "PUT_SUCCESS".to_string()));
    }
    for (key, value) in prepopulate {
        traffic.push((format!("GET {}", key), format!("GET_SUCCESS: {}", value)));
    }
    for (key, _) in prepopulate {
        traffic.push((format!("DELETE {}", key), "DELETE_SUCCESS".to_string()));
    }

    traffic
}
