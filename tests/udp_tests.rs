//! UDP Transport Tests
//!
//! End-to-end tests against a real datagram server on localhost.

mod common;

use std::io::ErrorKind;
use std::net::UdpSocket;
use std::sync::Arc;
use std::time::Duration;

use common::TestServer;
use dualkv::client::{KvClient, UdpClient, DEFAULT_RESPONSE_TIMEOUT};
use dualkv::logging::LogSink;
use dualkv::{Config, KvError, MemStore, Server, Transport};
use tempfile::TempDir;

fn connect(server: &TestServer) -> UdpClient {
    UdpClient::connect(server.addr, DEFAULT_RESPONSE_TIMEOUT).unwrap()
}

fn request(client: &mut UdpClient, line: &str) -> String {
    client.request(line).unwrap().expect("response timed out")
}

// =============================================================================
// Request Tests
// =============================================================================

#[test]
fn test_apple_scenario() {
    let server = TestServer::start(Transport::Udp);
    let mut client = connect(&server);

    assert_eq!(request(&mut client, "PUT apple 100"), "PUT_SUCCESS");
    assert_eq!(request(&mut client, "GET apple"), "GET_SUCCESS: 100");
    assert_eq!(request(&mut client, "DELETE apple"), "DELETE_SUCCESS");
    assert_eq!(request(&mut client, "GET apple"), "GET_FAILURE: Key not found");
    assert_eq!(
        request(&mut client, "DELETE apple"),
        "DELETE_FAILURE: Key not found"
    );
}

#[test]
fn test_malformed_datagrams_get_error_replies() {
    let server = TestServer::start(Transport::Udp);
    let mut client = connect(&server);

    assert_eq!(request(&mut client, "   "), "ERROR: Empty request");
    assert_eq!(request(&mut client, "PUT onlykey"), "ERROR: Invalid PUT command");
    assert_eq!(request(&mut client, "GET"), "ERROR: Invalid GET command");
    assert_eq!(request(&mut client, "FOO bar"), "ERROR: Unknown command");
}

#[test]
fn test_trailing_newline_in_payload_is_ignored() {
    let server = TestServer::start(Transport::Udp);
    let mut client = connect(&server);

    assert_eq!(request(&mut client, "PUT nl yes\n"), "PUT_SUCCESS");
    assert_eq!(request(&mut client, "GET nl\r\n"), "GET_SUCCESS: yes");
}

#[test]
fn test_independent_senders_share_store() {
    let server = TestServer::start(Transport::Udp);
    let mut writer = connect(&server);
    let mut reader = connect(&server);

    assert_eq!(request(&mut writer, "PUT shared 42"), "PUT_SUCCESS");
    assert_eq!(request(&mut reader, "GET shared"), "GET_SUCCESS: 42");
}

// =============================================================================
// Size Limit Tests
// =============================================================================

#[test]
fn test_oversized_response_is_replaced() {
    let server = TestServer::start(Transport::Udp);
    let mut client = connect(&server);

    // Request fits in 1024 bytes, "GET_SUCCESS: " + value does not
    let value = "x".repeat(1015);
    let put = format!("PUT big {}", value);
    assert!(put.len() <= 1024);

    assert_eq!(request(&mut client, &put), "PUT_SUCCESS");
    assert_eq!(request(&mut client, "GET big"), "ERROR: Response too large");

    // The stored value is intact, only the reply was replaced
    assert_eq!(server.engine.len(), 1);
}

#[test]
fn test_largest_response_that_fits_is_sent() {
    let server = TestServer::start(Transport::Udp);
    let mut client = connect(&server);

    let value = "y".repeat(1024 - "GET_SUCCESS: ".len());
    assert_eq!(request(&mut client, &format!("PUT edge {}", value)), "PUT_SUCCESS");
    assert_eq!(request(&mut client, "GET edge"), format!("GET_SUCCESS: {}", value));
}

#[test]
fn test_oversized_request_is_dropped() {
    let server = TestServer::start(Transport::Udp);
    let mut client = UdpClient::connect(server.addr, Duration::from_millis(300)).unwrap();

    let too_big = format!("PUT huge {}", "z".repeat(1100));
    assert_eq!(client.request(&too_big).unwrap(), None);
    assert!(server.engine.is_empty());

    // The loop keeps serving afterwards
    assert_eq!(
        client.request("GET huge").unwrap(),
        Some("GET_FAILURE: Key not found".to_string())
    );
}

#[test]
fn test_raw_socket_reply_goes_to_sender() {
    let server = TestServer::start(Transport::Udp);
    let socket = UdpSocket::bind("127.0.0.1:0").unwrap();
    socket.set_read_timeout(Some(DEFAULT_RESPONSE_TIMEOUT)).unwrap();

    socket.send_to(b"PUT raw 1", server.addr).unwrap();

    let mut buf = [0u8; 1024];
    let (len, from) = socket.recv_from(&mut buf).unwrap();
    assert_eq!(from, server.addr);
    assert_eq!(&buf[..len], b"PUT_SUCCESS");
}

// =============================================================================
// Shutdown Tests
// =============================================================================

#[test]
fn test_shutdown_unblocks_receive() {
    let server = TestServer::start(Transport::Udp);
    std::thread::sleep(Duration::from_millis(50));

    assert!(server.stop().is_ok());
}

#[test]
fn test_shutdown_is_idempotent() {
    let server = TestServer::start(Transport::Udp);
    let handle = server.handle();

    handle.shutdown();
    handle.shutdown();

    assert!(server.stop().is_ok());
    assert!(handle.is_shutdown());
}

#[test]
fn test_fatal_socket_error_stops_server() {
    let dir = TempDir::new().unwrap();
    let sink = LogSink::open(dir.path().join("UDPServerLog.log")).unwrap();

    // recv_from on a non-blocking socket fails with WouldBlock, which the
    // loop does not treat as a per-packet error
    let socket = UdpSocket::bind("127.0.0.1:0").unwrap();
    socket.set_nonblocking(true).unwrap();

    let config = Config::builder().transport(Transport::Udp).build();
    let server =
        Server::from_udp_socket(socket, &config, Arc::new(MemStore::new()), Some(sink.clone()))
            .unwrap();
    assert_eq!(server.transport(), Transport::Udp);
    let handle = server.shutdown_handle();

    match server.run() {
        Err(KvError::Io(e)) => assert_eq!(e.kind(), ErrorKind::WouldBlock),
        other => panic!("expected the receive error, got {:?}", other),
    }
    assert!(handle.is_shutdown());
    assert!(sink.is_closed());
}

// =============================================================================
// Client Tests
// =============================================================================

#[test]
fn test_client_prefers_ipv4_for_host_names() {
    let server = TestServer::start(Transport::Udp);

    // `localhost` may list ::1 first; the server only listens on 127.0.0.1
    let mut client =
        UdpClient::connect(("localhost", server.addr.port()), DEFAULT_RESPONSE_TIMEOUT).unwrap();
    assert!(client.server_addr().is_ipv4());
    assert_eq!(client.request("PUT host name").unwrap(), Some("PUT_SUCCESS".to_string()));
}
