//! Integration tests for DualKV
//!
//! Replays the demonstration traffic of the reference clients over both
//! transports.

mod common;

use std::sync::Arc;

use common::{
    demo_traffic, TestServer, TCP_EXTRA_PUTS, TCP_PREPOPULATE, UDP_EXTRA_PUTS, UDP_PREPOPULATE,
};
use dualkv::client::{self, KvClient, DEFAULT_RESPONSE_TIMEOUT};
use dualkv::{MemStore, Transport};

fn replay(client: &mut dyn KvClient, traffic: &[(String, String)]) {
    for (request, expected) in traffic {
        let response = client
            .request(request)
            .unwrap()
            .unwrap_or_else(|| panic!("no response to {:?}", request));
        assert_eq!(&response, expected, "request {:?}", request);
    }
}

// =============================================================================
// Demonstration Traffic Tests
// =============================================================================

#[test]
fn test_tcp_demo_traffic() {
    let server = TestServer::start(Transport::Tcp);
    let mut client = client::connect(Transport::Tcp, server.addr, DEFAULT_RESPONSE_TIMEOUT).unwrap();

    let traffic = demo_traffic(&TCP_PREPOPULATE, &TCP_EXTRA_PUTS);
    assert_eq!(traffic.len(), 20);
    replay(client.as_mut(), &traffic);

    // Only the five extra PUTs survive the DELETE batch
    assert_eq!(server.engine.len(), TCP_EXTRA_PUTS.len());
}

#[test]
fn test_udp_demo_traffic() {
    let server = TestServer::start(Transport::Udp);
    let mut client = client::connect(Transport::Udp, server.addr, DEFAULT_RESPONSE_TIMEOUT).unwrap();

    replay(client.as_mut(), &demo_traffic(&UDP_PREPOPULATE, &UDP_EXTRA_PUTS));

    assert_eq!(server.engine.len(), UDP_EXTRA_PUTS.len());
}

#[test]
fn test_demo_traffic_repeated_shows_misses() {
    let server = TestServer::start(Transport::Udp);
    let mut client = client::connect(Transport::Udp, server.addr, DEFAULT_RESPONSE_TIMEOUT).unwrap();

    replay(client.as_mut(), &demo_traffic(&UDP_PREPOPULATE, &UDP_EXTRA_PUTS));

    for (key, _) in UDP_PREPOPULATE {
        assert_eq!(
            client.request(&format!("GET {}", key)).unwrap(),
            Some("GET_FAILURE: Key not found".to_string())
        );
        assert_eq!(
            client.request(&format!("DELETE {}", key)).unwrap(),
            Some("DELETE_FAILURE: Key not found".to_string())
        );
    }
}

// =============================================================================
// Shared Store Tests
// =============================================================================

#[test]
fn test_both_transports_over_one_store() {
    let engine = Arc::new(MemStore::new());
    let tcp = TestServer::start_with(Transport::Tcp, Arc::clone(&engine), None);
    let udp = TestServer::start_with(Transport::Udp, Arc::clone(&engine), None);

    let mut over_tcp = client::connect(Transport::Tcp, tcp.addr, DEFAULT_RESPONSE_TIMEOUT).unwrap();
    let mut over_udp = client::connect(Transport::Udp, udp.addr, DEFAULT_RESPONSE_TIMEOUT).unwrap();

    assert_eq!(
        over_tcp.request("PUT bridge tcp-wrote-this").unwrap(),
        Some("PUT_SUCCESS".to_string())
    );
    assert_eq!(
        over_udp.request("GET bridge").unwrap(),
        Some("GET_SUCCESS: tcp-wrote-this".to_string())
    );
    assert_eq!(
        over_udp.request("DELETE bridge").unwrap(),
        Some("DELETE_SUCCESS".to_string())
    );
    assert_eq!(
        over_tcp.request("GET bridge").unwrap(),
        Some("GET_FAILURE: Key not found".to_string())
    );
}
