//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::task::JoinHandle;

use sdi_tally_bridge::config::BridgeConfig;
use sdi_tally_bridge::lifecycle::{self, Shutdown};
use sdi_tally_bridge::tally::SimulatedBus;

/// A bridge serving on an ephemeral localhost port.
pub struct TestBridge {
    pub addr: SocketAddr,
    pub bus: SimulatedBus,
    shutdown: Shutdown,
    handle: JoinHandle<()>,
}

impl TestBridge {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Trigger shutdown and wait for the server loop to exit.
    pub async fn stop(self) {
        self.shutdown.trigger();
        let _ = self.handle.await;
    }
}

pub fn local_config() -> BridgeConfig {
    let mut config = BridgeConfig::default();
    config.listener.bind_address = "127.0.0.1:0".into();
    config
}

pub async fn start_bridge() -> TestBridge {
    start_bridge_with(local_config()).await
}

pub async fn start_bridge_with(config: BridgeConfig) -> TestBridge {
    let bus = SimulatedBus::new();
    let bridge = lifecycle::start(config, bus.clone()).await.unwrap();
    let addr = bridge.local_addr();

    let shutdown = Shutdown::new();
    let rx = shutdown.subscribe();
    let handle = tokio::spawn(bridge.run(rx));

    TestBridge {
        addr,
        bus,
        shutdown,
        handle,
    }
}

/// A parsed HTTP/1.1 response.
#[derive(Debug)]
pub struct RawResponse {
    pub status: u16,
    pub head: String,
    pub body: String,
}

impl RawResponse {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.head.lines().skip(1).find_map(|line| {
            let (key, value) = line.split_once(':')?;
            key.eq_ignore_ascii_case(name).then(|| value.trim())
        })
    }

    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).unwrap()
    }
}

pub fn parse_response(raw: &[u8]) -> RawResponse {
    let text = String::from_utf8_lossy(raw).into_owned();
    let (head, body) = text.split_once("\r\n\r\n").unwrap();
    let status = head
        .split_whitespace()
        .nth(1)
        .and_then(|code| code.parse().ok())
        .unwrap();
    RawResponse {
        status,
        head: head.to_string(),
        body: body.to_string(),
    }
}

/// Send raw bytes in one write and read until the bridge closes.
pub async fn raw_exchange(addr: SocketAddr, request: &[u8]) -> Vec<u8> {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(request).await.unwrap();
    let mut received = Vec::new();
    stream.read_to_end(&mut received).await.unwrap();
    received
}

pub async fn get(addr: SocketAddr, target: &str) -> RawResponse {
    let request = format!("GET {} HTTP/1.1\r\nHost: bridge\r\n\r\n", target);
    parse_response(&raw_exchange(addr, request.as_bytes()).await)
}

/// Send a request one byte per write.
pub async fn get_bytewise(addr: SocketAddr, target: &str) -> RawResponse {
    let request = format!("GET {} HTTP/1.1\r\nHost: bridge\r\n\r\n", target);
    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.set_nodelay(true).unwrap();
    for byte in request.as_bytes() {
        stream.write_all(std::slice::from_ref(byte)).await.unwrap();
        stream.flush().await.unwrap();
    }
    let mut received = Vec::new();
    stream.read_to_end(&mut received).await.unwrap();
    parse_response(&received)
}
