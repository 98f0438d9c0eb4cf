//! Failure injection tests for the bridge.

use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use sdi_tally_bridge::http::parser::PATH_CAPACITY;
use sdi_tally_bridge::tally::{BusStats, CameraId, TallyState};

mod common;

fn cam(id: u8) -> CameraId {
    CameraId::new(id).unwrap()
}

#[tokio::test]
async fn stuck_camera_reports_failure_after_three_attempts() {
    let bridge = common::start_bridge().await;
    bridge.bus.stick(cam(2), TallyState::OFF);
    bridge.bus.reset_stats();

    let response = common::get(bridge.addr, "/tally?cam=2&pgm=1").await;

    // Still a 200: device failures are reported in the body.
    assert_eq!(response.status, 200);
    let json = response.json();
    assert_eq!(json["camera"], 2);
    assert_eq!(json["program"], true);
    assert_eq!(json["success"], false);

    let stats = bridge.bus.stats();
    assert_eq!(stats.writes, 3);
    assert_eq!(stats.reads, 3);

    bridge.stop().await;
}

#[tokio::test]
async fn transient_write_loss_recovers_on_retry() {
    let bridge = common::start_bridge().await;
    bridge.bus.drop_writes(1);
    bridge.bus.reset_stats();

    let json = common::get(bridge.addr, "/tally?cam=1&pvw=1").await.json();

    assert_eq!(json["success"], true);
    assert_eq!(bridge.bus.stats().writes, 2);
    assert_eq!(bridge.bus.register(cam(1)), TallyState::new(false, true));

    bridge.stop().await;
}

#[tokio::test]
async fn disconnected_camera_shows_in_status_and_fails_tally() {
    let bridge = common::start_bridge().await;
    bridge.bus.set_connected(cam(4), false);

    let status = common::get(bridge.addr, "/status").await.json();
    let cameras = status["cameras"].as_array().unwrap();
    assert_eq!(cameras[3]["connected"], false);
    assert_eq!(cameras[0]["connected"], true);
    assert_eq!(status["status"]["device_status"], "active");

    let tally = common::get(bridge.addr, "/tally?cam=4&pgm=1").await.json();
    assert_eq!(tally["success"], false);

    bridge.stop().await;
}

#[tokio::test]
async fn all_cameras_unreadable_marks_device_unreachable() {
    let bridge = common::start_bridge().await;
    for id in 1..=4 {
        bridge.bus.set_connected(cam(id), false);
    }

    let response = common::get(bridge.addr, "/status").await;

    assert_eq!(response.status, 200);
    assert_eq!(response.json()["status"]["device_status"], "unreachable");

    bridge.stop().await;
}

#[tokio::test]
async fn busy_bus_delays_but_does_not_fail() {
    let bridge = common::start_bridge().await;
    bridge.bus.busy_for(20);

    let json = common::get(bridge.addr, "/tally?cam=3&pgm=1&pvw=1").await.json();

    assert_eq!(json["success"], true);
    assert!(bridge.bus.stats().ready_polls >= 21);

    bridge.stop().await;
}

#[tokio::test]
async fn bounded_readiness_wait_reports_failure_without_writing() {
    let mut config = common::local_config();
    config.tally.ready_timeout_ms = Some(10);
    let bridge = common::start_bridge_with(config).await;
    bridge.bus.busy_for(u32::MAX);
    bridge.bus.reset_stats();

    let json = common::get(bridge.addr, "/tally?cam=1&pgm=1").await.json();

    assert_eq!(json["success"], false);
    assert_eq!(bridge.bus.stats().writes, 0);

    bridge.stop().await;
}

#[tokio::test]
async fn abandoned_request_gets_no_response_and_no_bus_traffic() {
    let bridge = common::start_bridge().await;
    bridge.bus.reset_stats();

    let mut stream = TcpStream::connect(bridge.addr).await.unwrap();
    stream
        .write_all(b"GET /tally?cam=2&pgm=1 HTTP/1.1\r\nHost: bridge\r\n")
        .await
        .unwrap();
    stream.shutdown().await.unwrap();

    let mut received = Vec::new();
    stream.read_to_end(&mut received).await.unwrap();
    assert!(received.is_empty());
    assert_eq!(bridge.bus.stats(), BusStats::default());

    // The bridge moves on to the next client.
    assert_eq!(common::get(bridge.addr, "/status").await.status, 200);

    bridge.stop().await;
}

#[tokio::test]
async fn oversized_path_is_truncated_not_rejected() {
    let bridge = common::start_bridge().await;
    let long = "a".repeat(PATH_CAPACITY + 100);

    let response = common::get(bridge.addr, &format!("/{}?q=1", long)).await;

    assert_eq!(response.status, 404);
    let kept = "a".repeat(PATH_CAPACITY);
    let over = "a".repeat(PATH_CAPACITY + 1);
    assert!(response.body.contains(&kept));
    assert!(!response.body.contains(&over));
    assert!(response.body.contains("<b>Arguments:</b> q=1"));

    bridge.stop().await;
}

#[tokio::test]
async fn oversized_tally_query_still_routes() {
    let bridge = common::start_bridge().await;
    let padding = "x".repeat(600);

    let json = common::get(bridge.addr, &format!("/tally?cam=2&pgm=1&pad={}", padding))
        .await
        .json();

    assert_eq!(json["camera"], 2);
    assert_eq!(json["success"], true);

    bridge.stop().await;
}

#[tokio::test]
async fn markup_in_unknown_path_is_escaped() {
    let bridge = common::start_bridge().await;

    let response = common::get(bridge.addr, "/<script>?a=\"b\"").await;

    assert_eq!(response.status, 404);
    assert!(response.body.contains("&lt;script&gt;"));
    assert!(!response.body.contains("<script>"));

    bridge.stop().await;
}

#[tokio::test]
async fn repeated_identical_command_is_idempotent() {
    let bridge = common::start_bridge().await;

    for _ in 0..3 {
        let json = common::get(bridge.addr, "/tally?cam=1&pgm=1&pvw=1").await.json();
        assert_eq!(json["success"], true);
    }
    assert_eq!(bridge.bus.register(cam(1)), TallyState::new(true, true));

    bridge.stop().await;
}

#[tokio::test]
async fn slow_writer_is_served_once_complete() {
    let bridge = common::start_bridge().await;

    let mut stream = TcpStream::connect(bridge.addr).await.unwrap();
    stream.write_all(b"GET /status HT").await.unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;
    stream.write_all(b"TP/1.1\r\n\r\n").await.unwrap();

    let mut received = Vec::new();
    stream.read_to_end(&mut received).await.unwrap();
    assert_eq!(common::parse_response(&received).status, 200);

    bridge.stop().await;
}
