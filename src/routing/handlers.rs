//! Route handlers.
//!
//! Each handler produces a complete `Response`. Device failures never turn
//! into HTTP errors: they show up as `success: false` or `connected: false`.

use serde::Serialize;

use crate::http::request::RequestTarget;
use crate::http::response::{Response, Status};
use crate::routing::matcher::tally_request_from_query;
use crate::tally::{CameraId, CameraReport, TallyBus, TallyController};

/// API version reported by `/status`, independent of the crate version.
pub const API_VERSION: &str = "0.7";

/// Static documentation page served at `/`.
pub const INDEX_PAGE: &str = r#"<html><head><title>Blackmagic SDI Tally REST API</title>
<style>
body { font-family: Arial, sans-serif; margin: 40px; }
code { background: #f0f0f0; padding: 2px 5px; }
</style>
</head><body>
<h1>Blackmagic SDI Tally REST API</h1>
<p>HTTP Bridge for the Blackmagic Arduino Shield to embed SDI Tally Metadata into an SDI Signal</p>
<h2>Quick Test Links</h2>
<ul>
<li><a href="status">Get All Camera States</a></li>
<li>Camera 1: <a href="tally?cam=1&pgm=1&pvw=0">Program</a> | <a href="tally?cam=1&pgm=0&pvw=1">Preview</a> | <a href="tally?cam=1&pgm=0&pvw=0">Off</a></li>
<li>Camera 2: <a href="tally?cam=2&pgm=1&pvw=0">Program</a> | <a href="tally?cam=2&pgm=0&pvw=1">Preview</a> | <a href="tally?cam=2&pgm=0&pvw=0">Off</a></li>
</ul>
<h2>API Endpoints</h2>
<h3>Get Status</h3>
<code>GET /status</code>
<p>Returns all camera states and device information.</p>
<h3>Set Tally State</h3>
<code>GET /tally?cam=[1-4]&pgm=[0,1]&pvw=[0,1]</code>
<p>Parameters:</p>
<ul>
<li><code>cam</code>: Camera number (1-4, default 1)</li>
<li><code>pgm</code>: Program state (0=off, 1=on)</li>
<li><code>pvw</code>: Preview state (0=off, 1=on)</li>
</ul>
<hr>
<p>Get full documentation at <a href="http://github.com/airbenich/blackmagic-sdi-tally-rest-api">Github</a></p>
</body></html>
"#;

/// Body of `/tally`.
#[derive(Debug, Serialize)]
pub struct TallyResponse {
    pub camera: CameraId,
    pub program: bool,
    pub preview: bool,
    pub success: bool,
}

/// Body of `/status`.
#[derive(Debug, Serialize)]
pub struct StatusResponse<'a> {
    pub device: &'a str,
    pub version: &'static str,
    pub cameras: Vec<CameraReport>,
    pub status: DeviceStatus,
}

#[derive(Debug, Serialize)]
pub struct DeviceStatus {
    pub device_status: &'static str,
}

pub fn index() -> Response {
    Response::html(Status::Ok, INDEX_PAGE)
}

/// Apply the tally state encoded in the query and report the verdict.
pub async fn tally<B: TallyBus>(
    target: &RequestTarget<'_>,
    controller: &mut TallyController<B>,
) -> Response {
    let request = tally_request_from_query(target);

    let success = controller
        .apply(request)
        .await
        .is_ok_and(|outcome| outcome.success);

    Response::json(&TallyResponse {
        camera: request.camera,
        program: request.desired.program,
        preview: request.desired.preview,
        success,
    })
}

/// Report device identity and every camera's current state.
pub fn status<B: TallyBus>(device_name: &str, controller: &mut TallyController<B>) -> Response {
    let cameras = controller.report();
    let device_status = if cameras.iter().any(|c| c.connected) {
        "active"
    } else {
        "unreachable"
    };

    Response::json(&StatusResponse {
        device: device_name,
        version: API_VERSION,
        cameras,
        status: DeviceStatus { device_status },
    })
}

/// 404 page echoing what was asked for.
pub fn not_found(target: &RequestTarget<'_>) -> Response {
    let body = format!(
        "<html><head><title>Resource not found</title></head><body>\
         <h1>The requested resource was not found</h1>\n\
         <br><b>Resource:</b> {}\n\
         <br><b>Arguments:</b> {}\n\
         </body></html>\n",
        escape_html(&target.path_str()),
        escape_html(&target.query_str()),
    );
    Response::html(Status::NotFound, body)
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TallyConfig;
    use crate::http::response::ContentType;
    use crate::tally::{SimulatedBus, TallyState};

    fn controller(bus: &SimulatedBus) -> TallyController<SimulatedBus> {
        let mut controller = TallyController::new(bus.clone(), &TallyConfig::default());
        controller.enable_override().unwrap();
        controller
    }

    #[tokio::test]
    async fn tally_reports_requested_state_and_verdict() {
        let bus = SimulatedBus::new();
        let mut ctl = controller(&bus);
        let target = RequestTarget::new(b"tally", b"cam=2&pgm=1&pvw=0");

        let response = tally(&target, &mut ctl).await;

        assert_eq!(response.status, Status::Ok);
        assert_eq!(response.content_type, ContentType::Json);
        assert_eq!(
            response.body,
            r#"{"camera":2,"program":true,"preview":false,"success":true}"#
        );
        assert_eq!(
            bus.register(CameraId::new(2).unwrap()),
            TallyState::new(true, false)
        );
    }

    #[tokio::test]
    async fn failed_verification_is_still_ok_status() {
        let bus = SimulatedBus::new();
        bus.stick(CameraId::FIRST, TallyState::OFF);
        let mut ctl = controller(&bus);
        let target = RequestTarget::new(b"tally", b"pgm=1");

        let response = tally(&target, &mut ctl).await;

        assert_eq!(response.status, Status::Ok);
        assert!(response.body.ends_with(r#""success":false}"#));
    }

    #[tokio::test(start_paused = true)]
    async fn bus_never_ready_reports_failure() {
        let bus = SimulatedBus::new();
        bus.busy_for(u32::MAX);
        let config = TallyConfig {
            ready_timeout_ms: Some(10),
            ..TallyConfig::default()
        };
        let mut ctl = TallyController::new(bus.clone(), &config);
        let target = RequestTarget::new(b"tally", b"cam=2&pvw=1");

        let response = tally(&target, &mut ctl).await;

        assert_eq!(response.status, Status::Ok);
        assert_eq!(
            response.body,
            r#"{"camera":2,"program":false,"preview":true,"success":false}"#
        );
        assert_eq!(bus.stats().writes, 0);
    }

    #[test]
    fn index_page_links_documentation() {
        let response = index();

        assert_eq!(response.status, Status::Ok);
        assert!(response
            .body
            .contains("<title>Blackmagic SDI Tally REST API</title>"));
        assert!(response
            .body
            .contains("http://github.com/airbenich/blackmagic-sdi-tally-rest-api"));
    }

    #[test]
    fn status_lists_all_cameras() {
        let bus = SimulatedBus::new();
        bus.set_connected(CameraId::new(3).unwrap(), false);
        let mut ctl = controller(&bus);

        let response = status("bmd-sdi-tally", &mut ctl);
        let json: serde_json::Value = serde_json::from_str(&response.body).unwrap();

        assert_eq!(json["device"], "bmd-sdi-tally");
        assert_eq!(json["version"], "0.7");
        assert_eq!(json["cameras"].as_array().unwrap().len(), 4);
        assert_eq!(json["cameras"][2]["id"], 3);
        assert_eq!(json["cameras"][2]["connected"], false);
        assert_eq!(json["cameras"][0]["state"]["program"], false);
        assert_eq!(json["status"]["device_status"], "active");
    }

    #[test]
    fn status_unreachable_when_no_camera_answers() {
        let bus = SimulatedBus::new();
        for id in CameraId::all() {
            bus.set_connected(id, false);
        }
        let mut ctl = controller(&bus);

        let json: serde_json::Value =
            serde_json::from_str(&status("dev", &mut ctl).body).unwrap();
        assert_eq!(json["status"]["device_status"], "unreachable");
    }

    #[test]
    fn not_found_echoes_escaped_input() {
        let target = RequestTarget::new(b"unknown", b"x=<script>");
        let response = not_found(&target);

        assert_eq!(response.status, Status::NotFound);
        assert!(response.body.contains("unknown"));
        assert!(response.body.contains("x=&lt;script&gt;"));
        assert!(!response.body.contains("<script>"));
    }
}
