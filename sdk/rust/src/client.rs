use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};

/// Body of `GET /tally`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TallyResponse {
    pub camera: u8,
    pub program: bool,
    pub preview: bool,
    /// True only when the device read back exactly what was requested.
    pub success: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CameraState {
    pub program: bool,
    pub preview: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CameraStatus {
    pub id: u8,
    pub connected: bool,
    pub state: CameraState,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceStatus {
    pub device_status: String,
}

/// Body of `GET /status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusResponse {
    pub device: String,
    pub version: String,
    pub cameras: Vec<CameraStatus>,
    pub status: DeviceStatus,
}

impl StatusResponse {
    pub fn camera(&self, id: u8) -> Option<&CameraStatus> {
        self.cameras.iter().find(|c| c.id == id)
    }
}

pub struct TallyClient {
    client: Client,
    bridge_url: String,
}

impl TallyClient {
    pub fn new(bridge_url: &str) -> Self {
        Self {
            client: Client::new(),
            bridge_url: bridge_url.trim_end_matches('/').to_string(),
        }
    }

    /// Set program/preview for one camera (1..=4).
    pub async fn set_tally(
        &self,
        camera: u8,
        program: bool,
        preview: bool,
    ) -> Result<TallyResponse, Box<dyn std::error::Error>> {
        let path = format!(
            "/tally?cam={}&pgm={}&pvw={}",
            camera,
            u8::from(program),
            u8::from(preview)
        );
        self.get_json(&path).await
    }

    /// Turn both indicators off for one camera.
    pub async fn clear(&self, camera: u8) -> Result<TallyResponse, Box<dyn std::error::Error>> {
        self.set_tally(camera, false, false).await
    }

    pub async fn status(&self) -> Result<StatusResponse, Box<dyn std::error::Error>> {
        self.get_json("/status").await
    }

    /// The bridge's HTML info page.
    pub async fn index_page(&self) -> Result<String, reqwest::Error> {
        self.get("/").await?.text().await
    }

    /// Raw GET against the bridge; `path` includes the leading slash and any query.
    pub async fn get(&self, path: &str) -> Result<Response, reqwest::Error> {
        self.client
            .get(format!("{}{}", self.bridge_url, path))
            .send()
            .await
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<T, Box<dyn std::error::Error>> {
        let resp = self.get(path).await?;

        let status = resp.status();
        let text = resp.text().await?;

        if !status.is_success() {
            return Err(format!("Bridge returned error status {}: {}", status, text).into());
        }

        Ok(serde_json::from_str::<T>(&text)?)
    }
}
