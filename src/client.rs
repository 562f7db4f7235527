// Typed wrappers around the monitor backend's REST surface

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::error::{ApiError, ApiResult};
use crate::models::{ConnectionEvent, DashboardStatus, Device, Statistics};

/// Everything the dashboard needs from the backend. Implementations never
/// panic or leak transport details; every failure comes back as an [`ApiError`].
#[async_trait]
pub trait Backend: Send + Sync {
    async fn get_status(&self) -> ApiResult<DashboardStatus>;
    async fn get_statistics(&self) -> ApiResult<Statistics>;
    async fn get_devices(&self) -> ApiResult<Vec<Device>>;
    async fn get_events(&self, limit: usize) -> ApiResult<Vec<ConnectionEvent>>;
    async fn get_device_detail(&self, mac_address: &str) -> ApiResult<Device>;
    async fn start_monitoring(&self) -> ApiResult<()>;
    async fn stop_monitoring(&self) -> ApiResult<()>;
    async fn trigger_scan(&self) -> ApiResult<()>;
}

#[derive(Deserialize)]
struct DevicesEnvelope {
    #[serde(default)]
    devices: Vec<Device>,
}

#[derive(Deserialize)]
struct EventsEnvelope {
    #[serde(default)]
    events: Vec<ConnectionEvent>,
}

#[derive(Deserialize)]
struct DeviceEnvelope {
    device: Device,
}

pub struct HttpBackend {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpBackend {
    /// `timeout` of `None` leaves request timing entirely to the transport.
    pub fn new(base_url: &str, timeout: Option<Duration>) -> anyhow::Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        let base_url = Url::parse(base_url)
            .map_err(|e| anyhow::anyhow!("Invalid API URL {}: {}", base_url, e))?;
        if base_url.cannot_be_a_base() {
            return Err(anyhow::anyhow!("API URL {} cannot carry a path", base_url));
        }

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Appends path segments to the base URL, percent-encoding each one.
    pub fn endpoint(&self, segments: &[&str]) -> ApiResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                ApiError::transport(format!("API URL {} cannot carry a path", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json(&self, url: Url) -> ApiResult<Value> {
        debug!("GET {}", url);
        let response = self.client.get(url).send().await?;
        let status = response.status();
        let body = response.bytes().await?;
        classify_response(status, &body)
    }

    async fn post_action(&self, action: &str) -> ApiResult<()> {
        let url = self.endpoint(&["api", "control", action])?;
        debug!("POST {}", url);
        let response = self.client.post(url).send().await?;
        let status = response.status();
        let body = response.bytes().await?;
        classify_response(status, &body).map(|_| ())
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn get_status(&self) -> ApiResult<DashboardStatus> {
        let body = self.get_json(self.endpoint(&["api", "status"])?).await?;
        decode(body)
    }

    async fn get_statistics(&self) -> ApiResult<Statistics> {
        let body = self.get_json(self.endpoint(&["api", "statistics"])?).await?;
        decode(body)
    }

    async fn get_devices(&self) -> ApiResult<Vec<Device>> {
        let body = self.get_json(self.endpoint(&["api", "devices"])?).await?;
        decode::<DevicesEnvelope>(body).map(|envelope| envelope.devices)
    }

    async fn get_events(&self, limit: usize) -> ApiResult<Vec<ConnectionEvent>> {
        let mut url = self.endpoint(&["api", "events"])?;
        url.query_pairs_mut().append_pair("limit", &limit.to_string());
        let body = self.get_json(url).await?;
        decode::<EventsEnvelope>(body).map(|envelope| envelope.events)
    }

    async fn get_device_detail(&self, mac_address: &str) -> ApiResult<Device> {
        let body = self
            .get_json(self.endpoint(&["api", "device", mac_address])?)
            .await?;
        decode::<DeviceEnvelope>(body).map(|envelope| envelope.device)
    }

    async fn start_monitoring(&self) -> ApiResult<()> {
        self.post_action("start").await
    }

    async fn stop_monitoring(&self) -> ApiResult<()> {
        self.post_action("stop").await
    }

    async fn trigger_scan(&self) -> ApiResult<()> {
        self.post_action("scan").await
    }
}

/// Sorts a raw response into payload, application error or transport error.
///
/// An `error` field wins over the status code, so a 404 carrying
/// `{"error": "Device not found"}` is an application error. A 2xx is only a
/// success when the body parses and has no `error`.
pub fn classify_response(status: StatusCode, body: &[u8]) -> ApiResult<Value> {
    let value: Value = match serde_json::from_slice(body) {
        Ok(value) => value,
        Err(_) if !status.is_success() => {
            return Err(ApiError::transport(format!("HTTP {}", status)))
        }
        Err(e) => return Err(e.into()),
    };

    match value.get("error") {
        None | Some(Value::Null) => {}
        Some(Value::String(message)) => return Err(ApiError::application(message.clone())),
        Some(other) => return Err(ApiError::application(other.to_string())),
    }

    if !status.is_success() {
        return Err(ApiError::http_status(status));
    }

    Ok(value)
}

fn decode<T: DeserializeOwned>(value: Value) -> ApiResult<T> {
    Ok(serde_json::from_value(value)?)
}
