// In-memory backend with a simulated home network (demo mode and tests)

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, Local, Timelike};

use crate::client::Backend;
use crate::error::{ApiError, ApiResult};
use crate::models::{
    ConnectionEvent, DashboardStatus, Device, EventType, HourlyActivity, Statistics,
};

const HISTORY_LIMIT: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Status,
    Statistics,
    Devices,
    Events,
    DeviceDetail,
    Start,
    Stop,
    Scan,
}

struct MockState {
    monitoring_active: bool,
    network: String,
    scan_interval: u64,
    devices: Vec<Device>,
    events: Vec<ConnectionEvent>,
    failures: HashMap<Endpoint, ApiError>,
    calls: HashMap<Endpoint, usize>,
    scans: usize,
}

pub struct MockBackend {
    state: Mutex<MockState>,
    latency: Option<Duration>,
}

impl MockBackend {
    pub fn new(devices: Vec<Device>, events: Vec<ConnectionEvent>) -> Self {
        Self {
            state: Mutex::new(MockState {
                monitoring_active: true,
                network: "192.168.1.0/24".to_string(),
                scan_interval: 60,
                devices,
                events,
                failures: HashMap::new(),
                calls: HashMap::new(),
                scans: 0,
            }),
            latency: None,
        }
    }

    /// A small household network with some connection history.
    pub fn demo() -> Self {
        let now = Local::now();
        #[rustfmt::skip]
        let devices = vec![
            demo_device("3C:22:FB:10:AA:01", "192.168.1.10", Some("macbook-pro"),
                Some("Work Laptop"), "Apple", true, now, 2),
            demo_device("B8:27:EB:44:12:9C", "192.168.1.23", Some("raspberrypi"), None,
                "Raspberry Pi", true, now, 14),
            demo_device("F0:9F:C2:7A:33:10", "192.168.1.40", None, Some("Living Room TV"),
                "Samsung", false, now, 95),
            demo_device("00:17:88:6B:2C:4D", "192.168.1.52", Some("hue-bridge"), None,
                "Philips", true, now, 300),
            demo_device("AC:BC:32:91:0E:77", "192.168.1.61", Some("pixel-8"), None,
                "Google", false, now, 3000),
        ];

        let mut events = Vec::new();
        for (idx, device) in devices.iter().enumerate() {
            let event_type = if device.is_connected {
                EventType::Connected
            } else {
                EventType::Disconnected
            };
            events.push(ConnectionEvent {
                event_type,
                mac_address: device.mac_address.clone(),
                ip_address: device.ip_address.clone(),
                hostname: device.hostname.clone(),
                device_name: device.device_name.clone(),
                event_time: device
                    .last_seen
                    .map(|seen| seen - ChronoDuration::seconds(idx as i64)),
            });
        }
        events.sort_by(|a, b| b.event_time.cmp(&a.event_time));

        Self::new(devices, events)
    }

    #[cfg(test)]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    #[cfg(test)]
    pub fn fail(&self, endpoint: Endpoint, error: ApiError) {
        self.state().failures.insert(endpoint, error);
    }

    #[cfg(test)]
    pub fn set_monitoring(&self, active: bool) {
        self.state().monitoring_active = active;
    }

    #[cfg(test)]
    pub fn calls(&self, endpoint: Endpoint) -> usize {
        self.state().calls.get(&endpoint).copied().unwrap_or(0)
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Records the call, waits out the simulated latency, then reports any
    /// configured failure for the endpoint.
    async fn enter(&self, endpoint: Endpoint) -> ApiResult<()> {
        *self.state().calls.entry(endpoint).or_insert(0) += 1;
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        match self.state().failures.get(&endpoint) {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn demo_device(
    mac: &str,
    ip: &str,
    hostname: Option<&str>,
    name: Option<&str>,
    vendor: &str,
    connected: bool,
    now: DateTime<Local>,
    minutes_ago: i64,
) -> Device {
    Device {
        mac_address: mac.to_string(),
        ip_address: Some(ip.to_string()),
        hostname: hostname.map(str::to_string),
        device_name: name.map(str::to_string),
        device_type: None,
        vendor: Some(vendor.to_string()),
        is_connected: connected,
        first_seen: Some(now - ChronoDuration::days(30)),
        last_seen: Some(now - ChronoDuration::minutes(minutes_ago)),
        history: Vec::new(),
    }
}

#[async_trait]
impl Backend for MockBackend {
    async fn get_status(&self) -> ApiResult<DashboardStatus> {
        self.enter(Endpoint::Status).await?;
        let state = self.state();
        Ok(DashboardStatus {
            monitoring_active: state.monitoring_active,
            network: state.network.clone(),
            scan_interval: state.scan_interval,
            connected_devices: state.devices.iter().filter(|d| d.is_connected).count() as u64,
            total_devices: state.devices.len() as u64,
        })
    }

    async fn get_statistics(&self) -> ApiResult<Statistics> {
        self.enter(Endpoint::Statistics).await?;
        let state = self.state();
        let since = Local::now() - ChronoDuration::hours(24);

        let mut statistics = Statistics::default();
        let mut hourly: HashMap<u32, HourlyActivity> = HashMap::new();
        for event in &state.events {
            let Some(at) = event.event_time.filter(|at| *at >= since) else {
                continue;
            };
            let bucket = hourly.entry(at.hour()).or_insert(HourlyActivity {
                hour: at.hour(),
                ..HourlyActivity::default()
            });
            match event.event_type {
                EventType::Connected => {
                    statistics.connections_24h += 1;
                    bucket.connections += 1;
                }
                EventType::Disconnected => {
                    statistics.disconnections_24h += 1;
                    bucket.disconnections += 1;
                }
            }
        }
        statistics.hourly_activity = hourly.into_values().collect();
        statistics.hourly_activity.sort_by_key(|bucket| bucket.hour);
        Ok(statistics)
    }

    async fn get_devices(&self) -> ApiResult<Vec<Device>> {
        self.enter(Endpoint::Devices).await?;
        Ok(self.state().devices.clone())
    }

    async fn get_events(&self, limit: usize) -> ApiResult<Vec<ConnectionEvent>> {
        self.enter(Endpoint::Events).await?;
        Ok(self.state().events.iter().take(limit).cloned().collect())
    }

    async fn get_device_detail(&self, mac_address: &str) -> ApiResult<Device> {
        self.enter(Endpoint::DeviceDetail).await?;
        let state = self.state();
        let mut device = state
            .devices
            .iter()
            .find(|d| d.has_mac(mac_address))
            .cloned()
            .ok_or_else(|| ApiError::application("Device not found"))?;

        device.history = state
            .events
            .iter()
            .filter(|e| e.mac_address.eq_ignore_ascii_case(mac_address))
            .take(HISTORY_LIMIT)
            .map(|e| ConnectionEvent {
                event_type: e.event_type,
                mac_address: String::new(),
                ip_address: e.ip_address.clone(),
                hostname: None,
                device_name: None,
                event_time: e.event_time,
            })
            .collect();
        Ok(device)
    }

    async fn start_monitoring(&self) -> ApiResult<()> {
        self.enter(Endpoint::Start).await?;
        self.state().monitoring_active = true;
        Ok(())
    }

    async fn stop_monitoring(&self) -> ApiResult<()> {
        self.enter(Endpoint::Stop).await?;
        self.state().monitoring_active = false;
        Ok(())
    }

    /// Flips one device per scan, round-robin, and logs the change.
    async fn trigger_scan(&self) -> ApiResult<()> {
        self.enter(Endpoint::Scan).await?;
        let mut state = self.state();
        if state.devices.is_empty() {
            return Ok(());
        }

        let idx = state.scans % state.devices.len();
        state.scans += 1;
        let now = Local::now();

        let device = &mut state.devices[idx];
        device.is_connected = !device.is_connected;
        device.last_seen = Some(now);
        let event = ConnectionEvent {
            event_type: if device.is_connected {
                EventType::Connected
            } else {
                EventType::Disconnected
            },
            mac_address: device.mac_address.clone(),
            ip_address: device.ip_address.clone(),
            hostname: device.hostname.clone(),
            device_name: device.device_name.clone(),
            event_time: Some(now),
        };
        state.events.insert(0, event);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unknown_device_is_application_error() {
        let backend = MockBackend::demo();
        let err = backend.get_device_detail("00:00:00:00:00:00").await.unwrap_err();
        assert_eq!(err.backend_message(), Some("Device not found"));
    }

    #[tokio::test]
    async fn test_detail_history_is_newest_first() {
        let backend = MockBackend::demo();
        backend.trigger_scan().await.unwrap();
        backend.trigger_scan().await.unwrap();

        let detail = backend.get_device_detail("3c:22:fb:10:aa:01").await.unwrap();
        assert_eq!(detail.history.len(), 2);
        assert!(detail.history[0].event_time >= detail.history[1].event_time);
        assert_eq!(detail.history[0].event_type, EventType::Disconnected);
    }

    #[tokio::test]
    async fn test_scan_flips_device_and_logs_event() {
        let backend = MockBackend::demo();
        let before = backend.get_status().await.unwrap();
        backend.trigger_scan().await.unwrap();
        let after = backend.get_status().await.unwrap();

        assert_eq!(after.connected_devices + 1, before.connected_devices);
        let events = backend.get_events(1).await.unwrap();
        assert_eq!(events[0].mac_address, "3C:22:FB:10:AA:01");
    }
}
