use chrono::{DateTime, Local, NaiveDateTime, TimeZone};
use serde::{Deserialize, Deserializer};

// Direction of a connection log entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    Connected,
    Disconnected,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Connected => "CONNECTED",
            EventType::Disconnected => "DISCONNECTED",
        }
    }
}

/// A single connect/disconnect entry from the backend's connection log.
///
/// Entries nested in a device's `history` carry no MAC of their own, so
/// `mac_address` is empty there.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ConnectionEvent {
    pub event_type: EventType,
    #[serde(default)]
    pub mac_address: String,
    #[serde(default)]
    pub ip_address: Option<String>,
    #[serde(default)]
    pub hostname: Option<String>,
    #[serde(default)]
    pub device_name: Option<String>,
    #[serde(default, deserialize_with = "timestamp::deserialize")]
    pub event_time: Option<DateTime<Local>>,
}

// Struct to hold information about a monitored network device
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Device {
    pub mac_address: String,
    #[serde(default)]
    pub ip_address: Option<String>,
    #[serde(default)]
    pub hostname: Option<String>,
    #[serde(default)]
    pub device_name: Option<String>,
    #[serde(default)]
    pub device_type: Option<String>,
    #[serde(default)]
    pub vendor: Option<String>,
    #[serde(default)]
    pub is_connected: bool,
    #[serde(default, deserialize_with = "timestamp::deserialize")]
    pub first_seen: Option<DateTime<Local>>,
    #[serde(default, deserialize_with = "timestamp::deserialize")]
    pub last_seen: Option<DateTime<Local>>,
    /// Newest-first; only filled in by the device detail endpoint.
    #[serde(default)]
    pub history: Vec<ConnectionEvent>,
}

impl Device {
    pub fn has_mac(&self, mac_address: &str) -> bool {
        self.mac_address.eq_ignore_ascii_case(mac_address)
    }

    /// Text the search box matches against: name, hostname, IP and MAC,
    /// absent or blank fields skipped.
    pub fn search_haystack(&self) -> String {
        [
            self.device_name.as_deref(),
            self.hostname.as_deref(),
            self.ip_address.as_deref(),
            Some(self.mac_address.as_str()),
        ]
        .into_iter()
        .flatten()
        .filter(|field| !field.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct DashboardStatus {
    #[serde(default)]
    pub monitoring_active: bool,
    #[serde(default)]
    pub network: String,
    #[serde(default)]
    pub scan_interval: u64,
    #[serde(default)]
    pub connected_devices: u64,
    #[serde(default)]
    pub total_devices: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct HourlyActivity {
    pub hour: u32,
    #[serde(default)]
    pub connections: u64,
    #[serde(default)]
    pub disconnections: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Statistics {
    #[serde(default)]
    pub connections_24h: u64,
    #[serde(default)]
    pub disconnections_24h: u64,
    #[serde(default)]
    pub hourly_activity: Vec<HourlyActivity>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    Connected,
    Disconnected,
}

impl StatusFilter {
    pub const ALL: [StatusFilter; 3] = [
        StatusFilter::All,
        StatusFilter::Connected,
        StatusFilter::Disconnected,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StatusFilter::All => "All Devices",
            StatusFilter::Connected => "Connected",
            StatusFilter::Disconnected => "Disconnected",
        }
    }

    pub fn matches(&self, device: &Device) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Connected => device.is_connected,
            StatusFilter::Disconnected => !device.is_connected,
        }
    }
}

/// Client-side device filter. Only user input changes it; it outlives every refresh.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    pub status_filter: StatusFilter,
    pub search_text: String,
}

impl FilterState {
    pub fn is_identity(&self) -> bool {
        self.status_filter == StatusFilter::All && self.search_text.is_empty()
    }

    pub fn matches(&self, device: &Device) -> bool {
        if !self.status_filter.matches(device) {
            return false;
        }
        if self.search_text.is_empty() {
            return true;
        }
        device
            .search_haystack()
            .contains(&self.search_text.to_lowercase())
    }
}

/// Backend timestamps are ISO-8601, usually without an offset (server local time).
/// Anything unparseable is treated as absent.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Local>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Local));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
        .and_then(|naive| Local.from_local_datetime(&naive).earliest())
}

mod timestamp {
    use super::*;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Local>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        Ok(raw.as_deref().and_then(parse_timestamp))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn test_device_from_backend_json() {
        let device: Device = serde_json::from_value(serde_json::json!({
            "mac_address": "AA:BB:CC:DD:EE:FF",
            "ip_address": "192.168.1.5",
            "hostname": null,
            "device_name": "printer",
            "is_connected": true,
            "first_seen": "2024-03-01T08:15:00",
            "last_seen": "2024-03-02T09:30:45.123456"
        }))
        .unwrap();

        assert_eq!(device.ip_address.as_deref(), Some("192.168.1.5"));
        assert!(device.hostname.is_none());
        assert!(device.history.is_empty());
        assert_eq!(device.last_seen.unwrap().minute(), 30);
        assert!(device.has_mac("aa:bb:cc:dd:ee:ff"));
    }

    #[test]
    fn test_history_entry_without_mac() {
        let event: ConnectionEvent = serde_json::from_value(serde_json::json!({
            "event_type": "DISCONNECTED",
            "event_time": "2024-03-02T09:30:45",
            "ip_address": "10.0.0.7"
        }))
        .unwrap();

        assert_eq!(event.event_type, EventType::Disconnected);
        assert!(event.mac_address.is_empty());
        assert!(event.event_time.is_some());
    }

    #[test]
    fn test_unparseable_timestamp_is_absent() {
        assert!(parse_timestamp("yesterday").is_none());
        assert!(parse_timestamp("2024-03-02T09:30:45+02:00").is_some());
    }

    #[test]
    fn test_search_haystack_skips_blank_fields() {
        let device = Device {
            mac_address: "AA:BB".to_string(),
            ip_address: Some(String::new()),
            hostname: Some("NAS".to_string()),
            device_name: None,
            device_type: None,
            vendor: None,
            is_connected: false,
            first_seen: None,
            last_seen: None,
            history: Vec::new(),
        };
        assert_eq!(device.search_haystack(), "nas aa:bb");
    }

    #[test]
    fn test_status_counts_default_to_zero() {
        let status: DashboardStatus = serde_json::from_value(serde_json::json!({
            "monitoring_active": true,
            "network": "192.168.1.0/24",
            "scan_interval": 60
        }))
        .unwrap();
        assert_eq!(status.connected_devices, 0);
        assert_eq!(status.total_devices, 0);
    }
}
