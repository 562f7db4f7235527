// View models for every dashboard region. Plain data built from store and
// controller state. Text fields hold raw backend strings: `markup` escapes
// them, `ui` draws them as plain text.

use chrono::{DateTime, Local};

use crate::actions::{Dashboard, ModalState, ScanControl, Toast, ToastKind};
use crate::format::{format_clock, format_optional, or_placeholder};
use crate::models::{
    ConnectionEvent, DashboardStatus, Device, EventType, HourlyActivity, Statistics,
};
use crate::scheduler::SchedulerState;
use crate::store::DashboardStore;

pub const DEVICES_LOADING: &str = "Loading devices...";
pub const NO_DEVICES: &str = "No devices found";
pub const EVENTS_LOADING: &str = "Loading events...";
pub const NO_EVENTS: &str = "No recent events";
pub const MODAL_LOADING: &str = "Loading device details...";
pub const HISTORY_TITLE: &str = "Connection History (Last 100 Events)";

const UNKNOWN_DEVICE: &str = "Unknown Device";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Success,
    Danger,
    Neutral,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Badge {
    pub connected: bool,
}

impl Badge {
    pub fn label(&self) -> &'static str {
        if self.connected {
            "Connected"
        } else {
            "Disconnected"
        }
    }

    pub fn css_class(&self) -> &'static str {
        if self.connected {
            "connected"
        } else {
            "disconnected"
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToggleControlView {
    pub label: &'static str,
    pub icon: &'static str,
    pub css_class: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusBarView {
    pub status_text: &'static str,
    pub tone: Tone,
    pub network: String,
    pub scan_interval: String,
    pub last_update: Option<String>,
    pub connected_count: u64,
    pub total_count: u64,
    pub toggle: ToggleControlView,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatisticsView {
    pub connections_24h: u64,
    pub disconnections_24h: u64,
    pub hourly: Vec<HourlyActivity>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceRowView {
    pub badge: Badge,
    pub name: String,
    pub ip_address: String,
    pub mac_address: String,
    pub hostname: String,
    pub last_seen: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceTableView {
    Loading,
    Empty,
    Rows(Vec<DeviceRowView>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventItemView {
    pub badge: Badge,
    /// Arrow direction: up for a connect, down for a disconnect.
    pub icon: &'static str,
    pub title: String,
    pub details: String,
    pub time: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventListView {
    Loading,
    Empty,
    Items(Vec<EventItemView>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Code(String),
    Badge(Badge),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InfoField {
    pub label: &'static str,
    pub value: FieldValue,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryRowView {
    pub badge: Badge,
    pub time: String,
    pub ip_address: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceDetailView {
    pub fields: Vec<InfoField>,
    pub history: Vec<HistoryRowView>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModalView {
    Hidden,
    Loading,
    Error(String),
    Detail(DeviceDetailView),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToastView {
    pub message: String,
    pub kind: ToastKind,
}

impl ToastView {
    pub fn css_class(&self) -> &'static str {
        match self.kind {
            ToastKind::Info => "info",
            ToastKind::Success => "success",
            ToastKind::Error => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanButtonView {
    pub label: &'static str,
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardView {
    pub status_bar: StatusBarView,
    pub statistics: StatisticsView,
    pub devices: DeviceTableView,
    pub events: EventListView,
    pub modal: ModalView,
    pub toast: Option<ToastView>,
    pub scan_button: ScanButtonView,
    pub auto_refresh: bool,
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

fn display_name<'a>(
    device_name: Option<&'a str>,
    hostname: Option<&'a str>,
    fallback: &'a str,
) -> String {
    non_empty(device_name)
        .or_else(|| non_empty(hostname))
        .unwrap_or(fallback)
        .to_string()
}

pub fn toggle_control(monitoring_active: bool) -> ToggleControlView {
    if monitoring_active {
        ToggleControlView {
            label: "Stop",
            icon: "stop",
            css_class: "monitoring-active",
        }
    } else {
        ToggleControlView {
            label: "Start",
            icon: "play",
            css_class: "",
        }
    }
}

pub fn status_bar(
    status: Option<&DashboardStatus>,
    last_update: Option<DateTime<Local>>,
) -> StatusBarView {
    let last_update = last_update.map(|ts| format!("Last Update: {}", format_clock(ts)));
    match status {
        Some(status) => StatusBarView {
            status_text: if status.monitoring_active {
                "Monitoring Active"
            } else {
                "Monitoring Stopped"
            },
            tone: if status.monitoring_active {
                Tone::Success
            } else {
                Tone::Danger
            },
            network: or_placeholder(Some(&status.network)),
            scan_interval: format!("{}s", status.scan_interval),
            last_update,
            connected_count: status.connected_devices,
            total_count: status.total_devices,
            toggle: toggle_control(status.monitoring_active),
        },
        None => StatusBarView {
            status_text: "Connecting...",
            tone: Tone::Neutral,
            network: or_placeholder(None),
            scan_interval: or_placeholder(None),
            last_update,
            connected_count: 0,
            total_count: 0,
            toggle: toggle_control(false),
        },
    }
}

pub fn statistics(statistics: Option<&Statistics>) -> StatisticsView {
    match statistics {
        Some(stats) => StatisticsView {
            connections_24h: stats.connections_24h,
            disconnections_24h: stats.disconnections_24h,
            hourly: stats.hourly_activity.clone(),
        },
        None => StatisticsView {
            connections_24h: 0,
            disconnections_24h: 0,
            hourly: Vec::new(),
        },
    }
}

pub fn device_row(device: &Device, now: DateTime<Local>) -> DeviceRowView {
    DeviceRowView {
        badge: Badge {
            connected: device.is_connected,
        },
        name: display_name(
            device.device_name.as_deref(),
            device.hostname.as_deref(),
            UNKNOWN_DEVICE,
        ),
        ip_address: or_placeholder(device.ip_address.as_deref()),
        mac_address: device.mac_address.clone(),
        hostname: or_placeholder(device.hostname.as_deref()),
        last_seen: format_optional(device.last_seen, now),
    }
}

pub fn device_table(store: &DashboardStore, now: DateTime<Local>) -> DeviceTableView {
    if !store.devices_loaded() {
        return DeviceTableView::Loading;
    }
    let visible = store.visible_devices();
    if visible.is_empty() {
        return DeviceTableView::Empty;
    }
    DeviceTableView::Rows(visible.into_iter().map(|d| device_row(d, now)).collect())
}

pub fn event_item(event: &ConnectionEvent, now: DateTime<Local>) -> EventItemView {
    let connected = event.event_type == EventType::Connected;
    EventItemView {
        badge: Badge { connected },
        icon: if connected { "arrow-up" } else { "arrow-down" },
        title: display_name(
            event.device_name.as_deref(),
            event.hostname.as_deref(),
            UNKNOWN_DEVICE,
        ),
        details: format!(
            "{} • {} • {}",
            event.event_type.as_str(),
            or_placeholder(event.ip_address.as_deref()),
            event.mac_address
        ),
        time: format_optional(event.event_time, now),
    }
}

pub fn event_list(store: &DashboardStore, now: DateTime<Local>) -> EventListView {
    if !store.events_loaded() {
        return EventListView::Loading;
    }
    if store.events().is_empty() {
        return EventListView::Empty;
    }
    EventListView::Items(store.events().iter().map(|e| event_item(e, now)).collect())
}

pub fn device_detail(device: &Device, now: DateTime<Local>) -> DeviceDetailView {
    let text = |value: Option<&str>| FieldValue::Text(or_placeholder(value));
    let fields = vec![
        InfoField {
            label: "Status",
            value: FieldValue::Badge(Badge {
                connected: device.is_connected,
            }),
        },
        InfoField {
            label: "Device Name",
            value: FieldValue::Text(display_name(
                device.device_name.as_deref(),
                device.hostname.as_deref(),
                "Unknown",
            )),
        },
        InfoField {
            label: "IP Address",
            value: text(device.ip_address.as_deref()),
        },
        InfoField {
            label: "MAC Address",
            value: FieldValue::Code(device.mac_address.clone()),
        },
        InfoField {
            label: "Hostname",
            value: text(device.hostname.as_deref()),
        },
        InfoField {
            label: "Device Type",
            value: text(device.device_type.as_deref()),
        },
        InfoField {
            label: "Vendor",
            value: text(device.vendor.as_deref()),
        },
        InfoField {
            label: "First Seen",
            value: FieldValue::Text(format_optional(device.first_seen, now)),
        },
        InfoField {
            label: "Last Seen",
            value: FieldValue::Text(format_optional(device.last_seen, now)),
        },
    ];

    let history = device
        .history
        .iter()
        .map(|event| HistoryRowView {
            badge: Badge {
                connected: event.event_type == EventType::Connected,
            },
            time: format_optional(event.event_time, now),
            ip_address: or_placeholder(event.ip_address.as_deref()),
        })
        .collect();

    DeviceDetailView { fields, history }
}

pub fn modal(state: &ModalState, now: DateTime<Local>) -> ModalView {
    match state {
        ModalState::Closed => ModalView::Hidden,
        ModalState::Loading { .. } => ModalView::Loading,
        ModalState::Error { message, .. } => ModalView::Error(message.clone()),
        ModalState::Loaded { device } => ModalView::Detail(device_detail(device, now)),
    }
}

pub fn toast(toast: Option<&Toast>) -> Option<ToastView> {
    toast.map(|t| ToastView {
        message: t.message.clone(),
        kind: t.kind,
    })
}

pub fn scan_button(scan: ScanControl) -> ScanButtonView {
    ScanButtonView {
        label: scan.label(),
        enabled: scan.enabled(),
    }
}

pub fn dashboard_view(dashboard: &Dashboard, now: DateTime<Local>) -> DashboardView {
    let store = dashboard.store();
    DashboardView {
        status_bar: status_bar(store.status(), store.last_update()),
        statistics: statistics(store.statistics()),
        devices: device_table(store, now),
        events: event_list(store, now),
        modal: modal(dashboard.modal(), now),
        toast: toast(dashboard.toast()),
        scan_button: scan_button(dashboard.scan_control()),
        auto_refresh: dashboard.scheduler_state() == SchedulerState::Running,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn device(mac: &str, connected: bool) -> Device {
        Device {
            mac_address: mac.to_string(),
            ip_address: None,
            hostname: None,
            device_name: None,
            device_type: None,
            vendor: None,
            is_connected: connected,
            first_seen: None,
            last_seen: None,
            history: Vec::new(),
        }
    }

    #[test]
    fn test_toggle_follows_monitoring_state() {
        assert_eq!(toggle_control(true).label, "Stop");
        assert_eq!(toggle_control(true).css_class, "monitoring-active");
        assert_eq!(toggle_control(false).label, "Start");
        assert_eq!(toggle_control(false).icon, "play");
    }

    #[test]
    fn test_missing_fields_render_placeholder() {
        let row = device_row(&device("AA:BB:CC:DD:EE:FF", true), Local::now());
        assert_eq!(row.name, "Unknown Device");
        assert_eq!(row.ip_address, "-");
        assert_eq!(row.hostname, "-");
        assert_eq!(row.last_seen, "-");
    }

    #[test]
    fn test_name_falls_back_to_hostname() {
        let mut d = device("AA", true);
        d.device_name = Some(String::new());
        d.hostname = Some("nas".to_string());
        assert_eq!(device_row(&d, Local::now()).name, "nas");
    }

    #[test]
    fn test_empty_visible_set_renders_empty_state() {
        let mut store = DashboardStore::new(false);
        assert_eq!(device_table(&store, Local::now()), DeviceTableView::Loading);

        let mut d = device("AA:BB:CC:DD:EE:FF", true);
        d.ip_address = Some("192.168.1.5".to_string());
        store.apply_devices(1, vec![d]);
        store.set_status_filter(crate::models::StatusFilter::Disconnected);
        assert_eq!(device_table(&store, Local::now()), DeviceTableView::Empty);
    }

    #[test]
    fn test_event_item_shape() {
        let now = Local::now();
        let event = ConnectionEvent {
            event_type: EventType::Disconnected,
            mac_address: "AA:BB".to_string(),
            ip_address: None,
            hostname: Some("phone".to_string()),
            device_name: None,
            event_time: Some(now - Duration::minutes(5)),
        };
        let item = event_item(&event, now);
        assert_eq!(item.title, "phone");
        assert_eq!(item.icon, "arrow-down");
        assert_eq!(item.details, "DISCONNECTED • - • AA:BB");
        assert_eq!(item.time, "5 mins ago");
    }

    #[test]
    fn test_events_keep_backend_order() {
        let now = Local::now();
        let mut store = DashboardStore::new(false);
        let event = |mac: &str, minutes: i64| ConnectionEvent {
            event_type: EventType::Connected,
            mac_address: mac.to_string(),
            ip_address: None,
            hostname: None,
            device_name: None,
            event_time: Some(now - Duration::minutes(minutes)),
        };
        // Deliberately not time-sorted
        store.apply_events(1, vec![event("B", 30), event("A", 2), event("C", 10)]);

        match event_list(&store, now) {
            EventListView::Items(items) => {
                let macs: Vec<&str> = items
                    .iter()
                    .map(|i| i.details.rsplit(' ').next().unwrap())
                    .collect();
                assert_eq!(macs, ["B", "A", "C"]);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_detail_view_fields_and_history() {
        let now = Local::now();
        let mut d = device("AA:BB", false);
        d.vendor = Some("Apple".to_string());
        d.history = vec![ConnectionEvent {
            event_type: EventType::Connected,
            mac_address: String::new(),
            ip_address: Some("10.0.0.2".to_string()),
            hostname: None,
            device_name: None,
            event_time: Some(now),
        }];

        let view = device_detail(&d, now);
        assert_eq!(view.fields.len(), 9);
        assert_eq!(view.fields[1].value, FieldValue::Text("Unknown".to_string()));
        assert_eq!(view.fields[6].value, FieldValue::Text("Apple".to_string()));
        assert_eq!(view.fields[7].value, FieldValue::Text("-".to_string()));
        assert_eq!(view.history[0].time, "Just now");
        assert!(view.history[0].badge.connected);
    }

    #[test]
    fn test_status_bar_before_first_status() {
        let view = status_bar(None, None);
        assert_eq!(view.tone, Tone::Neutral);
        assert_eq!(view.toggle.label, "Start");
        assert!(view.last_update.is_none());
    }
}
