// User commands and the transient UI state they drive: toast, device modal,
// scan button. Owns the store and applies every async completion to it.

use std::sync::Arc;
use std::time::Duration;

use chrono::Local;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::client::Backend;
use crate::config::DashboardConfig;
use crate::error::{ApiError, ApiResult, ErrorKind};
use crate::models::{Device, StatusFilter};
use crate::scheduler::{
    Fetcher, MonitoringAction, RefreshScheduler, SchedulerState, Update, UpdateReceiver,
};
use crate::store::DashboardStore;

/// Everything the user can ask the dashboard to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    SetStatusFilter(StatusFilter),
    SetSearchText(String),
    ToggleMonitoring,
    TriggerScan,
    RefreshAll,
    RefreshEvents,
    OpenDeviceModal(String),
    CloseModal,
    /// Click landed outside the modal's content.
    ModalBackdropClicked,
}

impl Command {
    /// Commands issued from the page underneath the device modal.
    fn targets_page(&self) -> bool {
        !matches!(self, Command::CloseModal | Command::ModalBackdropClicked)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub id: u64,
    pub message: String,
    pub kind: ToastKind,
}

/// Single slot, no queue. A new toast replaces the visible one outright.
///
/// Every toast arms its own dismiss timer and none is ever cancelled, so an
/// older timer firing hides whatever toast is showing at that moment.
#[derive(Debug, Default)]
pub struct ToastState {
    current: Option<Toast>,
    next_id: u64,
}

impl ToastState {
    pub fn show(&mut self, message: impl Into<String>, kind: ToastKind) -> u64 {
        self.next_id += 1;
        self.current = Some(Toast {
            id: self.next_id,
            message: message.into(),
            kind,
        });
        self.next_id
    }

    pub fn expire(&mut self, _toast: u64) {
        self.current = None;
    }

    pub fn current(&self) -> Option<&Toast> {
        self.current.as_ref()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ModalState {
    Closed,
    Loading { mac_address: String, request: u64 },
    Loaded { device: Device },
    Error { mac_address: String, message: String },
}

impl ModalState {
    pub fn is_open(&self) -> bool {
        !matches!(self, ModalState::Closed)
    }
}

pub const SCAN_LABEL: &str = "Scan Now";
pub const SCAN_BUSY_LABEL: &str = "Scanning...";

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ScanControl {
    busy: bool,
}

impl ScanControl {
    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn enabled(&self) -> bool {
        !self.is_busy()
    }

    pub fn label(&self) -> &'static str {
        if self.busy {
            SCAN_BUSY_LABEL
        } else {
            SCAN_LABEL
        }
    }
}

/// Reports the scan outcome when dropped, so the button is released even if
/// the request task dies before the backend answers.
struct ScanCompletion {
    fetcher: Fetcher,
    result: Option<ApiResult<()>>,
}

impl Drop for ScanCompletion {
    fn drop(&mut self) {
        let result = self
            .result
            .take()
            .unwrap_or_else(|| Err(ApiError::transport("Scan request was interrupted")));
        self.fetcher.send(Update::ScanFinished { result });
    }
}

pub struct Dashboard {
    store: DashboardStore,
    toast: ToastState,
    modal: ModalState,
    scan: ScanControl,
    scheduler: RefreshScheduler,
    updates: UpdateReceiver,
    toast_duration: Duration,
    close_modal_while_loading: bool,
    modal_requests: u64,
}

impl Dashboard {
    pub fn new(backend: Arc<dyn Backend>, runtime: Handle, config: &DashboardConfig) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let fetcher = Fetcher::new(backend, tx, runtime, config.events_limit);

        Self {
            store: DashboardStore::new(config.drop_stale_responses),
            toast: ToastState::default(),
            modal: ModalState::Closed,
            scan: ScanControl::default(),
            scheduler: RefreshScheduler::new(fetcher, config.refresh_interval()),
            updates: rx,
            toast_duration: config.toast_duration(),
            close_modal_while_loading: config.close_modal_while_loading,
            modal_requests: 0,
        }
    }

    pub fn start(&mut self) {
        self.scheduler.start();
    }

    pub fn stop(&mut self) {
        self.scheduler.stop();
    }

    pub fn scheduler_state(&self) -> SchedulerState {
        self.scheduler.state()
    }

    pub fn store(&self) -> &DashboardStore {
        &self.store
    }

    pub fn toast(&self) -> Option<&Toast> {
        self.toast.current()
    }

    pub fn modal(&self) -> &ModalState {
        &self.modal
    }

    pub fn scan_control(&self) -> ScanControl {
        self.scan
    }

    fn fetcher(&self) -> &Fetcher {
        self.scheduler.fetcher()
    }

    pub fn dispatch(&mut self, command: Command) {
        debug!("Command: {:?}", command);
        if self.modal.is_open() && command.targets_page() {
            debug!("Modal is open, ignoring {:?}", command);
            return;
        }
        match command {
            Command::SetStatusFilter(status_filter) => self.store.set_status_filter(status_filter),
            Command::SetSearchText(text) => self.store.set_search_text(text),
            Command::ToggleMonitoring => self.toggle_monitoring(),
            Command::TriggerScan => self.trigger_scan(),
            Command::RefreshAll => self.scheduler.refresh_all(),
            Command::RefreshEvents => {
                self.fetcher().spawn_events();
                self.show_toast("Events refreshed", ToastKind::Success);
            }
            Command::OpenDeviceModal(mac_address) => self.open_device_modal(mac_address),
            Command::CloseModal => self.modal = ModalState::Closed,
            Command::ModalBackdropClicked => {
                let loading = matches!(self.modal, ModalState::Loading { .. });
                if !loading || self.close_modal_while_loading {
                    self.modal = ModalState::Closed;
                }
            }
        }
    }

    /// Reads the current status, then calls start or stop accordingly. The
    /// backend may change state between the two calls; nothing guards that.
    fn toggle_monitoring(&self) {
        let fetcher = self.fetcher().clone();
        self.fetcher().runtime().spawn(async move {
            let backend = fetcher.backend();
            let update = match backend.get_status().await {
                Err(e) => Update::MonitoringToggled {
                    action: None,
                    result: Err(e),
                },
                Ok(status) => {
                    let (action, result) = if status.monitoring_active {
                        (MonitoringAction::Stop, backend.stop_monitoring().await)
                    } else {
                        (MonitoringAction::Start, backend.start_monitoring().await)
                    };
                    Update::MonitoringToggled {
                        action: Some(action),
                        result,
                    }
                }
            };
            fetcher.send(update);
        });
    }

    fn trigger_scan(&mut self) {
        if self.scan.busy {
            debug!("Scan already in progress, ignoring");
            self.show_toast("Scan already in progress", ToastKind::Info);
            return;
        }
        self.scan.busy = true;
        info!("Manual scan requested");

        let fetcher = self.fetcher().clone();
        self.fetcher().runtime().spawn(async move {
            let mut completion = ScanCompletion {
                fetcher: fetcher.clone(),
                result: None,
            };
            completion.result = Some(fetcher.backend().trigger_scan().await);
        });
    }

    fn open_device_modal(&mut self, mac_address: String) {
        self.modal_requests += 1;
        let request = self.modal_requests;
        self.modal = ModalState::Loading {
            mac_address: mac_address.clone(),
            request,
        };

        let fetcher = self.fetcher().clone();
        self.fetcher().runtime().spawn(async move {
            let result = fetcher.backend().get_device_detail(&mac_address).await;
            fetcher.send(Update::DeviceDetail { request, result });
        });
    }

    fn show_toast(&mut self, message: impl Into<String>, kind: ToastKind) {
        let id = self.toast.show(message, kind);
        let updates = self.fetcher().updates();
        let duration = self.toast_duration;
        self.fetcher().runtime().spawn(async move {
            tokio::time::sleep(duration).await;
            let _ = updates.send(Update::ToastExpired { toast: id });
        });
    }

    /// Applies every completion that has arrived so far. Returns how many.
    pub fn drain_updates(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(update) = self.updates.try_recv() {
            self.apply(update);
            applied += 1;
        }
        applied
    }

    /// One full cycle awaited in place, with its results applied.
    pub async fn refresh_once(&mut self) {
        self.fetcher().run_cycle().await;
        self.drain_updates();
    }

    pub fn apply(&mut self, update: Update) {
        match update {
            Update::Status { cycle, result } => match result {
                Ok(status) => {
                    self.store.apply_status(cycle, status, Local::now());
                }
                Err(e) => self.report_read_error("status", e, true),
            },
            Update::Statistics { cycle, result } => match result {
                Ok(statistics) => {
                    self.store.apply_statistics(cycle, statistics);
                }
                Err(e) => self.report_read_error("statistics", e, false),
            },
            Update::Devices { cycle, result } => match result {
                Ok(devices) => {
                    self.store.apply_devices(cycle, devices);
                }
                Err(e) => self.report_read_error("devices", e, true),
            },
            Update::Events { cycle, result } => match result {
                Ok(events) => {
                    self.store.apply_events(cycle, events);
                }
                Err(e) => self.report_read_error("events", e, false),
            },
            Update::DeviceDetail { request, result } => self.apply_device_detail(request, result),
            Update::MonitoringToggled { action, result } => self.apply_toggle(action, result),
            Update::ScanFinished { result } => self.apply_scan(result),
            Update::ToastExpired { toast } => self.toast.expire(toast),
        }
    }

    /// Status and device failures surface a toast; the rest are only logged.
    fn report_read_error(&mut self, what: &str, e: ApiError, notify: bool) {
        error!("Error loading {}: {}", what, e);
        if !notify {
            return;
        }
        let message = match e.backend_message() {
            Some(msg) => format!("Error loading {}: {}", what, msg),
            None => format!("Failed to load {}", what),
        };
        self.show_toast(message, ToastKind::Error);
    }

    fn apply_device_detail(&mut self, request: u64, result: ApiResult<Device>) {
        let mac_address = match &self.modal {
            ModalState::Loading {
                mac_address,
                request: pending,
            } if *pending == request => mac_address.clone(),
            _ => {
                debug!("Dropping device detail for closed or superseded modal ({})", request);
                return;
            }
        };

        self.modal = match result {
            Ok(device) => ModalState::Loaded { device },
            Err(e) => {
                error!("Error loading device details for {}: {}", mac_address, e);
                let message = match e.kind {
                    ErrorKind::Application => format!("Error: {}", e.message),
                    ErrorKind::Transport => "Failed to load device details".to_string(),
                };
                ModalState::Error {
                    mac_address,
                    message,
                }
            }
        };
    }

    fn apply_toggle(&mut self, action: Option<MonitoringAction>, result: ApiResult<()>) {
        match (action, result) {
            (Some(action), Ok(())) => {
                info!("Monitoring {}", action.past_tense());
                self.show_toast(
                    format!("Monitoring {} successfully", action.past_tense()),
                    ToastKind::Success,
                );
                self.fetcher().spawn_status();
            }
            (Some(action), Err(e)) => {
                warn!("Failed to {} monitoring: {}", action.verb(), e);
                let message = match e.backend_message() {
                    Some(msg) => msg.to_string(),
                    None if e.backend_responded() => {
                        format!("Failed to {} monitoring", action.verb())
                    }
                    None => "Failed to toggle monitoring".to_string(),
                };
                self.show_toast(message, ToastKind::Error);
            }
            (None, Err(e)) => {
                error!("Error toggling monitoring: {}", e);
                self.show_toast("Failed to toggle monitoring", ToastKind::Error);
            }
            (None, Ok(())) => {}
        }
    }

    fn apply_scan(&mut self, result: ApiResult<()>) {
        self.scan.busy = false;
        match result {
            Ok(()) => {
                info!("Manual scan completed");
                self.show_toast("Scan completed successfully", ToastKind::Success);
                self.scheduler.refresh_all();
            }
            Err(e) => {
                warn!("Manual scan failed: {}", e);
                let message = match e.backend_message() {
                    Some(msg) => msg,
                    None if e.backend_responded() => "Failed to perform scan",
                    None => "Failed to trigger scan",
                }
                .to_string();
                self.show_toast(message, ToastKind::Error);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{Endpoint, MockBackend};
    use reqwest::StatusCode;
    use tokio::time;

    fn dashboard(backend: Arc<MockBackend>) -> Dashboard {
        Dashboard::new(backend, Handle::current(), &DashboardConfig::default())
    }

    async fn settle(dashboard: &mut Dashboard) {
        for _ in 0..3 {
            time::sleep(Duration::from_millis(10)).await;
            dashboard.drain_updates();
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_toggle_starts_stopped_monitoring() {
        let backend = Arc::new(MockBackend::demo());
        backend.set_monitoring(false);
        let mut dashboard = dashboard(backend.clone());

        dashboard.dispatch(Command::ToggleMonitoring);
        settle(&mut dashboard).await;

        assert_eq!(backend.calls(Endpoint::Start), 1);
        assert_eq!(backend.calls(Endpoint::Stop), 0);
        let toast = dashboard.toast().unwrap();
        assert_eq!(toast.kind, ToastKind::Success);
        assert_eq!(toast.message, "Monitoring started successfully");

        // Read before the act, then a re-fetch after it
        assert_eq!(backend.calls(Endpoint::Status), 2);
        assert!(dashboard.store().status().unwrap().monitoring_active);
    }

    #[tokio::test(start_paused = true)]
    async fn test_toggle_failure_uses_backend_message() {
        let backend = Arc::new(MockBackend::demo());
        backend.fail(Endpoint::Stop, ApiError::application("Monitor thread is busy"));
        let mut dashboard = dashboard(backend.clone());

        dashboard.dispatch(Command::ToggleMonitoring);
        settle(&mut dashboard).await;

        let toast = dashboard.toast().unwrap();
        assert_eq!(toast.kind, ToastKind::Error);
        assert_eq!(toast.message, "Monitor thread is busy");
    }

    #[tokio::test(start_paused = true)]
    async fn test_toggle_bare_http_failure_names_the_action() {
        let backend = Arc::new(MockBackend::demo());
        backend.fail(Endpoint::Stop, ApiError::http_status(StatusCode::INTERNAL_SERVER_ERROR));
        let mut dashboard = dashboard(backend.clone());

        dashboard.dispatch(Command::ToggleMonitoring);
        settle(&mut dashboard).await;
        assert_eq!(dashboard.toast().unwrap().message, "Failed to stop monitoring");
    }

    #[tokio::test(start_paused = true)]
    async fn test_toggle_connection_failure_is_generic() {
        let backend = Arc::new(MockBackend::demo());
        backend.set_monitoring(false);
        backend.fail(Endpoint::Start, ApiError::transport("Connection error: refused"));
        let mut dashboard = dashboard(backend.clone());

        dashboard.dispatch(Command::ToggleMonitoring);
        settle(&mut dashboard).await;
        assert_eq!(dashboard.toast().unwrap().message, "Failed to toggle monitoring");
    }

    #[tokio::test(start_paused = true)]
    async fn test_scan_button_busy_until_success() {
        let backend = Arc::new(MockBackend::demo().with_latency(Duration::from_millis(500)));
        let mut dashboard = dashboard(backend.clone());

        dashboard.dispatch(Command::TriggerScan);
        assert!(!dashboard.scan_control().enabled());
        assert_eq!(dashboard.scan_control().label(), SCAN_BUSY_LABEL);

        // Clicks while busy are ignored
        dashboard.dispatch(Command::TriggerScan);
        let toast = dashboard.toast().unwrap();
        assert_eq!(toast.kind, ToastKind::Info);
        assert_eq!(toast.message, "Scan already in progress");
        time::sleep(Duration::from_millis(100)).await;
        dashboard.drain_updates();
        assert!(dashboard.scan_control().is_busy());

        time::sleep(Duration::from_millis(500)).await;
        dashboard.drain_updates();
        assert!(dashboard.scan_control().enabled());
        assert_eq!(dashboard.scan_control().label(), SCAN_LABEL);
        assert_eq!(backend.calls(Endpoint::Scan), 1);
        assert_eq!(dashboard.toast().unwrap().message, "Scan completed successfully");

        // Success kicks off a full refresh
        time::sleep(Duration::from_millis(600)).await;
        dashboard.drain_updates();
        assert_eq!(backend.calls(Endpoint::Devices), 1);
        assert!(dashboard.store().devices_loaded());
    }

    #[tokio::test(start_paused = true)]
    async fn test_scan_button_released_on_application_error() {
        let backend = Arc::new(MockBackend::demo());
        backend.fail(Endpoint::Scan, ApiError::application("Monitoring is not initialized"));
        let mut dashboard = dashboard(backend.clone());

        dashboard.dispatch(Command::TriggerScan);
        assert!(dashboard.scan_control().is_busy());
        settle(&mut dashboard).await;

        assert!(dashboard.scan_control().enabled());
        assert_eq!(dashboard.scan_control().label(), SCAN_LABEL);
        let toast = dashboard.toast().unwrap();
        assert_eq!(toast.kind, ToastKind::Error);
        assert_eq!(toast.message, "Monitoring is not initialized");
        assert_eq!(backend.calls(Endpoint::Devices), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_scan_button_released_on_transport_error() {
        let backend = Arc::new(MockBackend::demo());
        backend.fail(Endpoint::Scan, ApiError::transport("Connection error: refused"));
        let mut dashboard = dashboard(backend.clone());

        dashboard.dispatch(Command::TriggerScan);
        settle(&mut dashboard).await;

        assert!(dashboard.scan_control().enabled());
        assert_eq!(dashboard.toast().unwrap().message, "Failed to trigger scan");
    }

    #[tokio::test(start_paused = true)]
    async fn test_scan_bare_http_failure_message() {
        let backend = Arc::new(MockBackend::demo());
        backend.fail(Endpoint::Scan, ApiError::http_status(StatusCode::SERVICE_UNAVAILABLE));
        let mut dashboard = dashboard(backend.clone());

        dashboard.dispatch(Command::TriggerScan);
        settle(&mut dashboard).await;

        assert!(dashboard.scan_control().enabled());
        assert_eq!(dashboard.toast().unwrap().message, "Failed to perform scan");
    }

    #[tokio::test(start_paused = true)]
    async fn test_modal_for_unknown_device_shows_inline_error() {
        let backend = Arc::new(MockBackend::demo());
        let mut dashboard = dashboard(backend.clone());
        dashboard.refresh_once().await;
        let devices_before = dashboard.store().devices().to_vec();

        dashboard.dispatch(Command::OpenDeviceModal("00:00:00:00:00:00".to_string()));
        assert!(matches!(dashboard.modal(), ModalState::Loading { .. }));
        settle(&mut dashboard).await;

        match dashboard.modal() {
            ModalState::Error { message, .. } => assert_eq!(message, "Error: Device not found"),
            other => panic!("unexpected modal state {:?}", other),
        }
        assert!(dashboard.toast().is_none());
        assert_eq!(dashboard.store().devices(), devices_before.as_slice());
    }

    #[tokio::test(start_paused = true)]
    async fn test_modal_loads_device_with_history() {
        let backend = Arc::new(MockBackend::demo());
        let mut dashboard = dashboard(backend.clone());

        dashboard.dispatch(Command::OpenDeviceModal("B8:27:EB:44:12:9C".to_string()));
        settle(&mut dashboard).await;

        match dashboard.modal() {
            ModalState::Loaded { device } => {
                assert_eq!(device.hostname.as_deref(), Some("raspberrypi"));
                assert_eq!(device.history.len(), 1);
            }
            other => panic!("unexpected modal state {:?}", other),
        }

        dashboard.dispatch(Command::ModalBackdropClicked);
        assert_eq!(dashboard.modal(), &ModalState::Closed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_open_modal_blocks_page_commands() {
        let backend = Arc::new(MockBackend::demo());
        let mut dashboard = dashboard(backend.clone());

        dashboard.dispatch(Command::OpenDeviceModal("B8:27:EB:44:12:9C".to_string()));
        settle(&mut dashboard).await;

        // Same frame: another row's details button, then the click outside
        dashboard.dispatch(Command::OpenDeviceModal("AC:BC:32:91:0E:77".to_string()));
        dashboard.dispatch(Command::TriggerScan);
        match dashboard.modal() {
            ModalState::Loaded { device } => assert_eq!(device.mac_address, "B8:27:EB:44:12:9C"),
            other => panic!("unexpected modal state {:?}", other),
        }
        assert!(dashboard.scan_control().enabled());

        dashboard.dispatch(Command::ModalBackdropClicked);
        assert_eq!(dashboard.modal(), &ModalState::Closed);
        settle(&mut dashboard).await;
        assert_eq!(backend.calls(Endpoint::DeviceDetail), 1);
        assert_eq!(backend.calls(Endpoint::Scan), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_backdrop_click_ignored_while_loading() {
        let backend = Arc::new(MockBackend::demo().with_latency(Duration::from_millis(1000)));
        let mut dashboard = dashboard(backend.clone());

        dashboard.dispatch(Command::OpenDeviceModal("B8:27:EB:44:12:9C".to_string()));
        dashboard.dispatch(Command::ModalBackdropClicked);
        assert!(matches!(dashboard.modal(), ModalState::Loading { .. }));

        // Explicit close always works, and the late response is dropped
        dashboard.dispatch(Command::CloseModal);
        time::sleep(Duration::from_millis(1100)).await;
        dashboard.drain_updates();
        assert_eq!(dashboard.modal(), &ModalState::Closed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_backdrop_click_can_close_loading_modal_when_allowed() {
        let backend = Arc::new(MockBackend::demo().with_latency(Duration::from_millis(1000)));
        let config = DashboardConfig {
            close_modal_while_loading: true,
            ..DashboardConfig::default()
        };
        let mut dashboard = Dashboard::new(backend, Handle::current(), &config);

        dashboard.dispatch(Command::OpenDeviceModal("B8:27:EB:44:12:9C".to_string()));
        dashboard.dispatch(Command::ModalBackdropClicked);
        assert!(!dashboard.modal().is_open());
    }

    #[tokio::test(start_paused = true)]
    async fn test_toast_replaced_and_first_timer_hides_second() {
        let backend = Arc::new(MockBackend::demo());
        let mut dashboard = dashboard(backend);

        dashboard.dispatch(Command::RefreshEvents);
        time::sleep(Duration::from_millis(2000)).await;
        dashboard.drain_updates();

        dashboard.show_toast("second", ToastKind::Error);
        assert_eq!(dashboard.toast().unwrap().message, "second");

        time::sleep(Duration::from_millis(1010)).await;
        dashboard.drain_updates();
        assert!(dashboard.toast().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_device_read_failure_toasts_but_statistics_failure_is_silent() {
        let backend = Arc::new(MockBackend::demo());
        backend.fail(Endpoint::Statistics, ApiError::transport("HTTP 500"));
        let mut dashboard = dashboard(backend.clone());

        dashboard.refresh_once().await;
        assert!(dashboard.toast().is_none());
        assert!(dashboard.store().statistics().is_none());
        assert!(dashboard.store().devices_loaded());

        backend.fail(Endpoint::Devices, ApiError::application("database is locked"));
        dashboard.refresh_once().await;
        assert_eq!(
            dashboard.toast().unwrap().message,
            "Error loading devices: database is locked"
        );
        // Previous snapshot stays in place
        assert_eq!(dashboard.store().devices().len(), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_cancels_auto_refresh() {
        let backend = Arc::new(MockBackend::demo());
        let mut dashboard = dashboard(backend.clone());
        assert_eq!(dashboard.scheduler_state(), SchedulerState::Stopped);

        dashboard.start();
        assert_eq!(dashboard.scheduler_state(), SchedulerState::Running);
        settle(&mut dashboard).await;
        assert!(dashboard.store().devices_loaded());

        dashboard.stop();
        dashboard.stop();
        assert_eq!(dashboard.scheduler_state(), SchedulerState::Stopped);
        time::sleep(Duration::from_secs(30)).await;
        assert_eq!(backend.calls(Endpoint::Devices), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_filter_commands_update_visible_subset() {
        let backend = Arc::new(MockBackend::demo());
        let mut dashboard = dashboard(backend);
        dashboard.refresh_once().await;

        dashboard.dispatch(Command::SetStatusFilter(StatusFilter::Disconnected));
        assert_eq!(dashboard.store().visible_devices().len(), 2);

        dashboard.dispatch(Command::SetSearchText("PIXEL".to_string()));
        assert_eq!(dashboard.store().visible_devices().len(), 1);
    }
}
