// Periodic and on-demand refresh of the four read endpoints

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info};

use crate::client::Backend;
use crate::error::ApiResult;
use crate::models::{ConnectionEvent, DashboardStatus, Device, Statistics};
use crate::store::CycleId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitoringAction {
    Start,
    Stop,
}

impl MonitoringAction {
    pub fn past_tense(&self) -> &'static str {
        match self {
            MonitoringAction::Start => "started",
            MonitoringAction::Stop => "stopped",
        }
    }

    pub fn verb(&self) -> &'static str {
        match self {
            MonitoringAction::Start => "start",
            MonitoringAction::Stop => "stop",
        }
    }
}

/// Completions of async work, applied by whoever owns the store.
#[derive(Debug)]
pub enum Update {
    Status { cycle: CycleId, result: ApiResult<DashboardStatus> },
    Statistics { cycle: CycleId, result: ApiResult<Statistics> },
    Devices { cycle: CycleId, result: ApiResult<Vec<Device>> },
    Events { cycle: CycleId, result: ApiResult<Vec<ConnectionEvent>> },
    DeviceDetail { request: u64, result: ApiResult<Device> },
    /// `action` is `None` when the status read ahead of the toggle failed.
    MonitoringToggled { action: Option<MonitoringAction>, result: ApiResult<()> },
    ScanFinished { result: ApiResult<()> },
    ToastExpired { toast: u64 },
}

pub type UpdateSender = mpsc::UnboundedSender<Update>;
pub type UpdateReceiver = mpsc::UnboundedReceiver<Update>;

/// Issues read requests and reports each completion as its own [`Update`].
#[derive(Clone)]
pub struct Fetcher {
    backend: Arc<dyn Backend>,
    updates: UpdateSender,
    runtime: Handle,
    cycles: Arc<AtomicU64>,
    events_limit: usize,
}

impl Fetcher {
    pub fn new(
        backend: Arc<dyn Backend>,
        updates: UpdateSender,
        runtime: Handle,
        events_limit: usize,
    ) -> Self {
        Self {
            backend,
            updates,
            runtime,
            cycles: Arc::new(AtomicU64::new(0)),
            events_limit,
        }
    }

    pub fn backend(&self) -> Arc<dyn Backend> {
        Arc::clone(&self.backend)
    }

    pub fn runtime(&self) -> &Handle {
        &self.runtime
    }

    pub fn updates(&self) -> UpdateSender {
        self.updates.clone()
    }

    pub fn next_cycle(&self) -> CycleId {
        self.cycles.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn send(&self, update: Update) {
        if self.updates.send(update).is_err() {
            debug!("Dashboard gone, dropping update");
        }
    }

    pub async fn fetch_status(&self, cycle: CycleId) {
        let result = self.backend.get_status().await;
        self.send(Update::Status { cycle, result });
    }

    pub async fn fetch_statistics(&self, cycle: CycleId) {
        let result = self.backend.get_statistics().await;
        self.send(Update::Statistics { cycle, result });
    }

    pub async fn fetch_devices(&self, cycle: CycleId) {
        let result = self.backend.get_devices().await;
        self.send(Update::Devices { cycle, result });
    }

    pub async fn fetch_events(&self, cycle: CycleId) {
        let result = self.backend.get_events(self.events_limit).await;
        self.send(Update::Events { cycle, result });
    }

    /// One refresh cycle: all four reads in flight together, each reported
    /// as soon as it lands, none waiting on another.
    pub async fn run_cycle(&self) {
        let cycle = self.next_cycle();
        debug!("Refresh cycle {} started", cycle);
        tokio::join!(
            self.fetch_status(cycle),
            self.fetch_statistics(cycle),
            self.fetch_devices(cycle),
            self.fetch_events(cycle),
        );
        debug!("Refresh cycle {} finished", cycle);
    }

    pub fn spawn_cycle(&self) {
        let fetcher = self.clone();
        self.runtime.spawn(async move { fetcher.run_cycle().await });
    }

    pub fn spawn_status(&self) {
        let fetcher = self.clone();
        let cycle = self.next_cycle();
        self.runtime.spawn(async move { fetcher.fetch_status(cycle).await });
    }

    pub fn spawn_events(&self) {
        let fetcher = self.clone();
        let cycle = self.next_cycle();
        self.runtime.spawn(async move { fetcher.fetch_events(cycle).await });
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Stopped,
    Running,
}

/// Owns the periodic refresh timer.
///
/// Ticks never wait for the previous cycle; a slow backend simply ends up
/// with overlapping cycles. Stopping only cancels the timer, cycles already
/// in flight still complete and report.
pub struct RefreshScheduler {
    fetcher: Fetcher,
    period: Duration,
    timer: Option<JoinHandle<()>>,
}

impl RefreshScheduler {
    pub fn new(fetcher: Fetcher, period: Duration) -> Self {
        Self {
            fetcher,
            period,
            timer: None,
        }
    }

    pub fn state(&self) -> SchedulerState {
        match self.timer {
            Some(_) => SchedulerState::Running,
            None => SchedulerState::Stopped,
        }
    }

    /// Runs a cycle right away, then one per period. No-op when already running.
    pub fn start(&mut self) {
        if self.timer.is_some() {
            return;
        }

        let fetcher = self.fetcher.clone();
        let period = self.period;
        self.timer = Some(self.fetcher.runtime().spawn(async move {
            let mut ticker = time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                // First tick completes immediately
                ticker.tick().await;
                fetcher.spawn_cycle();
            }
        }));
        info!("Auto-refresh started (every {:?})", self.period);
    }

    pub fn stop(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
            info!("Auto-refresh stopped");
        }
    }

    /// Out-of-band cycle; the timer keeps its own schedule.
    pub fn refresh_all(&self) {
        self.fetcher.spawn_cycle();
    }

    pub fn fetcher(&self) -> &Fetcher {
        &self.fetcher
    }
}

impl Drop for RefreshScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}
